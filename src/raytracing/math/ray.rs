use super::{MathError, Vec3};

/// Half-line with a unit direction.
///
/// The direction is normalized once in [`Ray::new`]; the fields are
/// private so nothing can hand the tracer a ray with a stretched direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Result<Ray, MathError> {
        Ok(Ray {
            origin,
            direction: direction.try_normalize()?,
        })
    }

    #[inline(always)]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline(always)]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline(always)]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_normalized_on_construction() {
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, -5.0)).unwrap();
        assert_eq!(ray.direction(), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert_eq!(
            Ray::new(Vec3::one(), Vec3::zero()).unwrap_err(),
            MathError::DegenerateVector
        );
    }

    #[test]
    fn at_zero_is_the_origin() {
        let origin = Vec3::new(1.5, -2.0, 0.25);
        let ray = Ray::new(origin, Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(ray.at(0.0), origin);
    }

    #[test]
    fn parametrization_has_unit_speed() {
        let ray = Ray::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(-2.0, 7.0, 0.5)).unwrap();
        for (t1, t2) in [(0.0, 1.0), (0.5, 3.25), (2.0, -1.0)] {
            let travelled = (ray.at(t2) - ray.at(t1)).len();
            assert!((travelled - (t2 - t1).abs()).abs() < 1e-9);
        }
    }
}
