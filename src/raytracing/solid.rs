//! Geometric primitives and their ray intersection tests.
//!
//! Every primitive answers two questions: where along a ray it is hit
//! (if anywhere inside the accepted window), and what its surface normal
//! is at a point. [`Solid`] closes the set so the intersection search is
//! written once against [`RayIntersectable`].

use super::{Interval, Mat4, MathError, Ray, Vec3};

/// Rays whose direction is this close to parallel with a triangle are
/// treated as misses.
const TRIANGLE_PARALLEL_EPSILON: f64 = 1e-3;
const PLANE_PARALLEL_EPSILON: f64 = 1e-4;

pub trait RayIntersectable {
    /// Ray parameter of the hit, if it lies strictly inside `window`.
    fn intersect(&self, ray: &Ray, window: Interval) -> Option<f64>;

    /// Unit surface normal at a point on the surface.
    fn normal_at(&self, point: Vec3) -> Vec3;
}

/// Sphere given by center and radius.
///
/// The radius is assumed positive; the scene parser rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64) -> Sphere {
        debug_assert!(radius > 0.0, "sphere radius must be positive");
        Sphere { center, radius }
    }
}

impl RayIntersectable for Sphere {
    fn intersect(&self, ray: &Ray, window: Interval) -> Option<f64> {
        // the direction is unit length, so the quadratic's `a` term is 1
        let oc = ray.origin() - self.center;
        let b = 2.0 * oc.dot(ray.direction());
        let c = oc.squared_len() - self.radius * self.radius;
        let discriminant = b * b - 4.0 * c;
        // tangent rays count as misses
        if discriminant <= 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let t0 = (-b - sqrt_d) / 2.0;
        let t1 = (-b + sqrt_d) / 2.0;
        if t1 < 0.0 {
            // sphere entirely behind the origin
            return None;
        }
        // starting inside the sphere: the only forward hit is the far one
        let t = if t0 < 0.0 { t1 } else { t0 };
        window.surrounds(t).then_some(t)
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize()
    }
}

/// Flat-shaded triangle with a face normal computed at construction.
///
/// The vertices are only reachable through constructors so the normal
/// can never go stale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    normal: Vec3,
}

impl Triangle {
    /// Fails on collinear vertices, which have no face normal.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Result<Triangle, MathError> {
        let normal = (v1 - v0).cross(v2 - v0).try_normalize()?;
        Ok(Triangle { v0, v1, v2, normal })
    }

    pub fn vertices(&self) -> (Vec3, Vec3, Vec3) {
        (self.v0, self.v1, self.v2)
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    pub fn translated(&self, offset: Vec3) -> Triangle {
        Triangle {
            v0: self.v0 + offset,
            v1: self.v1 + offset,
            v2: self.v2 + offset,
            // a translation keeps the edges, hence the normal
            normal: self.normal,
        }
    }

    /// Applies `transform` to the vertices and recomputes the normal.
    pub fn transformed(&self, transform: &Mat4) -> Result<Triangle, MathError> {
        Triangle::new(
            transform.apply(self.v0),
            transform.apply(self.v1),
            transform.apply(self.v2),
        )
    }
}

impl RayIntersectable for Triangle {
    fn intersect(&self, ray: &Ray, window: Interval) -> Option<f64> {
        // plane intersection followed by the inside-outside test
        let n = self.normal;
        let n_dot_dir = n.dot(ray.direction());
        if n_dot_dir.abs() < TRIANGLE_PARALLEL_EPSILON {
            return None;
        }

        let d = -n.dot(self.v0);
        let t = -(n.dot(ray.origin()) + d) / n_dot_dir;
        if t < 0.0 || !window.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        let edges = [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)];
        for (start, end) in edges {
            if n.dot((end - start).cross(p - start)) < 0.0 {
                return None;
            }
        }
        Some(t)
    }

    fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }
}

/// Infinite plane through `point`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Result<Plane, MathError> {
        Ok(Plane {
            point,
            normal: normal.try_normalize()?,
        })
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl RayIntersectable for Plane {
    fn intersect(&self, ray: &Ray, window: Interval) -> Option<f64> {
        let denominator = self.normal.dot(ray.direction());
        if denominator.abs() < PLANE_PARALLEL_EPSILON {
            return None;
        }
        let t = (self.point - ray.origin()).dot(self.normal) / denominator;
        window.surrounds(t).then_some(t)
    }

    fn normal_at(&self, _point: Vec3) -> Vec3 {
        self.normal
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Solid {
    Sphere(Sphere),
    Triangle(Triangle),
    Plane(Plane),
}

impl RayIntersectable for Solid {
    #[inline(always)]
    fn intersect(&self, ray: &Ray, window: Interval) -> Option<f64> {
        match self {
            Solid::Sphere(sphere) => sphere.intersect(ray, window),
            Solid::Triangle(triangle) => triangle.intersect(ray, window),
            Solid::Plane(plane) => plane.intersect(ray, window),
        }
    }

    #[inline(always)]
    fn normal_at(&self, point: Vec3) -> Vec3 {
        match self {
            Solid::Sphere(sphere) => sphere.normal_at(point),
            Solid::Triangle(triangle) => triangle.normal_at(point),
            Solid::Plane(plane) => plane.normal_at(point),
        }
    }
}

impl From<Sphere> for Solid {
    fn from(value: Sphere) -> Self {
        Solid::Sphere(value)
    }
}

impl From<Triangle> for Solid {
    fn from(value: Triangle) -> Self {
        Solid::Triangle(value)
    }
}

impl From<Plane> for Solid {
    fn from(value: Plane) -> Self {
        Solid::Plane(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(origin: Vec3, direction: Vec3) -> Ray {
        Ray::new(origin, direction).unwrap()
    }

    fn window() -> Interval {
        Interval::RENDER_DISTANCE
    }

    #[test]
    fn sphere_hit_straight_ahead() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5);
        let t = sphere
            .intersect(&ray(Vec3::zero(), -Vec3::z_axis()), window())
            .unwrap();
        assert!((t - 1.5).abs() < 1e-9);
    }

    #[test]
    fn sphere_hit_at_distance_minus_radius() {
        let center = Vec3::new(3.0, -1.0, -7.0);
        let sphere = Sphere::new(center, 1.25);
        let origin = Vec3::new(-2.0, 4.0, 1.0);
        let t = sphere
            .intersect(&ray(origin, center - origin), window())
            .unwrap();
        assert!((t - (origin.distance(center) - 1.25)).abs() < 1e-9);
    }

    #[test]
    fn sphere_intersection_is_translation_invariant() {
        let sphere = Sphere::new(Vec3::new(0.2, 0.1, -4.0), 1.0);
        let origin = Vec3::new(0.0, 0.0, 0.5);
        let direction = Vec3::new(0.05, 0.02, -1.0);
        let t = sphere.intersect(&ray(origin, direction), window()).unwrap();

        let offset = Vec3::new(-3.0, 7.5, 2.0);
        let moved = Sphere::new(sphere.center + offset, sphere.radius);
        let moved_t = moved
            .intersect(&ray(origin + offset, direction), window())
            .unwrap();
        assert!((t - moved_t).abs() < 1e-9);
    }

    #[test]
    fn sphere_behind_origin_is_missed() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 3.0), 1.0);
        assert!(sphere
            .intersect(&ray(Vec3::zero(), -Vec3::z_axis()), window())
            .is_none());
    }

    #[test]
    fn origin_inside_sphere_reports_far_root() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 2.0);
        let t = sphere
            .intersect(&ray(Vec3::zero(), -Vec3::z_axis()), window())
            .unwrap();
        assert!((t - 3.0).abs() < 1e-9);
    }

    #[test]
    fn tangent_ray_misses_and_grazing_ray_hits() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let tangent = ray(Vec3::new(0.0, 1.0, 0.0), -Vec3::z_axis());
        assert!(sphere.intersect(&tangent, window()).is_none());

        let grazing = ray(Vec3::new(0.0, 0.99, 0.0), -Vec3::z_axis());
        let t = sphere.intersect(&grazing, window()).unwrap();
        assert!(t > 4.0 && t < 5.0);
    }

    #[test]
    fn sphere_beyond_render_distance_is_missed() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -80.0), 1.0);
        let r = ray(Vec3::zero(), -Vec3::z_axis());
        assert!(sphere.intersect(&r, window()).is_none());
        assert!(sphere.intersect(&r, Interval::new(0.0, 100.0)).is_some());
    }

    #[test]
    fn sphere_normal_points_outward() {
        let sphere = Sphere::new(Vec3::new(1.0, 2.0, -6.0), 1.5);
        let r = ray(Vec3::zero(), Vec3::new(1.1, 2.3, -6.0));
        let t = sphere.intersect(&r, window()).unwrap();
        let p = r.at(t);
        let n = sphere.normal_at(p);
        assert!((n.len() - 1.0).abs() < 1e-9);
        assert!(n.dot(p - sphere.center) > 0.0);
    }

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, -3.0),
            Vec3::new(1.0, -1.0, -3.0),
            Vec3::new(0.0, 1.0, -3.0),
        )
        .unwrap()
    }

    #[test]
    fn triangle_hit_through_centroid() {
        let tri = unit_triangle();
        let origin = tri.centroid() + tri.normal() * 2.0;
        let t = tri.intersect(&ray(origin, -tri.normal()), window()).unwrap();
        assert!((t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn triangle_missed_from_behind_facing_away() {
        let tri = unit_triangle();
        let origin = tri.centroid() - tri.normal() * 2.0;
        assert!(tri
            .intersect(&ray(origin, -tri.normal()), window())
            .is_none());
    }

    #[test]
    fn triangle_missed_beside_an_edge() {
        let tri = unit_triangle();
        let origin = tri.centroid() + Vec3::new(5.0, 0.0, 0.0) + tri.normal() * 2.0;
        assert!(tri
            .intersect(&ray(origin, -tri.normal()), window())
            .is_none());
    }

    #[test]
    fn triangle_parallel_ray_is_a_miss() {
        let tri = unit_triangle();
        let r = ray(Vec3::new(-5.0, 0.0, -3.0), Vec3::x_axis());
        assert!(tri.intersect(&r, window()).is_none());
    }

    #[test]
    fn triangle_winding_does_not_change_hits() {
        let (v0, v1, v2) = unit_triangle().vertices();
        let flipped = Triangle::new(v0, v2, v1).unwrap();
        let r = ray(Vec3::zero(), Vec3::new(0.0, -0.1, -1.0));
        assert!(flipped.intersect(&r, window()).is_some());
        assert!(unit_triangle().intersect(&r, window()).is_some());
    }

    #[test]
    fn collinear_triangle_is_rejected() {
        let result = Triangle::new(Vec3::zero(), Vec3::x_axis(), Vec3::x_axis() * 2.0);
        assert_eq!(result.unwrap_err(), MathError::DegenerateVector);
    }

    #[test]
    fn transformed_triangle_recomputes_normal() {
        let tri = unit_triangle();
        let turn = Mat4::rotate(Vec3::y_axis(), std::f64::consts::FRAC_PI_2).unwrap();
        let turned = tri.transformed(&turn).unwrap();
        assert!((turned.normal() - Vec3::x_axis()).len() < 1e-9);

        let moved = tri.translated(Vec3::new(0.0, 0.0, 1.0));
        let t = moved
            .intersect(&ray(Vec3::zero(), -Vec3::z_axis()), window())
            .unwrap();
        assert!((t - 2.0).abs() < 1e-9);
    }

    #[test]
    fn plane_hit_and_parallel_miss() {
        let plane = Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 4.0, 0.0)).unwrap();
        assert_eq!(plane.normal(), Vec3::y_axis());
        let down = ray(Vec3::zero(), -Vec3::y_axis());
        assert!((plane.intersect(&down, window()).unwrap() - 1.0).abs() < 1e-9);
        let flat = ray(Vec3::zero(), -Vec3::z_axis());
        assert!(plane.intersect(&flat, window()).is_none());
    }

    #[test]
    fn solid_dispatches_to_variant() {
        let solid: Solid = Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5).into();
        let r = ray(Vec3::zero(), -Vec3::z_axis());
        let t = solid.intersect(&r, window()).unwrap();
        assert_eq!(solid.normal_at(r.at(t)), Vec3::z_axis());
    }
}
