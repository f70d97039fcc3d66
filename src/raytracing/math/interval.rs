/// Range of ray parameters in which a hit is accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Render-distance window used for camera rays unless overridden.
    pub const RENDER_DISTANCE: Interval = Interval {
        min: 0.0,
        max: 50.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True if `t` lies strictly inside `(min, max)`.
    #[inline(always)]
    pub fn surrounds(&self, t: f64) -> bool {
        self.min < t && t < self.max
    }

    pub fn with_max(&self, max: f64) -> Interval {
        Interval::new(self.min, max)
    }

    pub fn size(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::RENDER_DISTANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_excluded() {
        let window = Interval::new(0.0, 50.0);
        assert!(!window.surrounds(0.0));
        assert!(!window.surrounds(50.0));
        assert!(window.surrounds(0.001));
        assert!(window.surrounds(49.999));
        assert!(!window.surrounds(-1.0));
        assert!(!window.surrounds(51.0));
    }
}
