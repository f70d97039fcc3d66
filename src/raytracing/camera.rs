use super::math::{MathError, Ray, Vec3};

/// Pinhole camera fixed at the origin looking down `-z`.
///
/// The image plane sits at `z = -1` and spans `[-1, 1]` horizontally and
/// `[-r, r]` vertically with `r = height / width`. Row 0 is the bottom row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    width: u32,
    height: u32,
    aspect_ratio: f64,
    step_x: f64,
    step_y: f64,
}

fn step(extent: f64, pixels: u32) -> f64 {
    if pixels > 1 {
        2.0 * extent / (pixels - 1) as f64
    } else {
        0.0
    }
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let aspect_ratio = height as f64 / width.max(1) as f64;
        Self {
            width,
            height,
            aspect_ratio,
            step_x: step(1.0, width),
            step_y: step(aspect_ratio, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// World-space size of one pixel on the image plane.
    pub fn pixel_step(&self) -> (f64, f64) {
        (self.step_x, self.step_y)
    }

    /// Image-plane coordinates of a pixel center, shifted by `jitter`
    /// expressed in pixels.
    pub fn pixel_to_world(&self, column: u32, row: u32, jitter: (f64, f64)) -> (f64, f64) {
        let x = if self.width > 1 {
            -1.0 + (column as f64 + jitter.0) * self.step_x
        } else {
            jitter.0 * self.step_x
        };
        let y = if self.height > 1 {
            -self.aspect_ratio + (row as f64 + jitter.1) * self.step_y
        } else {
            jitter.1 * self.step_y
        };
        (x, y)
    }

    /// Create a ray from the eye through the image-plane point `(x, y)`.
    pub fn shoot_to(&self, x: f64, y: f64) -> Result<Ray, MathError> {
        Ray::new(Vec3::zero(), Vec3::new(x, y, -1.0))
    }

    pub fn ray_for_pixel(&self, column: u32, row: u32, jitter: (f64, f64)) -> Result<Ray, MathError> {
        let (x, y) = self.pixel_to_world(column, row, jitter);
        self.shoot_to(x, y)
    }
}
