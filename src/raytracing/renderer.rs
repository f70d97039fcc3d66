//! Pixel loop and jittered multi-sampling.
//!
//! The loop itself is single-threaded. [`Renderer::render_rows`] fills a
//! caller-owned band of output rows so a driver can hand disjoint bands
//! (each with its own generator) to separate workers.

use std::ops::Range;

use log::{debug, info};
use rand::Rng;
use thiserror::Error;

use super::camera::Camera;
use super::core::Scene;
use super::shading::{trace, RenderConfig};
use super::{Color, MathError, Vec3};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot build camera ray: {0}")]
    Ray(#[from] MathError),
    #[error("band of {got} pixels does not match rows {rows:?} of a {width} pixel wide image")]
    BandSize {
        rows: Range<u32>,
        width: u32,
        got: usize,
    },
}

/// Rendered frame, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::zero(); width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Pixel at column `x` of output row `y` (row 0 at the top).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Mutable slice covering output rows `rows`.
    pub fn rows_mut(&mut self, rows: Range<u32>) -> &mut [Color] {
        let start = rows.start as usize * self.width as usize;
        let end = rows.end as usize * self.width as usize;
        &mut self.pixels[start..end]
    }

    /// Height × width × 3 bytes, row-major, top row first.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color.to_rgb());
        }
        bytes
    }
}

pub struct Renderer<'a> {
    camera: Camera,
    scene: &'a Scene,
    config: &'a RenderConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(camera: Camera, scene: &'a Scene, config: &'a RenderConfig) -> Self {
        Self {
            camera,
            scene,
            config,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Average of the samples for the pixel at `column` of render row `row`
    /// (row 0 at the bottom).
    pub fn render_pixel(
        &self,
        column: u32,
        row: u32,
        rng: &mut impl Rng,
    ) -> Result<Color, RenderError> {
        let samples = self.config.samples_per_pixel.max(1);
        let mut color = Vec3::zero();
        for _ in 0..samples {
            let jitter = if samples > 1 {
                (rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5))
            } else {
                (0.0, 0.0)
            };
            let ray = self.camera.ray_for_pixel(column, row, jitter)?;
            color += trace(self.scene, &ray, 0, self.config);
        }
        Ok(color / samples as f64)
    }

    /// Render output rows `rows` (row 0 at the top) into `band`, which
    /// holds exactly those rows.
    pub fn render_rows(
        &self,
        rows: Range<u32>,
        band: &mut [Color],
        rng: &mut impl Rng,
    ) -> Result<(), RenderError> {
        let width = self.camera.width();
        let expected = rows.len() * width as usize;
        if band.len() != expected || rows.end > self.camera.height() {
            return Err(RenderError::BandSize {
                rows,
                width,
                got: band.len(),
            });
        }
        debug!("rendering rows {:?}", rows);

        let height = self.camera.height();
        for (i, output_row) in rows.clone().enumerate() {
            // the camera counts rows from the bottom, the buffer from the top
            let render_row = height - 1 - output_row;
            for column in 0..width {
                band[i * width as usize + column as usize] =
                    self.render_pixel(column, render_row, rng)?;
            }
        }
        Ok(())
    }

    pub fn render(&self, rng: &mut impl Rng) -> Result<PixelBuffer, RenderError> {
        let (width, height) = (self.camera.width(), self.camera.height());
        info!(
            "rendering {}x{} with {} sample(s) per pixel",
            width, height, self.config.samples_per_pixel
        );
        let mut buffer = PixelBuffer::new(width, height);
        self.render_rows(0..height, &mut buffer.pixels, rng)?;
        Ok(buffer)
    }
}
