use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use image::{ImageBuffer, Rgb};
use log::{info, warn, LevelFilter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use whitted_rs::raytracing::camera::Camera;
use whitted_rs::raytracing::parser::{ImageData, SceneParser};
use whitted_rs::raytracing::renderer::{PixelBuffer, RenderError, Renderer};
use whitted_rs::raytracing::shading::{RenderConfig, DEFAULT_MAX_BOUNCES};
use whitted_rs::raytracing::Color;

/// Rows handed to a single worker when rendering in parallel.
const BAND_ROWS: u32 = 16;

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input path to the scene file
    scene: PathBuf,
    /// where the rendered image is saved, the format follows the extension
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,
    /// the number of rays shot per pixel
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    sample_rate: u32,
    /// override the width from the scene header
    #[arg(long)]
    width: Option<u32>,
    /// override the height from the scene header
    #[arg(long)]
    height: Option<u32>,
    #[arg(long, default_value_t = DEFAULT_MAX_BOUNCES)]
    max_bounces: u32,
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    hard_shadows: bool,
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    reflection: bool,
    /// lambertian diffuse, only used when phong is off
    #[arg(long, action = ArgAction::Set, default_value_t = false)]
    lambert: bool,
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    phong: bool,
    /// shade surfaces by distance instead of lighting them
    #[arg(long)]
    depth_shading: bool,
    /// apply gamma correction to the final image
    #[arg(long)]
    gamma_correction: bool,
    /// seed for the sample jitter, random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// render row bands on all cores
    #[arg(long)]
    parallel: bool,
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

impl Args {
    fn render_config(&self) -> RenderConfig {
        RenderConfig {
            samples_per_pixel: self.sample_rate,
            max_bounces: self.max_bounces,
            hard_shadows: self.hard_shadows,
            reflection: self.reflection,
            lambert: self.lambert,
            phong: self.phong,
            depth_shading: self.depth_shading,
            ..RenderConfig::default()
        }
    }
}

fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn gamma_correction(value: f64) -> f64 {
    if value > 0.0 {
        value.powf(1.0 / 2.2)
    } else {
        0.0
    }
}

fn to_pixel(color: Color, gamma: bool) -> Rgb<u8> {
    let color = if gamma {
        Color::new(
            gamma_correction(color.x),
            gamma_correction(color.y),
            gamma_correction(color.z),
        )
    } else {
        color
    };
    Rgb(color.to_rgb())
}

fn load_scene(path: &Path) -> Result<ImageData> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read scene file {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    match SceneParser::new(&content).with_base_dir(base_dir).parse_scene() {
        Ok(data) => Ok(data),
        Err(parser_error) => {
            parser_error.print_error_location(&content);
            bail!("cannot parse {}: {}", path.display(), parser_error);
        }
    }
}

fn render_parallel(renderer: &Renderer, seed: u64) -> Result<PixelBuffer, RenderError> {
    let (width, height) = (renderer.camera().width(), renderer.camera().height());
    let mut buffer = PixelBuffer::new(width, height);
    buffer
        .pixels
        .par_chunks_mut(BAND_ROWS as usize * width as usize)
        .enumerate()
        .try_for_each(|(band, pixels)| {
            let start = band as u32 * BAND_ROWS;
            let rows = start..(start + BAND_ROWS).min(height);
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(band as u64));
            renderer.render_rows(rows, pixels, &mut rng)
        })?;
    Ok(buffer)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.clone().into());

    let ImageData {
        width,
        height,
        scene,
    } = load_scene(&args.scene)?;
    let width = args.width.unwrap_or(width);
    let height = args.height.unwrap_or(height);
    if width == 0 || height == 0 {
        bail!("image size must be positive, got {}x{}", width, height);
    }

    let config = args.render_config();
    if scene.lights.is_empty() && (config.lambert || config.phong) {
        warn!("scene has no light, surfaces keep their flat color");
    }
    if scene.lights.len() > 1 {
        warn!(
            "scene has {} lights, only the first one is used",
            scene.lights.len()
        );
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("sampling seed {}", seed);

    let renderer = Renderer::new(Camera::new(width, height), &scene, &config);
    let start = Instant::now();
    let pixels = if args.parallel {
        render_parallel(&renderer, seed)?
    } else {
        renderer.render(&mut StdRng::seed_from_u64(seed))?
    };
    info!("rendered {}x{} in {:?}", width, height, start.elapsed());

    let image = ImageBuffer::from_fn(width, height, |x, y| {
        to_pixel(pixels.get(x, y), args.gamma_correction)
    });
    image
        .save(&args.output)
        .with_context(|| format!("cannot save {}", args.output.display()))?;
    info!("saved {}", args.output.display());
    Ok(())
}
