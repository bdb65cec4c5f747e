//! Lumen command line renderer.
//!
//! Builds the demo scene, renders it with photon-mapped global illumination
//! and writes a PNG.

mod cli;
mod demo;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_renderer::{RayTracer, RenderConfig};

use cli::Args;

/// Merge the optional config file with command line overrides.
fn load_config(args: &Args) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };

    if let Some(photons) = args.photons {
        config.photon_count = photons;
    }
    if let Some(depth) = args.depth {
        config.max_depth = depth;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.jitter {
        config.jitter = true;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Lumen");

    let config = load_config(&args)?;
    log::debug!("{:?}", config);

    let scene = demo::build_scene().context("Failed to build demo scene")?;
    let camera = demo::camera(args.width, args.height, args.samples);

    let single_precision = config.single_precision_srgb;
    let tracer = RayTracer::new(&scene, config);
    let (image, _stats) = tracer.render(&camera);

    let bytes = if single_precision {
        image.to_srgb8_f32()
    } else {
        image.to_srgb8()
    };
    let rgb = image::RgbImage::from_raw(image.width, image.height, bytes)
        .context("Image buffer size does not match its dimensions")?;
    rgb.save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    log::info!("Saved {}", args.output.display());
    Ok(())
}
