use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
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

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(about = "Photon-mapping ray tracer")]
pub struct Args {
    /// Image width in pixels
    #[arg(long, default_value = "640")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "480")]
    pub height: u32,

    /// Sub-pixel samples per axis (n x n samples per pixel)
    #[arg(long, short = 's', default_value = "2")]
    pub samples: u32,

    /// TOML render config; flags below override its values
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Output PNG path
    #[arg(long, short = 'o', default_value = "render.png")]
    pub output: PathBuf,

    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Number of photons to store
    #[arg(long)]
    pub photons: Option<usize>,

    /// Maximum reflection depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Base random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Jitter samples inside their sub-pixel strata
    #[arg(long)]
    pub jitter: bool,
}
