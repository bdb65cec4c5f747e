//! Render configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::Color;

/// Errors raised while loading or validating a [`RenderConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Render configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum specular recursion depth
    pub max_depth: u32,
    /// Throughput below which recursion stops
    pub min_throughput: f32,
    /// Number of photons to store before balancing
    pub photon_count: usize,
    /// Maximum number of bounces per emitted photon
    pub photon_depth: u32,
    /// Radius of the photon gather sphere
    pub gather_radius: f32,
    /// Indirect light is ignored unless more photons than this are found
    pub min_gather_photons: usize,
    /// Color of primary rays that miss everything
    pub background: Color,
    /// Base seed for all random streams
    pub seed: u64,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Jitter sub-pixel samples inside their strata
    pub jitter: bool,
    /// Also record shadow photons behind first hits
    pub shadow_photons: bool,
    /// Emission gives up after `photon_count * emission_limit` photons
    pub emission_limit: usize,
    /// Encode output with the single precision curve ([`crate::srgb_encode_f32`])
    pub single_precision_srgb: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_throughput: 0.01,
            photon_count: 1_000_000,
            photon_depth: 6,
            gather_radius: 0.2,
            min_gather_photons: 8,
            background: Color::ONE,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            jitter: false,
            shadow_photons: false,
            emission_limit: 64,
            single_precision_srgb: false,
        }
    }
}

impl RenderConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gather_radius.is_nan() || self.gather_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "gather_radius must be positive, got {}",
                self.gather_radius
            )));
        }
        if self.bucket_size == 0 {
            return Err(ConfigError::Invalid("bucket_size must be non-zero".into()));
        }
        if !(0.0..=1.0).contains(&self.min_throughput) {
            return Err(ConfigError::Invalid(format!(
                "min_throughput must lie in [0, 1], got {}",
                self.min_throughput
            )));
        }
        Ok(())
    }
}
