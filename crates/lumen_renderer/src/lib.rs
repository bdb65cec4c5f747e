//! Lumen Renderer - grid-accelerated ray tracing with photon mapping
//!
//! The renderer borrows a finished [`lumen_core::Scene`] and builds two
//! read-only indices over it: a uniform [`Grid`] for ray queries and a
//! balanced [`PhotonMap`] for indirect light. [`RayTracer`] owns both and
//! renders images through any [`Camera`].

mod bucket;
mod camera;
mod config;
mod grid;
mod image;
mod integrator;
mod photon_map;
mod sampling;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{stratum_offset, Camera, OrthographicCamera, PinholeCamera};
pub use config::{ConfigError, RenderConfig};
pub use grid::{Grid, GridHit};
pub use image::{color_to_srgb8, srgb_encode, srgb_encode_f32, ImageBuffer};
pub use integrator::{EmissionStats, RayTracer, RenderStats};
pub use photon_map::{Photon, PhotonMap, PhotonStore};
pub use sampling::Sampler;

/// Re-export common math types from lumen_math
pub use lumen_math::{Color, Ray, Vec3};
