//! Random sampling utilities.
//!
//! Every concurrent worker owns its own [`Sampler`]. Streams are derived
//! from one base seed so a render is reproducible regardless of how rayon
//! schedules the work.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Vec3;

/// Directions shorter than this are resampled when building a cosine lobe.
const MIN_LOBE_LENGTH: f32 = 1e-4;

/// A deterministically seeded random stream.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Independent stream `index` derived from a base seed.
    pub fn for_stream(seed: u64, index: u64) -> Self {
        Self::new(seed ^ mix(index))
    }

    /// Uniform float in [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform point on the unit sphere (Marsaglia's method).
    pub fn on_sphere(&mut self) -> Vec3 {
        loop {
            let x1 = self.rng.gen_range(-1.0..=1.0f32);
            let x2 = self.rng.gen_range(-1.0..=1.0f32);
            let s = x1 * x1 + x2 * x2;
            if s > 1.0 {
                continue;
            }
            let root = (1.0 - s).sqrt();
            return Vec3::new(2.0 * x1 * root, 2.0 * x2 * root, 1.0 - 2.0 * s);
        }
    }

    /// Cosine-weighted direction about the unit `normal`.
    pub fn cosine_direction(&mut self, normal: Vec3) -> Vec3 {
        loop {
            let w = self.on_sphere() + normal;
            let len = w.length();
            if len >= MIN_LOBE_LENGTH {
                return w / len;
            }
        }
    }

    /// Direction inside the cone around +Z whose half-angle has cosine
    /// `min_cos`.
    pub fn in_cone(&mut self, min_cos: f32) -> Vec3 {
        let phi = std::f32::consts::TAU * self.uniform();
        let z = min_cos + (1.0 - min_cos) * self.uniform();
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * phi.cos(), r * phi.sin(), z)
    }
}

/// SplitMix64 finaliser, spreading consecutive stream indices apart.
fn mix(index: u64) -> u64 {
    let mut z = index.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
