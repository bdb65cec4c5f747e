// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
mod ray;
pub use aabb::Aabb;
pub use ray::Ray;

/// Linear RGB color. Channels are unbounded; encoding clamps them.
pub type Color = Vec3;

/// Average of the three color channels, used as the emitted power of a light.
#[inline]
pub fn power(color: Color) -> f32 {
    (color.x + color.y + color.z) / 3.0
}

/// Mirror-reflect `v` about the unit normal `n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}
