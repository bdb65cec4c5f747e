//! Cameras for primary ray generation.
//!
//! Pixel `(0, 0)` is the bottom-left corner of the image. Each pixel is
//! split into `n x n` strata; sample index `s` selects stratum
//! `(s % n, s / n)`.

use lumen_math::{Ray, Vec2, Vec3};

/// Produces primary rays for pixel samples.
pub trait Camera: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Strata per pixel edge.
    fn samples_per_axis(&self) -> u32;

    fn samples_per_pixel(&self) -> u32 {
        let n = self.samples_per_axis();
        n * n
    }

    /// Ray through pixel `(x, y)` at sub-pixel `offset` in `[0, 1)^2`.
    fn shoot_ray_at(&self, x: u32, y: u32, offset: Vec2) -> Ray;

    /// Ray through the lower-left corner of stratum `sample`.
    fn shoot_ray(&self, x: u32, y: u32, sample: u32) -> Ray {
        self.shoot_ray_at(x, y, stratum_offset(sample, self.samples_per_axis(), Vec2::ZERO))
    }
}

/// Sub-pixel offset of stratum `sample`, shifted by `jitter` in `[0, 1)^2`
/// stratum units.
pub fn stratum_offset(sample: u32, samples_per_axis: u32, jitter: Vec2) -> Vec2 {
    let n = samples_per_axis.max(1);
    let sx = (sample % n) as f32;
    let sy = (sample / n) as f32;
    (Vec2::new(sx, sy) + jitter) / n as f32
}

/// Camera basis: `right` and `up` span the image plane.
fn basis(direction: Vec3, up: Vec3) -> (Vec3, Vec3) {
    let right = -up.cross(direction).normalize();
    let up = right.cross(direction).normalize();
    (right, up)
}

/// Perspective camera with a vertical field of view.
#[derive(Debug, Clone)]
pub struct PinholeCamera {
    pub image_width: u32,
    pub image_height: u32,
    samples_per_axis: u32,

    position: Vec3,
    look_at: Vec3,
    vup: Vec3,
    vfov: f32, // degrees
    near: f32,

    // Cached values, refreshed by every builder call
    direction: Vec3,
    right: Vec3,
    up: Vec3,
    pixel_size: Vec2,
}

impl PinholeCamera {
    /// Camera at the origin looking down -Z, 90 degree fov, 800x450.
    pub fn new() -> Self {
        Self {
            image_width: 800,
            image_height: 450,
            samples_per_axis: 1,
            position: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            vup: Vec3::Y,
            vfov: 90.0,
            near: 1.0,
            direction: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            pixel_size: Vec2::ZERO,
        }
        .update()
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self.update()
    }

    /// Set samples per pixel edge.
    pub fn with_samples(mut self, samples_per_axis: u32) -> Self {
        self.samples_per_axis = samples_per_axis.max(1);
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, position: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.position = position;
        self.look_at = look_at;
        self.vup = vup;
        self.update()
    }

    /// Set vertical field of view (degrees) and image plane distance.
    pub fn with_lens(mut self, vfov: f32, near: f32) -> Self {
        self.vfov = vfov;
        self.near = near;
        self.update()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    fn update(mut self) -> Self {
        self.direction = (self.look_at - self.position).normalize();
        (self.right, self.up) = basis(self.direction, self.vup);

        let aspect = self.image_width as f32 / self.image_height as f32;
        let y_half = (self.vfov.to_radians() / 2.0).tan() * self.near;
        let x_half = aspect * y_half;
        self.pixel_size = Vec2::new(
            x_half / (self.image_width as f32 / 2.0),
            y_half / (self.image_height as f32 / 2.0),
        );
        self
    }
}

impl Default for PinholeCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for PinholeCamera {
    fn width(&self) -> u32 {
        self.image_width
    }

    fn height(&self) -> u32 {
        self.image_height
    }

    fn samples_per_axis(&self) -> u32 {
        self.samples_per_axis
    }

    fn shoot_ray_at(&self, x: u32, y: u32, offset: Vec2) -> Ray {
        let half_w = self.image_width as f32 / 2.0;
        let half_h = self.image_height as f32 / 2.0;
        let dir = self.up * ((y as f32 - half_h + offset.y) * self.pixel_size.y)
            + self.right * ((x as f32 - half_w + offset.x) * self.pixel_size.x)
            + self.direction * self.near;
        Ray::new(self.position, dir.normalize())
    }
}

/// Parallel projection camera.
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    pub image_width: u32,
    pub image_height: u32,
    samples_per_axis: u32,
    position: Vec3,
    direction: Vec3,
    right: Vec3,
    up: Vec3,
    /// World-space size of one pixel
    pixel_size: f32,
}

impl OrthographicCamera {
    /// `view_height` is the world-space height covered by the image.
    pub fn new(position: Vec3, direction: Vec3, vup: Vec3, view_height: f32) -> Self {
        let direction = direction.normalize();
        let (right, up) = basis(direction, vup);
        Self {
            image_width: 800,
            image_height: 450,
            samples_per_axis: 1,
            position,
            direction,
            right,
            up,
            pixel_size: view_height / 450.0,
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        let view_height = self.pixel_size * self.image_height as f32;
        self.image_width = width.max(1);
        self.image_height = height.max(1);
        self.pixel_size = view_height / self.image_height as f32;
        self
    }

    pub fn with_samples(mut self, samples_per_axis: u32) -> Self {
        self.samples_per_axis = samples_per_axis.max(1);
        self
    }
}

impl Camera for OrthographicCamera {
    fn width(&self) -> u32 {
        self.image_width
    }

    fn height(&self) -> u32 {
        self.image_height
    }

    fn samples_per_axis(&self) -> u32 {
        self.samples_per_axis
    }

    fn shoot_ray_at(&self, x: u32, y: u32, offset: Vec2) -> Ray {
        let half_w = self.image_width as f32 / 2.0;
        let half_h = self.image_height as f32 / 2.0;
        let origin = self.position
            + self.up * ((y as f32 - half_h + offset.y) * self.pixel_size)
            + self.right * ((x as f32 - half_w + offset.x) * self.pixel_size);
        Ray::new(origin, self.direction)
    }
}
