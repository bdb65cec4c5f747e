//! Square image tiles rendered in parallel with rayon.
//!
//! Each bucket draws its random numbers from its own [`Sampler`] stream, so
//! the image does not depend on which thread renders which bucket.

use crate::camera::Camera;
use crate::integrator::RayTracer;
use crate::sampling::Sampler;
use crate::Color;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    /// First pixel column
    pub x: u32,
    /// First pixel row (row 0 is the bottom of the image)
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Tile a `width x height` image into buckets of at most `bucket_size`
/// pixels per side, ordered from the image center outward.
///
/// `index` is the position in that order and seeds the bucket's sampler.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width)
                .step_by(size as usize)
                .map(move |x| Bucket::new(x, y, size.min(width - x), size.min(height - y), 0))
        })
        .collect();

    let center = (width as f32 / 2.0, height as f32 / 2.0);
    buckets.sort_by(|a, b| {
        center_distance(a, center).total_cmp(&center_distance(b, center))
    });
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }
    buckets
}

/// Squared distance from the bucket's midpoint to `center`.
fn center_distance(bucket: &Bucket, center: (f32, f32)) -> f32 {
    let dx = bucket.x as f32 + bucket.width as f32 / 2.0 - center.0;
    let dy = bucket.y as f32 + bucket.height as f32 / 2.0 - center.1;
    dx * dx + dy * dy
}

/// Render a single bucket to a vector of colors.
/// 
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket(bucket: &Bucket, tracer: &RayTracer<'_>, camera: &dyn Camera) -> BucketResult {
    let mut sampler = Sampler::for_stream(tracer.config().seed, bucket.index as u64);
    let mut shading_hits = 0;
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);
    
    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let global_x = bucket.x + local_x;
            let global_y = bucket.y + local_y;
            let color = tracer.render_pixel(camera, global_x, global_y, &mut sampler, &mut shading_hits);
            pixels.push(color);
        }
    }
    
    BucketResult {
        bucket: *bucket,
        pixels,
        shading_hits,
    }
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
    /// Rays that hit geometry while shading this bucket
    pub shading_hits: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    
    fn covered_pixels(buckets: &[Bucket], width: u32, height: u32) -> Vec<u32> {
        let mut hits = vec![0; (width * height) as usize];
        for b in buckets {
            for y in b.y..b.y + b.height {
                for x in b.x..b.x + b.width {
                    hits[(y * width + x) as usize] += 1;
                }
            }
        }
        hits
    }

    #[test]
    fn test_buckets_tile_image_once() {
        for (w, h, size) in [(128, 128, 64), (100, 37, 16), (5, 9, 64)] {
            let buckets = generate_buckets(w, h, size);
            assert!(covered_pixels(&buckets, w, h).iter().all(|&n| n == 1));
            assert!(buckets.iter().all(|b| b.width <= size && b.height <= size));
        }
        assert_eq!(generate_buckets(100, 100, 64).len(), 4);
    }

    #[test]
    fn test_center_bucket_first() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9);
        assert_eq!((buckets[0].x, buckets[0].y), (64, 64));
        let order: Vec<usize> = buckets.iter().map(|b| b.index).collect();
        assert_eq!(order, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_bucket_size_still_covers_image() {
        let buckets = generate_buckets(3, 2, 0);
        assert_eq!(buckets.len(), 6);
    }

    #[test]
    fn test_bucket_results_independent_of_order() {
        use crate::{PinholeCamera, RenderConfig};
        use lumen_core::{Material, Scene};
        use lumen_math::Vec3;

        let mut scene = Scene::new("jitter");
        scene.add_sphere(Vec3::ZERO, 1.0, Material::default());
        scene.add_point_light(Vec3::new(0.0, 4.0, 4.0), Color::ONE);
        let config = RenderConfig {
            photon_count: 0,
            jitter: true,
            bucket_size: 4,
            ..Default::default()
        };
        let tracer = RayTracer::new(&scene, config);
        let camera = PinholeCamera::new()
            .with_resolution(8, 8)
            .with_position(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y)
            .with_samples(2);

        let buckets = generate_buckets(8, 8, 4);
        let forward: Vec<_> = buckets.iter().map(|b| render_bucket(b, &tracer, &camera).pixels).collect();
        let backward: Vec<_> = buckets.iter().rev().map(|b| render_bucket(b, &tracer, &camera).pixels).collect();
        let backward: Vec<_> = backward.into_iter().rev().collect();
        assert_eq!(forward, backward);
    }
}
