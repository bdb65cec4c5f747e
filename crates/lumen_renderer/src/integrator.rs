//! Photon-mapping ray tracer.
//!
//! Rendering happens in two phases:
//!
//! 1. **Build** (single threaded): bin the scene into a [`Grid`], shoot
//!    photons from every light, store their diffuse bounces and balance the
//!    resulting [`PhotonMap`].
//! 2. **Render** (parallel): trace camera rays through the grid and shade
//!    hits with shadow-tested direct light, a photon density estimate for
//!    indirect light and mirror reflection.

use std::f32::consts::PI;
use std::time::{Duration, Instant};

use lumen_core::{Material, PointLight, Scene};
use lumen_math::{reflect, Aabb, Mat3, Ray, Vec2, Vec3};
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket};
use crate::camera::{stratum_offset, Camera};
use crate::grid::Grid;
use crate::image::ImageBuffer;
use crate::photon_map::{Photon, PhotonMap, PhotonStore};
use crate::sampling::Sampler;
use crate::{Color, RenderConfig};

/// Offset applied along the normal to reflected ray origins.
const REFLECTION_BIAS: f32 = 1e-3;

/// Step taken past a surface when looking for the one behind it.
const SHADOW_PHOTON_NUDGE: f32 = 1e-4;

/// Counts from the photon emission pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmissionStats {
    /// Photons shot from lights
    pub emitted: usize,
    /// Photons recorded for the indirect estimate
    pub stored: usize,
    /// Shadow photons recorded
    pub shadow: usize,
}

/// Counts from a render pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStats {
    pub primary_rays: u64,
    /// Camera and reflection rays that hit geometry
    pub shading_hits: u64,
    pub elapsed: Duration,
}

/// Emission setup for one point light.
struct LightCone {
    position: Vec3,
    color: Color,
    /// Cosine of the half-angle that covers the scene bounds
    min_cos: f32,
    /// Maps +Z onto the cone axis
    rotation: Mat3,
}

impl LightCone {
    fn new(light: &PointLight, bounds: &Aabb) -> Self {
        let axis = (bounds.centroid() - light.position).normalize_or_zero();
        let min_cos = bounds
            .corners()
            .iter()
            .map(|c| (*c - light.position).normalize_or_zero().dot(axis))
            .fold(1.0f32, f32::min);

        Self {
            position: light.position,
            color: light.color,
            // A light inside the bounds has to cover the full sphere
            min_cos: if axis == Vec3::ZERO { -1.0 } else { min_cos.max(-1.0) },
            rotation: rotation_to(axis),
        }
    }
}

/// Rotation taking +Z to the unit vector `axis`.
///
/// Built from the Householder reflection swapping +Z and `axis`, composed
/// with a mirror in X so the result is a proper rotation.
fn rotation_to(axis: Vec3) -> Mat3 {
    let w = Vec3::Z - axis;
    let ww = w.dot(w);
    if ww < 1e-12 {
        return Mat3::IDENTITY;
    }
    let outer = Mat3::from_cols(w * w.x, w * w.y, w * w.z);
    let householder = Mat3::IDENTITY - outer * (2.0 / ww);
    householder * Mat3::from_diagonal(Vec3::new(-1.0, 1.0, 1.0))
}

/// Pick a light with probability proportional to its weight.
///
/// Falls back to the last light when rounding leaves `rnd` non-negative.
fn choose_light(weights: &[f32], mut rnd: f32) -> usize {
    for (i, w) in weights.iter().enumerate() {
        rnd -= w;
        if rnd < 0.0 {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

/// Owns the acceleration structures for one render of a scene.
pub struct RayTracer<'a> {
    scene: &'a Scene,
    grid: Grid<'a>,
    photon_map: PhotonMap,
    config: RenderConfig,
    /// Scales a photon sum into irradiance
    normalization: f32,
    emission: EmissionStats,
}

impl<'a> RayTracer<'a> {
    /// Run the build phase: grid construction, photon emission and balancing.
    pub fn new(scene: &'a Scene, config: RenderConfig) -> Self {
        let start = Instant::now();
        let grid = Grid::new(scene);
        log::info!(
            "Built {}x{}x{} grid over {} primitives in {:.2?}",
            grid.resolution().x,
            grid.resolution().y,
            grid.resolution().z,
            scene.primitive_count(),
            start.elapsed()
        );

        let start = Instant::now();
        let (store, emission) = emit_photons(&grid, &config);
        let photon_map = store.balance();
        log::info!(
            "Photon map: {} stored ({} shadow) from {} emitted, depth {}, built in {:.2?}",
            emission.stored,
            emission.shadow,
            emission.emitted,
            photon_map.depth(),
            start.elapsed()
        );

        let radius = config.gather_radius;
        let normalization = if config.photon_count == 0 {
            0.0
        } else {
            scene.point_light_count() as f32 * (200.0 / PI)
                / (config.photon_count as f32 * radius * radius)
        };

        Self {
            scene,
            grid,
            photon_map,
            config,
            normalization,
            emission,
        }
    }

    pub fn grid(&self) -> &Grid<'a> {
        &self.grid
    }

    pub fn photon_map(&self) -> &PhotonMap {
        &self.photon_map
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn emission_stats(&self) -> EmissionStats {
        self.emission
    }

    /// Radiance arriving along `ray` at recursion `depth`.
    ///
    /// `throughput` is the product of reflectivities along the path so far;
    /// recursion stops once it drops below the configured minimum.
    pub fn trace(&self, ray: &Ray, depth: u32, throughput: f32) -> Color {
        let mut hits = 0;
        self.shade(ray, depth, throughput, &mut hits)
    }

    fn shade(&self, ray: &Ray, depth: u32, throughput: f32, hits: &mut u64) -> Color {
        if depth > self.config.max_depth || throughput < self.config.min_throughput {
            return Color::ZERO;
        }

        let ray = ray.normalized();
        let Some(hit) = self.grid.intersect(&ray) else {
            return if depth == 0 {
                self.config.background
            } else {
                Color::ZERO
            };
        };
        let Some(material) = self.scene.material(hit.object) else {
            return Color::ZERO;
        };
        *hits += 1;

        let point = ray.at(hit.t);
        let normal = hit.normal;

        let mut color = self.indirect(point, normal) + self.direct(point, ray.direction, normal, material);

        if material.reflectivity > 0.0 {
            let direction = reflect(ray.direction, normal);
            let origin = point + normal * (REFLECTION_BIAS * direction.dot(normal).signum());
            let reflected = self.shade(
                &Ray::new(origin, direction),
                depth + 1,
                throughput * material.reflectivity,
                hits,
            );
            color += material.reflectivity * material.color * reflected;
        }

        color
    }

    /// Shadow-tested Lambert plus Blinn specular from every point light.
    pub fn direct(&self, point: Vec3, incoming: Vec3, normal: Vec3, material: &Material) -> Color {
        let mut color = Color::ZERO;

        for light in self.scene.point_lights() {
            let to_light = light.position - point;
            let distance = to_light.length();
            if distance == 0.0 {
                continue;
            }
            let l = to_light / distance;
            let cos = l.dot(normal);
            if cos <= 0.0 {
                continue;
            }
            if self.grid.shadow_intersect(&Ray::new(point, l), distance) {
                continue;
            }

            color += cos * light.color * material.color;

            if material.specular > 0.0 {
                let half = l - incoming.normalize_or_zero();
                let len = half.length();
                if len > 0.0 {
                    let spec = (half / len).dot(normal).max(0.0);
                    color += material.specular * spec.powf(material.shininess) * light.color;
                }
            }
        }

        color
    }

    /// Photon density estimate of indirect irradiance at `point`.
    pub fn indirect(&self, point: Vec3, normal: Vec3) -> Color {
        let mut sum = Color::ZERO;
        let mut count = 0usize;

        self.photon_map
            .for_each_within(point, self.config.gather_radius, |photon| {
                if photon.shadow {
                    return;
                }
                count += 1;
                let cos = (-photon.direction).dot(normal);
                if cos > 0.0 {
                    sum += cos * photon.color;
                }
            });

        if count > self.config.min_gather_photons {
            sum * self.normalization
        } else {
            Color::ZERO
        }
    }

    /// Average of all samples of pixel `(x, y)`.
    pub(crate) fn render_pixel(
        &self,
        camera: &dyn Camera,
        x: u32,
        y: u32,
        sampler: &mut Sampler,
        hits: &mut u64,
    ) -> Color {
        let n = camera.samples_per_axis();
        let samples = camera.samples_per_pixel().max(1);

        let mut pixel = Color::ZERO;
        for s in 0..samples {
            let ray = if self.config.jitter {
                let jitter = Vec2::new(sampler.uniform(), sampler.uniform());
                camera.shoot_ray_at(x, y, stratum_offset(s, n, jitter))
            } else {
                camera.shoot_ray(x, y, s)
            };
            pixel += self.shade(&ray, 0, 1.0, hits);
        }
        pixel / samples as f32
    }

    /// Render every pixel of `camera`'s image in parallel buckets.
    pub fn render(&self, camera: &dyn Camera) -> (ImageBuffer, RenderStats) {
        let start = Instant::now();
        let (width, height) = (camera.width(), camera.height());
        let buckets = generate_buckets(width, height, self.config.bucket_size);
        log::info!(
            "Rendering {}x{} at {} spp in {} buckets",
            width,
            height,
            camera.samples_per_pixel(),
            buckets.len()
        );

        let results: Vec<_> = buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, self, camera))
            .collect();

        let mut image = ImageBuffer::new(width, height);
        let mut stats = RenderStats::default();
        for result in results {
            let bucket = result.bucket;
            for (i, color) in result.pixels.iter().enumerate() {
                let x = bucket.x + i as u32 % bucket.width;
                let y = bucket.y + i as u32 / bucket.width;
                image.set(x, y, *color);
            }
            stats.shading_hits += result.shading_hits;
        }

        stats.primary_rays = u64::from(width) * u64::from(height) * u64::from(camera.samples_per_pixel());
        stats.elapsed = start.elapsed();
        log::info!(
            "Rendered {} primary rays ({} shading hits) in {:.2?}",
            stats.primary_rays,
            stats.shading_hits,
            stats.elapsed
        );

        (image, stats)
    }
}

/// Shoot photons until `photon_count` are stored.
fn emit_photons(grid: &Grid<'_>, config: &RenderConfig) -> (PhotonStore, EmissionStats) {
    let scene = grid.scene();
    let lights = scene.point_lights();
    let total_power: f32 = lights.iter().map(|l| l.power).sum();
    let stats = EmissionStats::default();

    if config.photon_count == 0 {
        return (PhotonStore::new(), stats);
    }
    if lights.is_empty() || total_power <= 0.0 {
        log::warn!("No emitting lights, skipping photon emission");
        return (PhotonStore::new(), stats);
    }
    if grid.bounds().is_empty() {
        log::warn!("Scene has no bounded geometry, skipping photon emission");
        return (PhotonStore::new(), stats);
    }

    let bounds = grid.bounds();
    let cones: Vec<LightCone> = lights.iter().map(|l| LightCone::new(l, &bounds)).collect();
    let weights: Vec<f32> = lights.iter().map(|l| l.power / total_power).collect();

    let mut emitter = PhotonEmitter {
        grid,
        config,
        sampler: Sampler::new(config.seed),
        store: PhotonStore::with_capacity(config.photon_count),
        stats,
    };

    let limit = config.photon_count.saturating_mul(config.emission_limit.max(1));
    while !emitter.store_full() && emitter.stats.emitted < limit {
        let cone = &cones[choose_light(&weights, emitter.sampler.uniform())];
        let direction = cone.rotation * emitter.sampler.in_cone(cone.min_cos);
        emitter.stats.emitted += 1;
        emitter.trace(Ray::new(cone.position, direction), cone.color, 0);
    }

    if !emitter.store_full() {
        log::warn!(
            "Photon emission stopped after {} photons with only {} of {} stored",
            emitter.stats.emitted,
            emitter.stats.stored,
            config.photon_count
        );
    }

    (emitter.store, emitter.stats)
}

/// Mutable state of the emission pass.
struct PhotonEmitter<'g, 'a> {
    grid: &'g Grid<'a>,
    config: &'g RenderConfig,
    sampler: Sampler,
    store: PhotonStore,
    stats: EmissionStats,
}

impl PhotonEmitter<'_, '_> {
    fn store_full(&self) -> bool {
        self.stats.stored >= self.config.photon_count
    }

    /// Follow one photon through up to `photon_depth` diffuse bounces.
    ///
    /// The first hit is lit directly and is not recorded.
    fn trace(&mut self, mut ray: Ray, mut color: Color, level: u32) {
        for level in level..=self.config.photon_depth {
            let Some(hit) = self.grid.intersect(&ray) else {
                return;
            };
            let Some(material) = self.grid.scene().material(hit.object) else {
                return;
            };
            let point = ray.at(hit.t);

            if level == 0 {
                if self.config.shadow_photons {
                    self.trace_shadow(point, ray.direction, hit.object);
                }
            } else {
                color *= material.color;
                self.store.push(Photon::new(point, ray.direction, color));
                self.stats.stored += 1;
                if self.store_full() {
                    return;
                }
            }

            if self.sampler.uniform() >= material.diffusivity {
                return;
            }

            // Bounce off the side the photon arrived from
            let normal = if hit.normal.dot(ray.direction) > 0.0 {
                -hit.normal
            } else {
                hit.normal
            };
            ray = Ray::new(point, self.sampler.cosine_direction(normal));
        }
    }

    /// Record a shadow photon on the first surface behind `object`.
    fn trace_shadow(&mut self, mut origin: Vec3, direction: Vec3, object: usize) {
        loop {
            origin += direction * SHADOW_PHOTON_NUDGE;
            let ray = Ray::new(origin, direction);
            let Some(hit) = self.grid.intersect(&ray) else {
                return;
            };
            origin = ray.at(hit.t);
            if hit.object != object {
                self.store.push(Photon::shadow(origin, direction));
                self.stats.shadow += 1;
                return;
            }
        }
    }
}
