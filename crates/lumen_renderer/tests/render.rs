//! End-to-end shading scenarios.

use lumen_core::{Material, Scene};
use lumen_math::{Color, Ray, Vec3};
use lumen_renderer::{RayTracer, RenderConfig};

fn no_photons() -> RenderConfig {
    RenderConfig {
        photon_count: 0,
        ..Default::default()
    }
}

#[test]
fn reflective_sphere_at_depth_zero_shows_only_direct_light() {
    let mut scene = Scene::new("mirror");
    let mirror = Material::diffuse(Color::splat(0.5), 0.0).with_reflectivity(1.0);
    scene.add_sphere(Vec3::ZERO, 1.0, mirror);
    scene.add_point_light(Vec3::new(0.0, 0.0, 10.0), Color::ONE);

    let shallow = RayTracer::new(&scene, RenderConfig { max_depth: 0, ..no_photons() });
    let deep = RayTracer::new(&scene, RenderConfig { max_depth: 3, ..no_photons() });

    // Head-on: Lambert term is cos(0) * light * material
    let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
    let color = shallow.trace(&ray, 0, 1.0);
    assert!((color - Color::splat(0.5)).length() < 1e-4);

    // With recursion the reflected ray escapes and sees nothing at depth 1
    let reflected = deep.trace(&ray, 0, 1.0);
    assert!((reflected - color).length() < 1e-4);
}

#[test]
fn throughput_below_threshold_returns_black() {
    let mut scene = Scene::new("one");
    scene.add_sphere(Vec3::ZERO, 1.0, Material::default());
    scene.add_point_light(Vec3::new(0.0, 0.0, 10.0), Color::ONE);
    let tracer = RayTracer::new(&scene, no_photons());

    let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
    assert_eq!(tracer.trace(&ray, 0, 0.001), Color::ZERO);
    assert!(tracer.trace(&ray, 0, 1.0).length() > 0.0);
}

#[test]
fn facing_mirrors_terminate() {
    let mut scene = Scene::new("hall of mirrors");
    let mirror = Material::diffuse(Color::ONE, 0.0).with_reflectivity(1.0);
    scene.add_plane(Vec3::Z, Vec3::new(0.0, 0.0, -2.0), mirror).unwrap();
    scene.add_plane(Vec3::NEG_Z, Vec3::new(0.0, 0.0, 2.0), mirror).unwrap();
    scene.add_point_light(Vec3::ZERO, Color::ONE);

    let tracer = RayTracer::new(&scene, RenderConfig { max_depth: 8, ..no_photons() });
    let color = tracer.trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z), 0, 1.0);
    // Each bounce adds one unit of direct light, bounded by the depth limit
    assert!(color.x > 1.0 && color.x <= 9.0 + 1e-3);
}

#[test]
fn photons_brighten_shadowed_floor() {
    let mut scene = Scene::new("bounce");
    let white = Material::diffuse(Color::ONE, 1.0);
    scene.add_plane(Vec3::Y, Vec3::ZERO, white).unwrap();
    scene.add_sphere(Vec3::new(0.0, 1.5, 0.0), 1.0, white);
    scene.add_sphere(Vec3::new(3.0, 1.0, 0.0), 1.0, white);
    scene.add_point_light(Vec3::new(0.0, 8.0, 0.0), Color::ONE);

    let config = RenderConfig {
        photon_count: 20_000,
        gather_radius: 0.5,
        ..Default::default()
    };
    let tracer = RayTracer::new(&scene, config);
    assert_eq!(tracer.emission_stats().stored, 20_000);

    // Straight down under the first sphere: no direct light reaches here
    let under = Vec3::new(0.0, 0.0, 0.0);
    assert_eq!(tracer.direct(under, Vec3::NEG_Y, Vec3::Y, &white), Color::ZERO);
    assert!(tracer.indirect(under, Vec3::Y).x > 0.0);
}
