//! Built-in demo scene.

use lumen_core::{Material, Mesh, Scene, SceneError, Transform};
use lumen_math::{Color, Vec3};
use lumen_renderer::PinholeCamera;

/// Edge length of the cube grid laid out on the floor.
const CUBES_PER_SIDE: i32 = 4;

/// A floor and back wall, two spheres (one mirrored), a field of rotated
/// cubes and a disc light up and to the left.
pub fn build_scene() -> Result<Scene, SceneError> {
    let mut scene = Scene::new("demo");

    let white = Material::diffuse(Color::ONE, 0.5);
    let blue = Material::diffuse(Color::new(0.04, 0.3, 0.6), 1.0).with_specular(0.2, 128.0);
    let green = Material::diffuse(Color::new(0.3, 0.6, 0.04), 1.0).with_specular(0.2, 128.0);
    let mirror = Material::diffuse(Color::splat(0.9), 0.2).with_reflectivity(0.8);

    scene.add_plane(Vec3::Y, Vec3::ZERO, white)?;
    scene.add_plane(Vec3::Z, Vec3::new(0.0, 0.0, -6.0), white)?;

    scene.add_sphere(Vec3::new(-1.6, 1.2, -1.5), 1.2, mirror);
    scene.add_sphere(Vec3::new(1.8, 0.8, -2.5), 0.8, blue);

    let cube = scene.add_prototype(Mesh::unit_cube())?;
    for i in 0..CUBES_PER_SIDE {
        for j in 0..CUBES_PER_SIDE {
            let x = (i - CUBES_PER_SIDE / 2) as f32 * 1.1 + 0.5;
            let z = j as f32 * 0.9 + 0.4;
            let angle = (i * CUBES_PER_SIDE + j) as f32 * 0.37;
            let transform = Transform::from_axis_angle(Vec3::new(x, 0.25, z), Vec3::Y, angle, 0.5);
            let material = if (i + j) % 2 == 0 { blue } else { green };
            if let Err(err) = scene.add_polyhedron(cube, &transform, material) {
                log::warn!("Skipping cube ({i}, {j}): {err}");
            }
        }
    }

    let light = Vec3::new(-8.0, 10.0, 8.0);
    scene.add_area_light(light, -light.normalize(), 2.0, Color::ONE, 64);

    log::info!(
        "Demo scene: {} objects, {} primitives, {} point lights",
        scene.object_count(),
        scene.primitive_count(),
        scene.point_light_count()
    );

    Ok(scene)
}

/// Camera framing [`build_scene`].
pub fn camera(width: u32, height: u32, samples: u32) -> PinholeCamera {
    PinholeCamera::new()
        .with_resolution(width, height)
        .with_position(Vec3::new(0.0, 3.0, 9.0), Vec3::new(0.0, 0.8, 0.0), Vec3::Y)
        .with_lens(45.0, 1.0)
        .with_samples(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scene_builds() {
        let scene = build_scene().unwrap();
        let cubes = (CUBES_PER_SIDE * CUBES_PER_SIDE) as usize;
        assert_eq!(scene.object_count(), 4 + cubes);
        assert_eq!(scene.primitive_count(), 4 + cubes * 12);
        assert_eq!(scene.point_light_count(), 64);
    }
}
