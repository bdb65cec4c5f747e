//! Infinite plane primitive.

use crate::{Material, HIT_EPSILON};
use lumen_math::{Ray, Vec3};

/// Below this |n . d| the ray is treated as parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-4;

/// An infinite plane given by a unit normal and a point on it.
///
/// Planes are unbounded, so they have no bounding box.
#[derive(Debug, Clone)]
pub struct Plane {
    normal: Vec3,
    point: Vec3,
    material: Material,
}

impl Plane {
    /// Create a new plane. The normal is normalized; a zero normal yields
    /// a plane that never reports a hit.
    pub fn new(normal: Vec3, point: Vec3, material: Material) -> Self {
        Self {
            normal: normal.normalize_or_zero(),
            point,
            material,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn point(&self) -> Vec3 {
        self.point
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Hit distance in `(HIT_EPSILON, t_max)`, if any.
    pub fn intersect(&self, ray: &Ray, t_max: f32) -> Option<f32> {
        let denominator = self.normal.dot(ray.direction);
        if denominator.abs() < PARALLEL_EPSILON {
            return None;
        }

        // Origin lying on the plane is not a hit
        let numerator = self.normal.dot(self.point - ray.origin);
        if numerator.abs() <= PARALLEL_EPSILON {
            return None;
        }

        let t = numerator / denominator;
        (t > HIT_EPSILON && t < t_max).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> Plane {
        Plane::new(Vec3::Y, Vec3::ZERO, Material::default())
    }

    #[test]
    fn test_plane_hit() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let t = ground().intersect(&ray, f32::INFINITY).expect("should hit");
        assert!((t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_plane_parallel_ray_rejected() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::X);
        assert!(ground().intersect(&ray, f32::INFINITY).is_none());
    }

    #[test]
    fn test_plane_behind_and_bounded() {
        let up = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(ground().intersect(&up, f32::INFINITY).is_none());

        let down = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        assert!(ground().intersect(&down, 4.0).is_none());
    }

    #[test]
    fn test_plane_normalizes_normal() {
        let plane = Plane::new(Vec3::new(0.0, 3.0, 0.0), Vec3::ZERO, Material::default());
        assert_eq!(plane.normal(), Vec3::Y);
    }
}
