//! Sphere primitive.

use crate::{Material, HIT_EPSILON};
use lumen_math::{Aabb, Ray, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Material,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Nearest root in `(HIT_EPSILON, t_max)`, if any.
    pub fn intersect(&self, ray: &Ray, t_max: f32) -> Option<f32> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        if a == 0.0 {
            return None;
        }
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();
        let accept = |t: f32| t > HIT_EPSILON && t < t_max;

        // a > 0, so the first root is always the closer one
        let near = (h - sqrtd) / a;
        if accept(near) {
            return Some(near);
        }
        let far = (h + sqrtd) / a;
        accept(far).then_some(far)
    }

    /// Outward unit normal at a point on the surface.
    pub fn normal_at(&self, p: Vec3) -> Vec3 {
        (p - self.center).normalize_or_zero()
    }
}
