//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{Material, HIT_EPSILON};
use lumen_math::{Aabb, Ray, Vec3};

/// Below this |det| the ray is treated as parallel to the triangle.
const DET_EPSILON: f32 = 1e-8;

/// Möller-Trumbore ray-triangle intersection.
///
/// Reports hits on either side of the triangle; back-face culling is up to
/// the caller. Returns the hit distance in `(HIT_EPSILON, t_max)`.
pub fn intersect_triangle(v0: Vec3, v1: Vec3, v2: Vec3, ray: &Ray, t_max: f32) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);

    // Ray is parallel to triangle
    if det.abs() < DET_EPSILON {
        return None;
    }

    let f = 1.0 / det;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > HIT_EPSILON && t < t_max).then_some(t)
}

/// Geometric normal of a counter-clockwise triangle (zero if degenerate).
pub(crate) fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0).normalize_or_zero()
}

/// Bounding box of three points.
pub(crate) fn triangle_bounds(v0: Vec3, v1: Vec3, v2: Vec3) -> Aabb {
    Aabb::from_points(v0.min(v1).min(v2), v0.max(v1).max(v2))
}

/// A standalone triangle that owns its three vertices.
///
/// Triangles that belong to a [`crate::Polyhedron`] share the polyhedron's
/// vertex buffer instead; see [`crate::TriangleRef`].
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [Vec3; 3],
    /// Pre-computed face normal (unit length, CCW winding)
    normal: Vec3,
    material: Material,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three counter-clockwise vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Material) -> Self {
        Self {
            vertices: [v0, v1, v2],
            normal: face_normal(v0, v1, v2),
            material,
            bbox: triangle_bounds(v0, v1, v2),
        }
    }

    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// True if the vertices are collinear.
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vec3::ZERO
    }

    pub fn intersect(&self, ray: &Ray, t_max: f32) -> Option<f32> {
        let [v0, v1, v2] = self.vertices;
        intersect_triangle(v0, v1, v2, ray, t_max)
    }
}
