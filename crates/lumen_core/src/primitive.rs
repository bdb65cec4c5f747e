//! Closed set of intersectable primitives and the handles that name them.
//!
//! Acceleration structures never own geometry. They store [`PrimitiveRef`]
//! handles and resolve them through the [`crate::Scene`] registry into a
//! borrowed [`Primitive`] view when testing a ray.

use crate::triangle::intersect_triangle;
use crate::{Material, Plane, Sphere};
use lumen_math::{Aabb, Ray, Vec3};

/// Handle to one intersectable primitive in a scene.
///
/// `object` is the owner index in the scene registry (the index whose
/// material shades the hit). `face` selects a triangle when the owner is a
/// polyhedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveRef {
    pub object: u32,
    pub face: Option<u32>,
}

impl PrimitiveRef {
    pub fn object(object: usize) -> Self {
        Self {
            object: object as u32,
            face: None,
        }
    }

    pub fn face(object: usize, face: usize) -> Self {
        Self {
            object: object as u32,
            face: Some(face as u32),
        }
    }
}

/// Triangle view whose vertices may live in a polyhedron's shared buffer.
#[derive(Debug, Clone, Copy)]
pub struct TriangleRef<'a> {
    pub vertices: [&'a Vec3; 3],
    pub normal: Vec3,
    pub bbox: Aabb,
    pub material: &'a Material,
}

/// Borrowed view of a primitive.
#[derive(Debug, Clone, Copy)]
pub enum Primitive<'a> {
    Sphere(&'a Sphere),
    Plane(&'a Plane),
    Triangle(TriangleRef<'a>),
}

impl<'a> Primitive<'a> {
    /// Hit distance in `(HIT_EPSILON, t_max)`, if any.
    #[inline]
    pub fn intersect(&self, ray: &Ray, t_max: f32) -> Option<f32> {
        match self {
            Primitive::Sphere(sphere) => sphere.intersect(ray, t_max),
            Primitive::Plane(plane) => plane.intersect(ray, t_max),
            Primitive::Triangle(tri) => {
                let [v0, v1, v2] = tri.vertices;
                intersect_triangle(*v0, *v1, *v2, ray, t_max)
            }
        }
    }

    /// Geometric unit normal at a point on the surface.
    ///
    /// Spheres return the outward normal at `p`; planes and triangles return
    /// their stored normal regardless of which side was hit.
    #[inline]
    pub fn normal_at(&self, p: Vec3) -> Vec3 {
        match self {
            Primitive::Sphere(sphere) => sphere.normal_at(p),
            Primitive::Plane(plane) => plane.normal(),
            Primitive::Triangle(tri) => tri.normal,
        }
    }

    /// Bounding box, or `None` for unbounded primitives (planes).
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Primitive::Sphere(sphere) => Some(sphere.bounding_box()),
            Primitive::Plane(_) => None,
            Primitive::Triangle(tri) => Some(tri.bbox),
        }
    }

    pub fn material(&self) -> &'a Material {
        match self {
            Primitive::Sphere(sphere) => sphere.material(),
            Primitive::Plane(plane) => plane.material(),
            Primitive::Triangle(tri) => tri.material,
        }
    }
}
