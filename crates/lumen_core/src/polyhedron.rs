//! Polyhedron: a transformed mesh instance that owns its vertex buffer.
//!
//! The grid never sees a polyhedron as a whole. Each face is indexed on its
//! own through a [`crate::PrimitiveRef`] and resolved to a
//! [`crate::TriangleRef`] that borrows this vertex buffer.

use crate::triangle::{face_normal, intersect_triangle, triangle_bounds};
use crate::{Material, Mesh, Transform};
use lumen_math::{Aabb, Ray, Vec3};

/// One triangle of a polyhedron, stored as indices into the shared buffer.
#[derive(Debug, Clone)]
pub struct Face {
    pub indices: [u32; 3],
    /// Outward unit normal (CCW winding)
    pub normal: Vec3,
    pub bbox: Aabb,
}

/// A closed triangle mesh placed in the world.
#[derive(Debug, Clone)]
pub struct Polyhedron {
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
    material: Material,
    bbox: Aabb,
}

impl Polyhedron {
    /// Instantiate a mesh with the given transform (scale, rotate, translate).
    ///
    /// The mesh must already have passed [`Mesh::validate`].
    pub fn new(mesh: &Mesh, transform: &Transform, material: Material) -> Self {
        let matrix = transform.to_matrix();
        let vertices: Vec<Vec3> = mesh
            .positions
            .iter()
            .map(|p| matrix.transform_point3(*p))
            .collect();

        let mut bbox = Aabb::EMPTY;
        let faces: Vec<Face> = mesh
            .triangles()
            .map(|indices| {
                let [v0, v1, v2] = indices.map(|i| vertices[i as usize]);
                let face_bbox = triangle_bounds(v0, v1, v2);
                bbox = Aabb::surrounding(&bbox, &face_bbox);
                Face {
                    indices,
                    normal: face_normal(v0, v1, v2),
                    bbox: face_bbox,
                }
            })
            .collect();

        Self {
            vertices,
            faces,
            material,
            bbox,
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// World-space vertices of face `index`.
    pub fn face_vertices(&self, index: usize) -> [&Vec3; 3] {
        self.faces[index].indices.map(|i| &self.vertices[i as usize])
    }

    /// Linear scan over front-facing triangles, stopping at the first hit.
    ///
    /// The first accepted hit is not necessarily the nearest one among this
    /// polyhedron's faces; that only holds for convex, non-self-overlapping
    /// meshes. Returns the hit distance and the face index.
    pub fn intersect(&self, ray: &Ray, t_max: f32) -> Option<(f32, usize)> {
        self.faces.iter().enumerate().find_map(|(i, face)| {
            if ray.direction.dot(face.normal) >= 0.0 {
                return None;
            }
            let [v0, v1, v2] = face.indices.map(|j| self.vertices[j as usize]);
            intersect_triangle(v0, v1, v2, ray, t_max).map(|t| (t, i))
        })
    }
}
