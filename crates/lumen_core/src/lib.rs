//! Lumen Core - scene registry and geometry kernels.
//!
//! This crate provides:
//!
//! - **Geometry kernels**: ray intersection and surface normals for
//!   `Sphere`, `Plane`, `Triangle` and `Polyhedron`
//! - **Primitive views**: the closed `Primitive` enum and `PrimitiveRef`
//!   handles the acceleration structures store instead of owning geometry
//! - **Scene graph types**: `Scene`, `Mesh` prototypes, `Material`, lights
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Material, Scene};
//! use lumen_math::Vec3;
//!
//! let mut scene = Scene::new("demo");
//! scene.add_sphere(Vec3::ZERO, 1.0, Material::default());
//! scene.add_point_light(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE);
//! println!("{} primitives", scene.primitive_count());
//! ```

pub mod error;
pub mod light;
pub mod material;
pub mod mesh;
pub mod plane;
pub mod polyhedron;
pub mod primitive;
pub mod scene;
pub mod sphere;
pub mod triangle;

// Re-export commonly used types
pub use error::SceneError;
pub use light::{AreaLight, PointLight};
pub use material::Material;
pub use mesh::Mesh;
pub use plane::Plane;
pub use polyhedron::{Face, Polyhedron};
pub use primitive::{Primitive, PrimitiveRef, TriangleRef};
pub use scene::{Object, Scene, Transform};
pub use sphere::Sphere;
pub use triangle::{intersect_triangle, Triangle};

/// Minimum accepted hit distance. Rejects self-intersection at the
/// originating surface.
pub const HIT_EPSILON: f32 = 1e-4;
