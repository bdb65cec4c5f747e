//! Scene registry.
//!
//! The scene is the single owner of all geometry and lights. Acceleration
//! structures borrow it for their whole lifetime and refer to its contents
//! through [`PrimitiveRef`] handles.

use std::sync::Arc;

use lumen_math::{Aabb, Color, Mat4, Quat, Vec3};

use crate::{
    AreaLight, Material, Mesh, Plane, PointLight, Polyhedron, Primitive, PrimitiveRef, SceneError,
    Sphere, Triangle, TriangleRef,
};

/// Transform components that can be composed into a matrix.
#[derive(Clone, Debug)]
pub struct Transform {
    /// Translation
    pub translation: Vec3,

    /// Rotation (as quaternion)
    pub rotation: Quat,

    /// Scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform with only translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Uniform scale, rotation of `angle` radians about `axis`, then translation.
    pub fn from_axis_angle(translation: Vec3, axis: Vec3, angle: f32, scale: f32) -> Self {
        let axis = axis.normalize_or_zero();
        let rotation = if axis == Vec3::ZERO {
            Quat::IDENTITY
        } else {
            Quat::from_axis_angle(axis, angle)
        };
        Self {
            translation,
            rotation,
            scale: Vec3::splat(scale),
        }
    }

    /// Convert to a 4x4 transformation matrix.
    ///
    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// One entry of the scene registry.
#[derive(Debug, Clone)]
pub enum Object {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
    Polyhedron(Polyhedron),
}

impl Object {
    pub fn material(&self) -> &Material {
        match self {
            Object::Sphere(s) => s.material(),
            Object::Plane(p) => p.material(),
            Object::Triangle(t) => t.material(),
            Object::Polyhedron(p) => p.material(),
        }
    }

    /// Bounding box, or `None` for planes.
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Object::Sphere(s) => Some(s.bounding_box()),
            Object::Plane(_) => None,
            Object::Triangle(t) => Some(t.bounding_box()),
            Object::Polyhedron(p) => Some(p.bounding_box()),
        }
    }

    /// Number of primitives this object contributes to an index.
    pub fn primitive_count(&self) -> usize {
        match self {
            Object::Polyhedron(p) => p.face_count(),
            _ => 1,
        }
    }
}

/// A complete scene: geometry, polyhedron prototypes and point lights.
#[derive(Debug, Default)]
pub struct Scene {
    /// Scene name (usually from filename)
    pub name: String,

    objects: Vec<Object>,

    /// Shared mesh templates for polyhedra
    prototypes: Vec<Arc<Mesh>>,

    /// All point lights, area lights already expanded
    point_lights: Vec<PointLight>,

    area_light_count: usize,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a sphere and return its object index.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: Material) -> usize {
        self.push(Object::Sphere(Sphere::new(center, radius, material)))
    }

    /// Add an infinite plane and return its object index.
    pub fn add_plane(
        &mut self,
        normal: Vec3,
        point: Vec3,
        material: Material,
    ) -> Result<usize, SceneError> {
        if normal.length_squared() == 0.0 {
            return Err(SceneError::DegenerateGeometry("plane with zero normal".into()));
        }
        Ok(self.push(Object::Plane(Plane::new(normal, point, material))))
    }

    /// Add a standalone triangle (CCW vertices) and return its object index.
    pub fn add_triangle(
        &mut self,
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        material: Material,
    ) -> Result<usize, SceneError> {
        let triangle = Triangle::new(v0, v1, v2, material);
        if triangle.is_degenerate() {
            return Err(SceneError::DegenerateGeometry(format!(
                "collinear triangle {v0} {v1} {v2}"
            )));
        }
        Ok(self.push(Object::Triangle(triangle)))
    }

    /// Register a mesh template for polyhedra and return its prototype id.
    pub fn add_prototype(&mut self, mesh: Mesh) -> Result<usize, SceneError> {
        mesh.validate()?;
        let id = self.prototypes.len();
        self.prototypes.push(Arc::new(mesh));
        Ok(id)
    }

    /// Register a polygon template, fan-triangulating faces with more than
    /// three vertices. Returns the prototype id.
    pub fn add_polyhedron_type(
        &mut self,
        vertices: Vec<Vec3>,
        faces: &[Vec<u32>],
    ) -> Result<usize, SceneError> {
        self.add_prototype(Mesh::from_polygons(vertices, faces))
    }

    /// Instantiate a registered prototype and return the new object index.
    pub fn add_polyhedron(
        &mut self,
        prototype_id: usize,
        transform: &Transform,
        material: Material,
    ) -> Result<usize, SceneError> {
        let mesh = self
            .prototypes
            .get(prototype_id)
            .cloned()
            .ok_or(SceneError::UnknownPolyhedronType(prototype_id))?;
        Ok(self.push(Object::Polyhedron(Polyhedron::new(&mesh, transform, material))))
    }

    /// Add a point light.
    pub fn add_point_light(&mut self, position: Vec3, color: Color) {
        self.point_lights.push(PointLight::new(position, color));
    }

    /// Add a disc light, expanded into `n_points` point lights.
    pub fn add_area_light(
        &mut self,
        position: Vec3,
        normal: Vec3,
        radius: f32,
        color: Color,
        n_points: u32,
    ) {
        let area = AreaLight::new(position, normal, radius, color, n_points);
        self.point_lights.extend_from_slice(area.points());
        self.area_light_count += 1;
    }

    fn push(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Get object count.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn object(&self, index: usize) -> Option<&Object> {
        self.objects.get(index)
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Get prototype count.
    pub fn prototype_count(&self) -> usize {
        self.prototypes.len()
    }

    /// Number of point lights, including expanded area lights.
    pub fn point_light_count(&self) -> usize {
        self.point_lights.len()
    }

    pub fn point_light(&self, index: usize) -> Option<&PointLight> {
        self.point_lights.get(index)
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    pub fn area_light_count(&self) -> usize {
        self.area_light_count
    }

    /// Material of the object at `index`.
    pub fn material(&self, index: usize) -> Option<&Material> {
        self.objects.get(index).map(Object::material)
    }

    /// Total number of intersectable primitives (polyhedra count per face).
    pub fn primitive_count(&self) -> usize {
        self.objects.iter().map(Object::primitive_count).sum()
    }

    /// Handles to every primitive, polyhedra decomposed into faces.
    pub fn primitive_refs(&self) -> impl Iterator<Item = PrimitiveRef> + '_ {
        self.objects
            .iter()
            .enumerate()
            .flat_map(|(i, object)| -> Box<dyn Iterator<Item = PrimitiveRef>> {
                match object {
                    Object::Polyhedron(p) => {
                        Box::new((0..p.face_count()).map(move |f| PrimitiveRef::face(i, f)))
                    }
                    _ => Box::new(std::iter::once(PrimitiveRef::object(i))),
                }
            })
    }

    /// Resolve a handle into a borrowed primitive view.
    ///
    /// Returns `None` for stale handles.
    pub fn primitive(&self, handle: PrimitiveRef) -> Option<Primitive<'_>> {
        let object = self.objects.get(handle.object as usize)?;
        match (object, handle.face) {
            (Object::Sphere(s), None) => Some(Primitive::Sphere(s)),
            (Object::Plane(p), None) => Some(Primitive::Plane(p)),
            (Object::Triangle(t), None) => {
                let [v0, v1, v2] = t.vertices();
                Some(Primitive::Triangle(TriangleRef {
                    vertices: [v0, v1, v2],
                    normal: t.normal(),
                    bbox: t.bounding_box(),
                    material: t.material(),
                }))
            }
            (Object::Polyhedron(p), Some(face)) => {
                let face_index = face as usize;
                let face = p.faces().get(face_index)?;
                Some(Primitive::Triangle(TriangleRef {
                    vertices: p.face_vertices(face_index),
                    normal: face.normal,
                    bbox: face.bbox,
                    material: p.material(),
                }))
            }
            _ => None,
        }
    }

    /// World-space bounds of all bounded objects (planes excluded).
    pub fn world_bounds(&self) -> Aabb {
        self.objects
            .iter()
            .filter_map(Object::bounding_box)
            .fold(Aabb::EMPTY, |acc, b| Aabb::surrounding(&acc, &b))
    }
}
