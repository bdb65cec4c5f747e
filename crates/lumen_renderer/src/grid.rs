//! Uniform grid acceleration structure.
//!
//! The grid is built once over every primitive of a [`Scene`] and then only
//! read. Cells store [`PrimitiveRef`] handles, so a primitive spanning many
//! cells is referenced from each of them while the scene stays its single
//! owner. Unbounded primitives (planes) cannot be binned and are kept in a
//! separate list that every query tests first.
//!
//! Rays are walked through the cells with a 3-D DDA, nearest cells first.

use lumen_core::{PrimitiveRef, Scene};
use lumen_math::{Aabb, Ray, UVec3, Vec3};

/// Margin added around the scene bounds before binning.
const BOUNDS_PADDING: f32 = 0.1;

/// Target number of primitives per cell.
const PRIMITIVES_PER_CELL: f32 = 5.0;

/// Upper bound on cells along one axis.
const MAX_RESOLUTION: u32 = 128;

/// Axis to step next, indexed by the three pairwise "next crossing"
/// comparisons `(x<y)<<2 | (x<z)<<1 | (y<z)`. Ties go to the later axis.
const NEXT_AXIS: [usize; 8] = [2, 1, 2, 1, 2, 2, 0, 0];

/// Nearest intersection found by [`Grid::intersect`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHit {
    /// Ray parameter of the hit
    pub t: f32,
    /// Scene object owning the hit primitive (selects the material)
    pub object: usize,
    /// The primitive that was hit
    pub primitive: PrimitiveRef,
    /// Geometric unit normal at the hit point
    pub normal: Vec3,
}

/// Per-axis DDA state.
struct Traversal {
    cell: [i32; 3],
    step: [i32; 3],
    exit: [i32; 3],
    delta: [f32; 3],
    next: [f32; 3],
}

impl Traversal {
    /// Axis whose cell boundary the ray crosses first.
    #[inline]
    fn next_axis(&self) -> usize {
        let n = &self.next;
        let k = ((n[0] < n[1]) as usize) << 2 | ((n[0] < n[2]) as usize) << 1 | (n[1] < n[2]) as usize;
        NEXT_AXIS[k]
    }

    /// Step into the neighbour along `axis`. Returns false when leaving the grid.
    #[inline]
    fn advance(&mut self, axis: usize) -> bool {
        self.cell[axis] += self.step[axis];
        if self.cell[axis] == self.exit[axis] {
            return false;
        }
        self.next[axis] += self.delta[axis];
        true
    }
}

/// Uniform spatial grid over a scene's primitives.
pub struct Grid<'a> {
    scene: &'a Scene,
    bounds: Aabb,
    resolution: UVec3,
    cell_size: Vec3,
    cells: Vec<Vec<PrimitiveRef>>,
    unbounded: Vec<PrimitiveRef>,
}

impl<'a> Grid<'a> {
    /// Bin every primitive of `scene`.
    ///
    /// Polyhedra are inserted face by face. Resolution per axis targets
    /// about five primitives per cell and is clamped to `[1, 128]`.
    pub fn new(scene: &'a Scene) -> Self {
        let mut bounded = Vec::with_capacity(scene.primitive_count());
        let mut unbounded = Vec::new();

        for handle in scene.primitive_refs() {
            let Some(primitive) = scene.primitive(handle) else {
                continue;
            };
            match primitive.bounding_box() {
                Some(bbox) => bounded.push((handle, bbox)),
                None => unbounded.push(handle),
            }
        }

        if bounded.is_empty() {
            log::debug!("Grid: no bounded primitives, {} unbounded", unbounded.len());
            return Self {
                scene,
                bounds: Aabb::EMPTY,
                resolution: UVec3::ONE,
                cell_size: Vec3::ZERO,
                cells: Vec::new(),
                unbounded,
            };
        }

        let bounds = bounded
            .iter()
            .fold(Aabb::EMPTY, |acc, (_, b)| Aabb::surrounding(&acc, b))
            .padded(BOUNDS_PADDING);
        let extent = bounds.extent();
        let volume = extent.x * extent.y * extent.z;
        let density = (PRIMITIVES_PER_CELL * bounded.len() as f32 / volume).cbrt();
        let resolution = (extent * density)
            .round()
            .clamp(Vec3::ONE, Vec3::splat(MAX_RESOLUTION as f32))
            .as_uvec3();
        let cell_size = extent / resolution.as_vec3();

        let mut grid = Self {
            scene,
            bounds,
            resolution,
            cell_size,
            cells: vec![Vec::new(); (resolution.x * resolution.y * resolution.z) as usize],
            unbounded,
        };

        let mut references = 0usize;
        for (handle, bbox) in &bounded {
            let lo = grid.cell_coords(bbox.min);
            let hi = grid.cell_coords(bbox.max);
            for z in lo.z..=hi.z {
                for y in lo.y..=hi.y {
                    for x in lo.x..=hi.x {
                        let index = grid.cell_index(x, y, z);
                        grid.cells[index].push(*handle);
                        references += 1;
                    }
                }
            }
        }

        log::debug!(
            "Grid: {}x{}x{} cells, {} primitives, {} references, {} unbounded",
            resolution.x,
            resolution.y,
            resolution.z,
            bounded.len(),
            references,
            grid.unbounded.len()
        );

        grid
    }

    /// Padded bounds of all bounded primitives.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Primitives kept outside the cells.
    pub fn unbounded(&self) -> &[PrimitiveRef] {
        &self.unbounded
    }

    /// Contents of cell `(x, y, z)`. Out-of-range cells are empty.
    pub fn cell(&self, x: u32, y: u32, z: u32) -> &[PrimitiveRef] {
        if x >= self.resolution.x || y >= self.resolution.y || z >= self.resolution.z {
            return &[];
        }
        self.cells
            .get(self.cell_index(x, y, z))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cell containing `p`, clamped to the grid.
    pub fn cell_coords(&self, p: Vec3) -> UVec3 {
        let local = ((p - self.bounds.min) / self.cell_size).floor();
        local
            .clamp(Vec3::ZERO, (self.resolution - UVec3::ONE).as_vec3())
            .as_uvec3()
    }

    #[inline]
    fn cell_index(&self, x: u32, y: u32, z: u32) -> usize {
        (x + y * self.resolution.x + z * self.resolution.x * self.resolution.y) as usize
    }

    /// Nearest hit along `ray`, if any.
    pub fn intersect(&self, ray: &Ray) -> Option<GridHit> {
        let mut best_t = f32::INFINITY;
        let mut best = None;

        let mut test = |handle: PrimitiveRef, best_t: &mut f32| {
            if let Some(t) = self
                .scene
                .primitive(handle)
                .and_then(|p| p.intersect(ray, *best_t))
            {
                *best_t = t;
                best = Some(handle);
            }
        };

        for &handle in &self.unbounded {
            test(handle, &mut best_t);
        }

        if let Some((mut walk, t_start)) = self.start_traversal(ray) {
            if t_start < best_t {
                loop {
                    let [x, y, z] = walk.cell;
                    for &handle in self.cell(x as u32, y as u32, z as u32) {
                        test(handle, &mut best_t);
                    }
                    let axis = walk.next_axis();
                    // A hit closer than the next boundary cannot be beaten further on
                    if best_t < walk.next[axis] || !walk.advance(axis) {
                        break;
                    }
                }
            }
        }

        let handle = best?;
        let primitive = self.scene.primitive(handle)?;
        Some(GridHit {
            t: best_t,
            object: handle.object as usize,
            primitive: handle,
            normal: primitive.normal_at(ray.at(best_t)),
        })
    }

    /// True if anything is hit along `ray` before `max_distance`.
    pub fn shadow_intersect(&self, ray: &Ray, max_distance: f32) -> bool {
        let blocks = |handle: PrimitiveRef| {
            self.scene
                .primitive(handle)
                .and_then(|p| p.intersect(ray, max_distance))
                .is_some()
        };

        if self.unbounded.iter().any(|&h| blocks(h)) {
            return true;
        }

        let Some((mut walk, t_start)) = self.start_traversal(ray) else {
            return false;
        };
        if t_start >= max_distance {
            return false;
        }

        loop {
            let [x, y, z] = walk.cell;
            if self.cell(x as u32, y as u32, z as u32).iter().any(|&h| blocks(h)) {
                return true;
            }
            let axis = walk.next_axis();
            if walk.next[axis] > max_distance || !walk.advance(axis) {
                return false;
            }
        }
    }

    /// Clip `ray` to the grid and set up the DDA at the entry cell.
    fn start_traversal(&self, ray: &Ray) -> Option<(Traversal, f32)> {
        if self.cells.is_empty() || ray.direction == Vec3::ZERO {
            return None;
        }

        let t_start = self.bounds.intersect(ray)?.max(0.0);
        let origin = ray.at(t_start);
        let cell = self.cell_coords(origin);

        let mut walk = Traversal {
            cell: [cell.x as i32, cell.y as i32, cell.z as i32],
            step: [0; 3],
            exit: [-1; 3],
            delta: [f32::INFINITY; 3],
            next: [f32::INFINITY; 3],
        };

        for axis in 0..3 {
            let d = ray.direction[axis];
            let size = self.cell_size[axis];
            let cell_min = self.bounds.min[axis] + walk.cell[axis] as f32 * size;
            if d > 0.0 {
                walk.step[axis] = 1;
                walk.exit[axis] = self.resolution[axis] as i32;
                walk.delta[axis] = size / d;
                walk.next[axis] = t_start + (cell_min + size - origin[axis]) / d;
            } else if d < 0.0 {
                walk.step[axis] = -1;
                walk.exit[axis] = -1;
                walk.delta[axis] = -size / d;
                walk.next[axis] = t_start + (cell_min - origin[axis]) / d;
            }
        }

        Some((walk, t_start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Material, Mesh, Transform};

    #[test]
    fn test_two_spheres_share_a_cell() {
        let mut scene = Scene::new("overlap");
        let a = scene.add_sphere(Vec3::new(-0.5, 0.0, 0.0), 1.0, Material::default());
        let b = scene.add_sphere(Vec3::new(0.5, 0.0, 0.0), 1.0, Material::default());

        let grid = Grid::new(&scene);
        let middle = grid.cell_coords(Vec3::ZERO);
        let cell = grid.cell(middle.x, middle.y, middle.z);

        assert!(cell.contains(&PrimitiveRef::object(a)));
        assert!(cell.contains(&PrimitiveRef::object(b)));
    }

    #[test]
    fn test_resolution_is_clamped() {
        let mut scene = Scene::new("dense");
        for i in 0..20_000 {
            let x = (i % 200) as f32 * 0.01;
            scene.add_sphere(Vec3::new(x, 0.0, 0.0), 0.001, Material::default());
        }
        let grid = Grid::new(&scene);
        let res = grid.resolution();
        assert!(res.x <= MAX_RESOLUTION && res.y >= 1 && res.z >= 1);
    }

    #[test]
    fn test_sphere_hit_through_grid() {
        let mut scene = Scene::new("single");
        scene.add_sphere(Vec3::ZERO, 1.0, Material::default());
        let grid = Grid::new(&scene);

        let hit = grid
            .intersect(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z))
            .expect("should hit sphere");
        assert!((hit.t - 4.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
        assert_eq!(hit.object, 0);
    }

    #[test]
    fn test_plane_only_scene() {
        let mut scene = Scene::new("floor");
        scene.add_plane(Vec3::Y, Vec3::ZERO, Material::default()).unwrap();
        let grid = Grid::new(&scene);
        assert_eq!(grid.unbounded().len(), 1);

        let hit = grid
            .intersect(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y))
            .expect("should hit plane");
        assert!((hit.t - 5.0).abs() < 1e-4);
        assert!(grid.intersect(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y)).is_none());
    }

    #[test]
    fn test_nearest_of_two_along_axis() {
        let mut scene = Scene::new("row");
        let far = scene.add_sphere(Vec3::new(0.0, 0.0, -10.0), 1.0, Material::default());
        let near = scene.add_sphere(Vec3::new(0.0, 0.0, -3.0), 1.0, Material::default());
        let grid = Grid::new(&scene);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = grid.intersect(&ray).unwrap();
        assert_eq!(hit.object, near);
        assert_ne!(hit.object, far);
        assert!((hit.t - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_starting_inside_grid() {
        let mut scene = Scene::new("inside");
        scene.add_sphere(Vec3::new(-4.0, 0.0, 0.0), 1.0, Material::default());
        scene.add_sphere(Vec3::new(4.0, 0.0, 0.0), 1.0, Material::default());
        let grid = Grid::new(&scene);

        let hit = grid.intersect(&Ray::new(Vec3::ZERO, Vec3::X)).unwrap();
        assert_eq!(hit.object, 1);
        assert!((hit.t - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_polyhedron_faces_are_indexed() {
        let mut scene = Scene::new("cube");
        let cube = scene.add_prototype(Mesh::unit_cube()).unwrap();
        let id = scene
            .add_polyhedron(cube, &Transform::default(), Material::default())
            .unwrap();
        let grid = Grid::new(&scene);

        let hit = grid
            .intersect(&Ray::new(Vec3::new(0.1, 0.3, 4.0), Vec3::NEG_Z))
            .unwrap();
        assert_eq!(hit.object, id);
        assert!(hit.primitive.face.is_some());
        assert!((hit.t - 3.5).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_shadow_respects_distance() {
        let mut scene = Scene::new("blocker");
        scene.add_sphere(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::default());
        let grid = Grid::new(&scene);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(grid.shadow_intersect(&ray, 10.0));
        assert!(!grid.shadow_intersect(&ray, 3.0));
        assert!(!grid.shadow_intersect(&Ray::new(Vec3::ZERO, Vec3::Z), 10.0));
    }

    #[test]
    fn test_empty_scene() {
        let scene = Scene::new("empty");
        let grid = Grid::new(&scene);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(grid.intersect(&ray).is_none());
        assert!(!grid.shadow_intersect(&ray, f32::INFINITY));
    }
}
