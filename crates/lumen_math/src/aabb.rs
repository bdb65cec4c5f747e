use crate::{Ray, Vec3};

/// Axis-Aligned Bounding Box used by the grid and the photon map.
///
/// Stored as two corner points. A box built through `from_points` or grown
/// with `grow`/`surrounding` keeps `min <= max` componentwise; only
/// `Aabb::EMPTY` violates it, so that it acts as the identity for `surrounding`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty AABB (contains nothing).
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create an AABB from two corner points, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            min: box0.min.min(box1.min),
            max: box0.max.max(box1.max),
        }
    }

    /// Grow the box so it contains `p`.
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// True if nothing has been added to the box yet.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand every face outwards by `margin`.
    pub fn padded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// Size of the box along each axis.
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    ///
    /// Ties resolve towards Z, then Y.
    pub fn longest_axis(&self) -> usize {
        let size = self.extent();

        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// True if the two boxes share any volume (touching faces count).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Slab test. Returns the entry distance along the ray if it crosses the box.
    ///
    /// The entry distance is negative when the ray origin is inside the box;
    /// callers clamp it to zero. A box lying entirely behind the ray is a miss.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv_dir;
        let t1 = (self.max - ray.origin) * inv_dir;

        let t_min = t0.min(t1).max_element();
        let t_max = t0.max(t1).min_element();

        if t_max < 0.0 || t_min > t_max {
            return None;
        }
        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    fn on_surface(aabb: &Aabb, p: Vec3, eps: f32) -> bool {
        let inside = p.cmpge(aabb.min - Vec3::splat(eps)).all()
            && p.cmple(aabb.max + Vec3::splat(eps)).all();
        let near_face = (p - aabb.min).abs().min_element() < eps
            || (p - aabb.max).abs().min_element() < eps;
        inside && near_face
    }

    #[test]
    fn test_aabb_from_points() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 10.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::splat(10.0));
    }

    #[test]
    fn test_aabb_surrounding() {
        let box1 = Aabb::from_points(Vec3::ZERO, Vec3::new(5.0, 5.0, 5.0));
        let box2 = Aabb::from_points(Vec3::new(3.0, 3.0, 3.0), Vec3::new(10.0, 10.0, 10.0));
        let surrounding = Aabb::surrounding(&box1, &box2);

        assert_eq!(surrounding.min.x, 0.0);
        assert_eq!(surrounding.max.x, 10.0);

        // EMPTY is the identity
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &box1), box1);
    }

    #[test]
    fn test_aabb_grow_and_empty() {
        let mut aabb = Aabb::EMPTY;
        assert!(aabb.is_empty());

        aabb.grow(Vec3::new(1.0, 2.0, 3.0));
        aabb.grow(Vec3::new(-1.0, 0.0, 5.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, Vec3::new(-1.0, 0.0, 3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn test_aabb_hit_from_outside_lands_on_surface() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(0.3, 0.2, -5.0), Vec3::new(0.0, 0.0, 1.0));

        let t = aabb.intersect(&ray).expect("ray should hit the box");
        assert!((t - 4.0).abs() < 1e-5);
        assert!(on_surface(&aabb, ray.at(t), 1e-4));

        // Oblique ray through a corner region
        let ray = Ray::new(Vec3::new(-3.0, -2.5, -4.0), Vec3::new(1.0, 0.8, 1.3));
        let t = aabb.intersect(&ray).expect("oblique ray should hit");
        assert!(on_surface(&aabb, ray.at(t), 1e-4));
    }

    #[test]
    fn test_aabb_inside_origin_gives_negative_entry() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = aabb.intersect(&ray).expect("origin inside the box");
        assert!(t < 0.0);
    }

    #[test]
    fn test_aabb_miss() {
        let aabb = unit_box();

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(aabb.intersect(&ray).is_none());

        // Ray passing beside the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect(&ray).is_none());
    }

    #[test]
    fn test_aabb_centroid_and_extent() {
        let aabb = Aabb::from_points(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 4.0, 2.0));

        assert_eq!(aabb.centroid(), Vec3::new(5.0, 2.0, 1.0));
        assert_eq!(aabb.extent(), Vec3::new(10.0, 4.0, 2.0));
        assert_eq!(aabb.padded(0.5).min, Vec3::splat(-0.5));
    }

    #[test]
    fn test_aabb_longest_axis() {
        let aabb_x = Aabb::from_points(Vec3::ZERO, Vec3::new(10.0, 1.0, 1.0));
        assert_eq!(aabb_x.longest_axis(), 0);

        let aabb_y = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 10.0, 1.0));
        assert_eq!(aabb_y.longest_axis(), 1);

        let aabb_z = Aabb::from_points(Vec3::ZERO, Vec3::new(1.0, 1.0, 10.0));
        assert_eq!(aabb_z.longest_axis(), 2);

        let cube = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        assert_eq!(cube.longest_axis(), 2);
    }

    #[test]
    fn test_aabb_overlaps() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_points(Vec3::splat(0.5), Vec3::splat(2.0));
        let c = Aabb::from_points(Vec3::splat(3.0), Vec3::splat(4.0));

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }
}
