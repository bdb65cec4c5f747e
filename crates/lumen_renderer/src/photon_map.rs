//! Photon map: a balanced kd-tree over recorded light samples.
//!
//! Photons are collected in an append-only [`PhotonStore`]. Calling
//! [`PhotonStore::balance`] freezes the list and builds the tree, producing a
//! read-only [`PhotonMap`] whose nodes refer to photons by index.

use lumen_math::{Aabb, Color, Vec3};

/// A recorded light sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub position: Vec3,
    /// Direction of travel when the photon arrived
    pub direction: Vec3,
    pub color: Color,
    /// Shadow photons mark occluded regions and carry no light
    pub shadow: bool,
}

impl Photon {
    pub fn new(position: Vec3, direction: Vec3, color: Color) -> Self {
        Self {
            position,
            direction,
            color,
            shadow: false,
        }
    }

    pub fn shadow(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction,
            color: Color::ZERO,
            shadow: true,
        }
    }
}

/// Append-only photon list, filled during emission.
#[derive(Debug, Default)]
pub struct PhotonStore {
    photons: Vec<Photon>,
}

impl PhotonStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            photons: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, photon: Photon) {
        self.photons.push(photon);
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// Freeze the list and build the balanced tree.
    pub fn balance(self) -> PhotonMap {
        let mut photons = self.photons.into_boxed_slice();
        if photons.is_empty() {
            return PhotonMap { photons, root: None };
        }

        let bbox = photons.iter().fold(Aabb::EMPTY, |mut acc, p| {
            acc.grow(p.position);
            acc
        });
        let root = build(&mut photons, 0, bbox);
        PhotonMap {
            photons,
            root: Some(root),
        }
    }
}

/// Tree node. Leaves index into the frozen photon list.
#[derive(Debug)]
enum KdNode {
    Leaf(usize),
    Branch {
        axis: u8,
        split: f32,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
}

/// Balance `photons` (which start at `offset` in the full list) in place.
fn build(photons: &mut [Photon], offset: usize, bbox: Aabb) -> KdNode {
    if photons.len() == 1 {
        return KdNode::Leaf(offset);
    }

    let axis = bbox.longest_axis();
    let median = (photons.len() - 1) / 2;
    photons.select_nth_unstable_by(median, |a, b| {
        a.position[axis].total_cmp(&b.position[axis])
    });
    let split = photons[median].position[axis];

    let mut left_box = bbox;
    left_box.max[axis] = split;
    let mut right_box = bbox;
    right_box.min[axis] = split;

    let (lo, hi) = photons.split_at_mut(median + 1);
    KdNode::Branch {
        axis: axis as u8,
        split,
        left: Box::new(build(lo, offset, left_box)),
        right: Box::new(build(hi, offset + median + 1, right_box)),
    }
}

/// Balanced, read-only photon map.
#[derive(Debug)]
pub struct PhotonMap {
    photons: Box<[Photon]>,
    root: Option<KdNode>,
}

impl PhotonMap {
    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    /// Photons in tree order.
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// All photons strictly closer than `radius` to `position`.
    pub fn locate(&self, position: Vec3, radius: f32) -> Vec<&Photon> {
        let mut found = Vec::new();
        self.for_each_within(position, radius, |p| found.push(p));
        found
    }

    /// Visit every photon strictly closer than `radius` to `position`.
    pub fn for_each_within<'m>(&'m self, position: Vec3, radius: f32, mut visit: impl FnMut(&'m Photon)) {
        if let Some(root) = &self.root {
            self.search(root, position, radius, &mut visit);
        }
    }

    fn search<'m>(
        &'m self,
        node: &KdNode,
        position: Vec3,
        radius: f32,
        visit: &mut impl FnMut(&'m Photon),
    ) {
        match node {
            KdNode::Leaf(index) => {
                let photon = &self.photons[*index];
                if photon.position.distance_squared(position) < radius * radius {
                    visit(photon);
                }
            }
            KdNode::Branch {
                axis,
                split,
                left,
                right,
            } => {
                let coord = position[*axis as usize];
                if coord - radius < *split {
                    self.search(left, position, radius, visit);
                }
                if coord + radius > *split {
                    self.search(right, position, radius, visit);
                }
            }
        }
    }

    /// Depth of the tree; a single leaf has depth 0.
    pub fn depth(&self) -> usize {
        fn depth_of(node: &KdNode) -> usize {
            match node {
                KdNode::Leaf(_) => 0,
                KdNode::Branch { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        self.root.as_ref().map_or(0, depth_of)
    }
}
