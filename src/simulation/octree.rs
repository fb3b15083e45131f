//! # Broad-phase octree
//!
//! Spatial index used to limit narrow-phase collision tests to bodies that
//! are actually near each other. Without it every step would test all
//! `N(N-1)/2` pairs.
//!
//! ## Layout
//!
//! Nodes live in one arena (`Vec<OctreeNode>`) and refer to their children
//! by index, so the tree can be cleared and rebuilt every step without
//! freeing memory:
//! - every node owns an axis-aligned box and its depth
//! - a leaf stores up to `capacity` entries (body index + position)
//! - once split, a node has exactly eight children, one per octant
//!
//! ## Termination
//!
//! A leaf splits only when it holds more than `capacity` entries **and** its
//! depth is below `max_depth`. Leaves at `max_depth` accept any number of
//! entries. Depth wins over capacity, so inserting many bodies at the same
//! point builds at most `max_depth` levels and always terminates.
//!
//! ## Queries
//!
//! `query(center, radius)` returns every entry held by a node whose box
//! intersects the sphere (closest-point-on-box test). That is a superset of
//! the bodies inside the sphere; narrow-phase tests filter it.

use crate::math::NVec3;

/// One stored body: its index in the system and the position it was inserted at
#[derive(Debug, Clone, Copy)]
pub struct OctreeEntry {
    pub index: usize,
    pub x: NVec3,
}

#[derive(Debug, Clone)]
pub struct OctreeNode {
    pub bbox_min: NVec3,
    pub bbox_max: NVec3,
    pub depth: usize,
    pub entries: Vec<OctreeEntry>,
    pub children: Option<[usize; 8]>, // indices into Octree::nodes
}

impl OctreeNode {
    fn new(bbox_min: NVec3, bbox_max: NVec3, depth: usize) -> Self {
        Self {
            bbox_min,
            bbox_max,
            depth,
            entries: Vec::new(),
            children: None,
        }
    }

    pub fn contains(&self, p: &NVec3) -> bool {
        (0..3).all(|k| p[k] >= self.bbox_min[k] && p[k] <= self.bbox_max[k])
    }

    /// Sphere-box overlap via the closest point on the box
    pub fn intersects_sphere(&self, center: &NVec3, radius: f64) -> bool {
        let mut d2 = 0.0;
        for k in 0..3 {
            let c = center[k].clamp(self.bbox_min[k], self.bbox_max[k]);
            let diff = center[k] - c;
            d2 += diff * diff;
        }
        d2 <= radius * radius
    }
}

pub struct Octree {
    nodes: Vec<OctreeNode>,
    root: usize,
    capacity: usize,
    max_depth: usize,
    len: usize,
}

impl Octree {
    pub const DEFAULT_CAPACITY: usize = 8;
    pub const DEFAULT_MAX_DEPTH: usize = 8;

    /// Empty tree covering `[bbox_min, bbox_max]`
    pub fn new(bbox_min: NVec3, bbox_max: NVec3, capacity: usize, max_depth: usize) -> Self {
        Self {
            nodes: vec![OctreeNode::new(bbox_min, bbox_max, 0)],
            root: 0,
            capacity: capacity.max(1),
            max_depth,
            len: 0,
        }
    }

    /// Drop every node and entry, keeping the root bounds
    pub fn clear(&mut self) {
        let root = &self.nodes[self.root];
        let (min, max) = (root.bbox_min, root.bbox_max);
        self.reset(min, max);
    }

    /// Clear and move the root to new bounds
    pub fn reset(&mut self, bbox_min: NVec3, bbox_max: NVec3) {
        self.nodes.clear();
        self.nodes.push(OctreeNode::new(bbox_min, bbox_max, 0));
        self.root = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    /// Deepest level currently in use
    pub fn max_depth_reached(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Insert body `index` at position `x`
    ///
    /// Walks down from the root while the current node is split and the
    /// matching octant contains `x`. Points outside the root box stay in the
    /// root so nothing is ever dropped.
    pub fn insert(&mut self, index: usize, x: NVec3) {
        let entry = OctreeEntry { index, x };
        let mut node_idx = self.root;

        loop {
            let node = &self.nodes[node_idx];
            let Some(children) = node.children else {
                break;
            };
            if !node.contains(&x) {
                break;
            }
            node_idx = children[child_index_for_point(&x, &node.bbox_min, &node.bbox_max)];
        }

        self.nodes[node_idx].entries.push(entry);
        self.len += 1;
        self.split_if_needed(node_idx);
    }

    /// All entries in nodes intersecting the sphere, each body at most once
    pub fn query(&self, center: &NVec3, radius: f64) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_into(center, radius, &mut out);
        out
    }

    /// Same as [`Octree::query`] but appends to a reusable buffer
    pub fn query_into(&self, center: &NVec3, radius: f64, out: &mut Vec<usize>) {
        let root = &self.nodes[self.root];
        // The root also holds anything inserted outside its box, so always
        // report its own entries when the query is large enough to matter.
        if root.intersects_sphere(center, radius) {
            self.query_node(self.root, center, radius, out);
        } else {
            out.extend(root.entries.iter().map(|e| e.index));
        }
    }

    fn query_node(&self, node_idx: usize, center: &NVec3, radius: f64, out: &mut Vec<usize>) {
        let node = &self.nodes[node_idx];
        out.extend(node.entries.iter().map(|e| e.index));

        if let Some(children) = node.children {
            for child_idx in children {
                if self.nodes[child_idx].intersects_sphere(center, radius) {
                    self.query_node(child_idx, center, radius, out);
                }
            }
        }
    }

    // helpers ==============================================================================

    /// Split `node_idx` if it is an over-full leaf above max depth, then
    /// push its entries down. A child that ends up over-full splits in turn.
    fn split_if_needed(&mut self, node_idx: usize) {
        let node = &self.nodes[node_idx];
        if node.children.is_some() || node.entries.len() <= self.capacity || node.depth >= self.max_depth {
            return;
        }

        let bbox_min = node.bbox_min;
        let bbox_max = node.bbox_max;
        let depth = node.depth;

        let mut children = [0usize; 8];
        for (child_idx, slot) in children.iter_mut().enumerate() {
            let (cmin, cmax) = child_bbox(&bbox_min, &bbox_max, child_idx);
            *slot = self.nodes.len();
            self.nodes.push(OctreeNode::new(cmin, cmax, depth + 1));
        }
        self.nodes[node_idx].children = Some(children);

        // entries outside this box (root overflow) stay where they are
        let entries = std::mem::take(&mut self.nodes[node_idx].entries);
        let mut kept = Vec::new();
        for entry in entries {
            if self.nodes[node_idx].contains(&entry.x) {
                let c = child_index_for_point(&entry.x, &bbox_min, &bbox_max);
                self.nodes[children[c]].entries.push(entry);
            } else {
                kept.push(entry);
            }
        }
        self.nodes[node_idx].entries = kept;

        for child in children {
            self.split_if_needed(child);
        }
    }
}

/// Octant index of `p` inside a box
///
/// - bit 0 (1): x >= center.x
/// - bit 1 (2): y >= center.y
/// - bit 2 (4): z >= center.z
fn child_index_for_point(p: &NVec3, bbox_min: &NVec3, bbox_max: &NVec3) -> usize {
    let center = (bbox_min + bbox_max) * 0.5;
    let mut idx = 0;

    if p.x >= center.x { idx |= 1; } // bit 0
    if p.y >= center.y { idx |= 2; } // bit 1
    if p.z >= center.z { idx |= 4; } // bit 2

    idx
}

/// Box of octant `child_idx`, same bit layout as [`child_index_for_point`]
fn child_bbox(parent_min: &NVec3, parent_max: &NVec3, child_idx: usize) -> (NVec3, NVec3) {
    let center = (parent_min + parent_max) * 0.5;

    let mut min = *parent_min;
    let mut max = *parent_max;

    for axis in 0..3 {
        if (child_idx >> axis) & 1 == 0 {
            max[axis] = center[axis];
        } else {
            min[axis] = center[axis];
        }
    }

    (min, max)
}

/// Bounding box enclosing every given sphere and the optional world box
pub fn enclosing_bbox<'a>(spheres: impl IntoIterator<Item = (&'a NVec3, f64)>, world: Option<(NVec3, NVec3)>) -> (NVec3, NVec3) {
    let (mut min, mut max) = world.unwrap_or((
        NVec3::repeat(f64::INFINITY),
        NVec3::repeat(f64::NEG_INFINITY),
    ));

    for (x, r) in spheres {
        for k in 0..3 {
            min[k] = min[k].min(x[k] - r);
            max[k] = max[k].max(x[k] + r);
        }
    }

    if min.x > max.x {
        // nothing to enclose
        return (NVec3::repeat(-1.0), NVec3::repeat(1.0));
    }
    (min, max)
}
