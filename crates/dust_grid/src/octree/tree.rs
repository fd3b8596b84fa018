//! Octree arena: nodes stored in a flat vector, linked by index.
//!
//! Children are appended 8 at a time in [`Octant`] order, so the structure
//! can be walked with id arithmetic alone. The arena only grows during
//! construction and is read-only afterwards.

use glam::DVec3;
use rayon::prelude::*;

use super::bounds::tangent_axes;
use super::node::{Face, NeighborList, Node, Octant};
use super::Extent;

/// Split points are kept at least this fraction of the width away from the
/// node walls, so a skewed barycenter never produces a degenerate child.
pub const MIN_SPLIT_FRACTION: f64 = 0.05;

/// Flat octree arena, root at id 0.
#[derive(Clone, Debug)]
pub struct Octree {
  nodes: Vec<Node>,
  neighbors_ready: bool,
}

impl Octree {
  /// Create a tree holding a single root node.
  pub fn new(root: Extent) -> Self {
    Self {
      nodes: vec![Node::new(0, 0, root, None)],
      neighbors_ready: false,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  #[inline]
  pub fn node(&self, id: usize) -> &Node {
    &self.nodes[id]
  }

  #[inline]
  pub fn root(&self) -> &Node {
    &self.nodes[0]
  }

  /// All nodes in creation order.
  #[inline]
  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  /// Append 8 children of node `id` at consecutive ids.
  ///
  /// The node is split at `split` (clamped inside the node) or at its
  /// geometric center when `None`. Returns the first child id.
  ///
  /// # Panics
  /// Debug-asserts that the node is still a leaf.
  pub fn create_children(&mut self, id: usize, split: Option<DVec3>) -> usize {
    debug_assert!(self.nodes[id].is_leaf(), "node {id} already has children");
    debug_assert!(!self.neighbors_ready, "cannot subdivide after neighbor links are built");

    let parent = &self.nodes[id];
    let extent = parent.extent;
    let level = parent.level + 1;
    let split = match split {
      Some(point) => clamp_split(&extent, point),
      None => extent.center(),
    };

    let start_id = self.nodes.len();
    self.nodes.extend(
      Octant::ALL
        .iter()
        .map(|&octant| Node::new(start_id + octant.index(), level, extent.octant(split, octant), Some(id))),
    );
    self.nodes[id].first_child = Some(start_id);
    start_id
  }

  /// Leaf below `from` that contains `point`, or `None` if the point lies
  /// outside the node.
  pub fn locate(&self, from: usize, point: DVec3) -> Option<usize> {
    if !self.nodes[from].extent.contains_point(point) {
      return None;
    }
    Some(self.descend(from, point))
  }

  /// Walk down from `from` comparing `point` against successive split
  /// points. Points on a split plane go to the upper child.
  pub fn descend(&self, from: usize, point: DVec3) -> usize {
    let mut current = from;
    while let Some(first) = self.nodes[current].first_child {
      // Children meet at the upper corner of child 0
      let split = self.nodes[first].extent.max;
      let octant = Octant::from_bits(point.x >= split.x, point.y >= split.y, point.z >= split.z);
      current = first + octant.index();
    }
    current
  }

  /// Node reached from `id` by crossing `face`, found with id arithmetic:
  /// climb until the node sits on the near side of its parent's split plane
  /// for that axis, then step to the sibling on the far side.
  ///
  /// Returns `None` when the climb reaches the root, i.e. the face lies on
  /// the outer boundary.
  pub fn sibling_across(&self, id: usize, face: Face) -> Option<usize> {
    let axis = face.axis();
    let towards_upper = face.is_positive();
    let mut current = id;
    loop {
      let node = &self.nodes[current];
      let parent = &self.nodes[node.parent?];
      let octant = node.octant_in(parent)?;
      if octant.is_upper(axis) != towards_upper {
        return parent.child(octant.flipped(axis));
      }
      current = parent.id;
    }
  }

  /// Whether neighbor links have been computed.
  #[inline]
  pub fn has_neighbors(&self) -> bool {
    self.neighbors_ready
  }

  /// Compute per-face neighbor leaves of every leaf.
  ///
  /// Must run after subdivision has finished. Uses the current rayon pool.
  pub fn add_neighbors(&mut self) {
    let leaves: Vec<usize> = self
      .nodes
      .iter()
      .filter(|node| node.is_leaf())
      .map(Node::id)
      .collect();

    let lists: Vec<(usize, [NeighborList; 6])> = leaves
      .par_iter()
      .map(|&id| {
        let mut lists: [NeighborList; 6] = Default::default();
        for face in Face::ALL {
          lists[face.index()] = self.face_neighbors(id, face);
        }
        (id, lists)
      })
      .collect();

    for (id, neighbors) in lists {
      self.nodes[id].neighbors = neighbors;
    }
    self.neighbors_ready = true;
  }

  /// Order every neighbor list by decreasing shared face area, so the most
  /// likely candidate is tested first.
  pub fn sort_neighbors(&mut self) {
    let sorted: Vec<(usize, [NeighborList; 6])> = self
      .nodes
      .par_iter()
      .filter(|node| node.is_leaf())
      .map(|node| {
        let mut lists = node.neighbors.clone();
        for face in Face::ALL {
          let axis = face.axis();
          lists[face.index()].sort_by(|&a, &b| {
            let area_a = node.extent.shared_area(&self.nodes[a].extent, axis);
            let area_b = node.extent.shared_area(&self.nodes[b].extent, axis);
            area_b.total_cmp(&area_a).then(a.cmp(&b))
          });
        }
        (node.id, lists)
      })
      .collect();

    for (id, neighbors) in sorted {
      self.nodes[id].neighbors = neighbors;
    }
  }

  /// Neighbor leaf across `face` of `leaf` that contains `point`.
  ///
  /// Only cached neighbors are searched. Returns `None` when no neighbor
  /// contains the point (e.g. the point was pushed past a corner), in which
  /// case the caller relocates from the root.
  pub fn locate_across_face(&self, leaf: usize, face: Face, point: DVec3) -> Option<usize> {
    self.nodes[leaf]
      .neighbors(face)
      .iter()
      .copied()
      .find(|&id| self.nodes[id].extent.contains_point_half_open(point))
  }

  /// Leaves touching `face` of `leaf` from the outside with a positive
  /// shared area.
  fn face_neighbors(&self, leaf: usize, face: Face) -> NeighborList {
    let mut found = NeighborList::new();
    let extent = self.nodes[leaf].extent;
    let axis = face.axis();
    let plane = extent.face_coordinate(face);
    if plane == self.root().extent.face_coordinate(face) {
      return found;
    }

    let (a, b) = tangent_axes(axis);
    let far_side = face.opposite();
    let mut stack = vec![0usize];
    while let Some(id) = stack.pop() {
      let node = &self.nodes[id];
      let e = &node.extent;
      if plane < e.min[axis] || plane > e.max[axis] {
        continue;
      }
      if e.max[a] <= extent.min[a]
        || e.min[a] >= extent.max[a]
        || e.max[b] <= extent.min[b]
        || e.min[b] >= extent.max[b]
      {
        continue;
      }
      if node.is_leaf() {
        if id != leaf && e.face_coordinate(far_side) == plane {
          found.push(id);
        }
      } else {
        stack.extend(node.children());
      }
    }
    found
  }
}

/// Keep a split point strictly inside `extent`.
fn clamp_split(extent: &Extent, point: DVec3) -> DVec3 {
  // A NaN barycenter falls back to the center
  if point.is_nan() {
    return extent.center();
  }
  let margin = extent.size() * MIN_SPLIT_FRACTION;
  point.clamp(extent.min + margin, extent.max - margin)
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
