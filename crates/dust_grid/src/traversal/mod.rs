//! Ray traversal through the cells of a dust grid.
//!
//! A ray is followed from cell to cell: inside each leaf the exit distance
//! is the smallest distance to a face in the direction of travel, the
//! crossing is recorded, and the position is pushed `epsilon` past the face
//! so it lies in the next cell. The strategies differ only in how that next
//! cell is found:
//!
//! | Method        | Next cell lookup                                      |
//! |---------------|-------------------------------------------------------|
//! | `TopDown`     | descend from the root                                 |
//! | `Neighbor`    | search the cached neighbors across the crossed face   |
//! | `Bookkeeping` | climb to the sibling across the face, then descend    |
//!
//! Neighbor and bookkeeping lookups fall back to a root descent whenever
//! they are inconclusive, so all three produce the same cells.

mod path;

pub use path::{DustGridPath, Segment};

use glam::DVec3;

use crate::grid::{DustGrid, SearchMethod};
use crate::octree::{Face, Octree};

/// Follow a ray through `grid` and record every crossing.
pub(crate) fn trace(
  grid: &DustGrid,
  origin: DVec3,
  direction: DVec3,
  method: SearchMethod,
) -> DustGridPath {
  let direction = direction.normalize_or_zero();
  let mut path = DustGridPath::new(origin, direction);
  if direction == DVec3::ZERO || !origin.is_finite() {
    return path;
  }

  let tree = grid.tree();
  let eps = grid.epsilon();
  let Some(entry) = grid.extent().ray_entry(origin, direction) else {
    return path;
  };
  path.set_entry_distance(entry);

  let mut position = origin;
  if entry > 0.0 {
    position += direction * (entry + eps);
  }

  // Neighbor lookups need links; without them every step relocates
  let method = match method {
    SearchMethod::Neighbor if !tree.has_neighbors() => SearchMethod::TopDown,
    other => other,
  };

  let Some(mut leaf) = tree.locate(0, position) else {
    return path;
  };

  loop {
    let (length, face) = tree.node(leaf).extent().exit_distance(position, direction);
    if length > 0.0 {
      if let Some(cell) = grid.cell_number(leaf) {
        path.push(cell, length);
      }
    }
    position += direction * (length + eps);

    let mut next = next_leaf(tree, method, leaf, face, position);
    if next == Some(leaf) {
      // Rounding left the point on the face it just crossed
      let plane = tree.node(leaf).extent().face_coordinate(face);
      position[face.axis()] = if face.is_positive() { plane + eps } else { plane - eps };
      next = tree.locate(0, position);
    }

    match next {
      Some(id) if id != leaf => leaf = id,
      _ => break,
    }
  }

  path
}

/// Leaf holding `position` after leaving `leaf` through `face`.
fn next_leaf(
  tree: &Octree,
  method: SearchMethod,
  leaf: usize,
  face: Face,
  position: DVec3,
) -> Option<usize> {
  match method {
    SearchMethod::TopDown => tree.locate(0, position),
    SearchMethod::Neighbor => tree
      .locate_across_face(leaf, face, position)
      .or_else(|| tree.locate(0, position)),
    SearchMethod::Bookkeeping => {
      // No sibling across the face: it lies on the outer boundary
      let sibling = tree.sibling_across(leaf, face)?;
      let candidate = tree.descend(sibling, position);
      if tree.node(candidate).extent().contains_point_half_open(position) {
        Some(candidate)
      } else {
        tree.locate(0, position)
      }
    }
  }
}
