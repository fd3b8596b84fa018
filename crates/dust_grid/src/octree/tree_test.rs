use glam::DVec3;

use super::*;

fn unit_cube() -> Octree {
  Octree::new(Extent::from_center_half_extents(DVec3::ZERO, DVec3::ONE))
}

/// Subdivide every leaf down to `levels` below the root.
fn regular_tree(levels: u32) -> Octree {
  let mut tree = unit_cube();
  let mut i = 0;
  while i < tree.len() {
    if tree.node(i).level() < levels {
      tree.create_children(i, None);
    }
    i += 1;
  }
  tree
}

// =========================================================================
// Construction
// =========================================================================

/// create_children appends 8 nodes at consecutive ids in octant order.
#[test]
fn test_create_children_appends_octants() {
  let mut tree = unit_cube();
  let first = tree.create_children(0, None);

  assert_eq!(first, 1);
  assert_eq!(tree.len(), 9);
  assert_eq!(tree.root().children(), 1..9);
  for octant in Octant::ALL {
    let child = tree.node(first + octant.index());
    assert_eq!(child.level(), 1);
    assert_eq!(child.parent(), Some(0));
    let (x, y, z) = octant.bits();
    let center = child.extent().center();
    assert_eq!(center.x > 0.0, x, "octant {octant:?} x half");
    assert_eq!(center.y > 0.0, y, "octant {octant:?} y half");
    assert_eq!(center.z > 0.0, z, "octant {octant:?} z half");
  }
}

/// A custom split point moves the shared corner of the children.
#[test]
fn test_create_children_weighted_split() {
  let mut tree = unit_cube();
  let split = DVec3::new(0.5, -0.25, 0.0);
  let first = tree.create_children(0, Some(split));
  assert_eq!(tree.node(first).extent().max, split);
  assert_eq!(tree.node(first + 7).extent().min, split);
}

/// Split points outside the node are clamped strictly inside.
#[test]
fn test_create_children_clamps_split() {
  let mut tree = unit_cube();
  let first = tree.create_children(0, Some(DVec3::new(5.0, -5.0, 0.0)));
  let split = tree.node(first).extent().max;
  assert!(split.x < 1.0 && split.x > 0.0);
  assert!(split.y > -1.0 && split.y < 0.0);
  for id in tree.root().children() {
    assert!(tree.node(id).extent().volume() > 0.0);
  }
}

/// A NaN split point falls back to the geometric center.
#[test]
fn test_create_children_nan_split() {
  let mut tree = unit_cube();
  let first = tree.create_children(0, Some(DVec3::new(0.5, f64::NAN, 0.0)));
  assert_eq!(tree.node(first).extent().max, DVec3::ZERO);
}

// =========================================================================
// Point location
// =========================================================================

#[test]
fn test_locate_outside_returns_none() {
  let tree = regular_tree(2);
  assert_eq!(tree.locate(0, DVec3::new(1.5, 0.0, 0.0)), None);
}

#[test]
fn test_locate_finds_containing_leaf() {
  let tree = regular_tree(3);
  for point in [
    DVec3::new(0.1, 0.2, 0.3),
    DVec3::new(-0.9, 0.95, -0.3),
    DVec3::new(0.99, -0.99, 0.01),
  ] {
    let leaf = tree.locate(0, point).expect("point is inside");
    let node = tree.node(leaf);
    assert!(node.is_leaf());
    assert_eq!(node.level(), 3);
    assert!(node.extent().contains_point(point));
  }
}

/// Points on a split plane belong to the upper child.
#[test]
fn test_locate_tie_goes_to_upper_child() {
  let tree = regular_tree(1);
  let leaf = tree.locate(0, DVec3::ZERO).unwrap();
  assert_eq!(leaf, tree.root().child(Octant::new(7)).unwrap());
}

/// The outer max boundary is still inside the grid.
#[test]
fn test_locate_on_outer_boundary() {
  let tree = regular_tree(2);
  let leaf = tree.locate(0, DVec3::ONE).expect("closed outer box");
  assert_eq!(tree.node(leaf).extent().max, DVec3::ONE);
}

// =========================================================================
// Bookkeeping sibling lookup
// =========================================================================

/// Crossing an internal face within the same parent yields the sibling.
#[test]
fn test_sibling_across_same_parent() {
  let tree = regular_tree(1);
  let low = tree.root().child(Octant::new(0)).unwrap();
  let high = tree.root().child(Octant::new(1)).unwrap();
  assert_eq!(tree.sibling_across(low, Face::PosX), Some(high));
  assert_eq!(tree.sibling_across(high, Face::NegX), Some(low));
}

/// Crossing an outer face climbs to the root and ends.
#[test]
fn test_sibling_across_outer_face() {
  let tree = regular_tree(2);
  let leaf = tree.locate(0, DVec3::splat(0.9)).unwrap();
  assert_eq!(tree.sibling_across(leaf, Face::PosX), None);
  assert_eq!(tree.sibling_across(leaf, Face::PosY), None);
  assert_eq!(tree.sibling_across(leaf, Face::PosZ), None);
}

/// Crossing a face shared by different parents climbs to the common
/// ancestor and returns the node on the far side.
#[test]
fn test_sibling_across_climbs() {
  let tree = regular_tree(2);
  let leaf = tree.locate(0, DVec3::new(-0.25, -0.75, -0.75)).unwrap();
  let across = tree.sibling_across(leaf, Face::PosX).unwrap();
  let target = tree.descend(across, DVec3::new(0.25, -0.75, -0.75));
  assert_eq!(tree.node(across).level(), 1);
  assert!(tree.node(target).extent().contains_point(DVec3::new(0.25, -0.75, -0.75)));
}

// =========================================================================
// Neighbor links
// =========================================================================

/// In a regular tree every inner face has exactly one neighbor of the same
/// size; outer faces have none.
#[test]
fn test_neighbors_regular_tree() {
  let mut tree = regular_tree(2);
  tree.add_neighbors();
  tree.sort_neighbors();
  assert!(tree.has_neighbors());

  let leaf = tree.locate(0, DVec3::new(-0.75, 0.25, 0.75)).unwrap();
  assert_eq!(tree.node(leaf).neighbors(Face::NegX).len(), 0);
  assert_eq!(tree.node(leaf).neighbors(Face::PosZ).len(), 0);
  for face in [Face::PosX, Face::NegY, Face::PosY, Face::NegZ] {
    let list = tree.node(leaf).neighbors(face);
    assert_eq!(list.len(), 1, "face {face:?}");
    let other = tree.node(list[0]);
    assert_eq!(other.level(), 2);
    assert_eq!(
      other.extent().face_coordinate(face.opposite()),
      tree.node(leaf).extent().face_coordinate(face)
    );
  }
}

/// A coarse leaf next to a refined region sees all 4 smaller neighbors.
#[test]
fn test_neighbors_across_levels() {
  let mut tree = unit_cube();
  tree.create_children(0, None);
  let refined = tree.root().child(Octant::new(1)).unwrap();
  tree.create_children(refined, None);
  tree.add_neighbors();
  tree.sort_neighbors();

  let coarse = tree.root().child(Octant::new(0)).unwrap();
  let list = tree.node(coarse).neighbors(Face::PosX);
  assert_eq!(list.len(), 4);
  for &id in list {
    assert_eq!(tree.node(id).level(), 2);
    assert_eq!(tree.node(id).extent().min.x, 0.0);
  }

  // Each small neighbor sees the coarse leaf back
  for &id in list {
    assert_eq!(tree.node(id).neighbors(Face::NegX), &[coarse]);
  }
}

#[test]
fn test_locate_across_face() {
  let mut tree = unit_cube();
  tree.create_children(0, None);
  let refined = tree.root().child(Octant::new(1)).unwrap();
  tree.create_children(refined, None);
  tree.add_neighbors();
  tree.sort_neighbors();

  let coarse = tree.root().child(Octant::new(0)).unwrap();
  let point = DVec3::new(1e-9, -0.25, -0.75);
  let found = tree.locate_across_face(coarse, Face::PosX, point).unwrap();
  assert_eq!(Some(found), tree.locate(0, point));

  // A point that left through another face is not resolved
  assert_eq!(tree.locate_across_face(coarse, Face::PosX, DVec3::new(1e-9, 0.5, -0.75)), None);
}
