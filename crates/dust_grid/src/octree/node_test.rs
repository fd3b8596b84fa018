use super::*;

// =========================================================================
// Octant numbering
// =========================================================================

/// index = 4 * z + 2 * y + x for every combination of upper-half flags.
#[test]
fn test_octant_index_convention() {
  for z in [false, true] {
    for y in [false, true] {
      for x in [false, true] {
        let octant = Octant::from_bits(x, y, z);
        assert_eq!(
          octant.index(),
          4 * z as usize + 2 * y as usize + x as usize,
          "Wrong index for flags ({x}, {y}, {z})"
        );
        assert_eq!(octant.bits(), (x, y, z), "bits() must invert from_bits()");
      }
    }
  }
}

/// ALL lists the octants in arena order.
#[test]
fn test_octant_all_is_ordered() {
  for (i, octant) in Octant::ALL.iter().enumerate() {
    assert_eq!(octant.index(), i);
  }
}

/// Flipping an axis toggles exactly that axis.
#[test]
fn test_octant_flipped() {
  let octant = Octant::from_bits(true, false, true);
  assert_eq!(octant.flipped(0), Octant::from_bits(false, false, true));
  assert_eq!(octant.flipped(1), Octant::from_bits(true, true, true));
  assert_eq!(octant.flipped(2), Octant::from_bits(true, false, false));
  assert!(octant.is_upper(0));
  assert!(!octant.is_upper(1));
}

// =========================================================================
// Faces
// =========================================================================

#[test]
fn test_face_axis_and_sign() {
  assert_eq!(Face::NegX.axis(), 0);
  assert_eq!(Face::PosY.axis(), 1);
  assert_eq!(Face::PosZ.axis(), 2);
  assert!(Face::PosX.is_positive());
  assert!(!Face::NegZ.is_positive());
  assert_eq!(Face::positive(1), Face::PosY);
  assert_eq!(Face::negative(2), Face::NegZ);
}

#[test]
fn test_face_opposite() {
  for face in Face::ALL {
    assert_eq!(face.opposite().opposite(), face);
    assert_eq!(face.opposite().axis(), face.axis());
    assert_ne!(face.opposite().is_positive(), face.is_positive());
  }
}

// =========================================================================
// Node
// =========================================================================

#[test]
fn test_new_node_is_leaf() {
  let node = Node::new(0, 0, Extent::new(glam::DVec3::ZERO, glam::DVec3::ONE), None);
  assert!(node.is_leaf());
  assert_eq!(node.children().len(), 0);
  assert_eq!(node.child(Octant::new(3)), None);
  assert_eq!(node.parent(), None);
  assert!(Face::ALL.iter().all(|&f| node.neighbors(f).is_empty()));
}

/// Child ids are first_child + octant index.
#[test]
fn test_child_ids_are_contiguous() {
  let mut node = Node::new(0, 0, Extent::new(glam::DVec3::ZERO, glam::DVec3::ONE), None);
  node.first_child = Some(9);
  assert_eq!(node.children(), 9..17);
  assert_eq!(node.child(Octant::new(0)), Some(9));
  assert_eq!(node.child(Octant::new(7)), Some(16));

  let child = Node::new(14, 1, Extent::new(glam::DVec3::ZERO, glam::DVec3::ONE), Some(0));
  assert_eq!(child.octant_in(&node), Some(Octant::new(5)));

  let stranger = Node::new(20, 1, Extent::new(glam::DVec3::ZERO, glam::DVec3::ONE), Some(0));
  assert_eq!(stranger.octant_in(&node), None);
}
