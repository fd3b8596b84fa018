//! Node - one element of the octree arena.
//!
//! Nodes are identified by their index in the arena (0 = root). A node is
//! either a leaf or owns exactly 8 children stored at consecutive ids, in
//! [`Octant`] order.

use std::ops::Range;

use smallvec::SmallVec;

use super::Extent;

/// Position of a child inside its parent.
///
/// Octant index bits represent the upper half along each axis:
/// - bit 0: X (0 = below the split plane, 1 = at or above)
/// - bit 1: Y
/// - bit 2: Z
///
/// so `index = 4 * z + 2 * y + x`. Children are appended to the arena in
/// this order, which the bookkeeping traversal relies on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Octant(u8);

impl Octant {
  /// All octants in arena order.
  pub const ALL: [Octant; 8] = [
    Octant(0),
    Octant(1),
    Octant(2),
    Octant(3),
    Octant(4),
    Octant(5),
    Octant(6),
    Octant(7),
  ];

  /// Create from a raw index in `0..8`.
  #[inline]
  pub fn new(index: u8) -> Self {
    debug_assert!(index < 8, "octant index out of range: {index}");
    Self(index & 7)
  }

  /// Create from the upper-half flags of each axis.
  #[inline]
  pub fn from_bits(x: bool, y: bool, z: bool) -> Self {
    Self(4 * z as u8 + 2 * y as u8 + x as u8)
  }

  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }

  /// Upper-half flags (x, y, z).
  #[inline]
  pub fn bits(self) -> (bool, bool, bool) {
    (self.0 & 1 != 0, self.0 & 2 != 0, self.0 & 4 != 0)
  }

  /// Whether this octant lies in the upper half along `axis`.
  #[inline]
  pub fn is_upper(self, axis: usize) -> bool {
    self.0 & (1 << axis) != 0
  }

  /// The sibling on the other side of the split plane orthogonal to `axis`.
  #[inline]
  pub fn flipped(self, axis: usize) -> Self {
    Self(self.0 ^ (1 << axis))
  }
}

/// One of the 6 faces of a box, in -X, +X, -Y, +Y, -Z, +Z order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Face {
  NegX,
  PosX,
  NegY,
  PosY,
  NegZ,
  PosZ,
}

impl Face {
  pub const ALL: [Face; 6] = [
    Face::NegX,
    Face::PosX,
    Face::NegY,
    Face::PosY,
    Face::NegZ,
    Face::PosZ,
  ];

  /// Face on the positive side of `axis`.
  #[inline]
  pub fn positive(axis: usize) -> Self {
    Self::ALL[2 * axis + 1]
  }

  /// Face on the negative side of `axis`.
  #[inline]
  pub fn negative(axis: usize) -> Self {
    Self::ALL[2 * axis]
  }

  #[inline]
  pub fn index(self) -> usize {
    self as usize
  }

  /// Axis orthogonal to this face (0 = X, 1 = Y, 2 = Z).
  #[inline]
  pub fn axis(self) -> usize {
    self.index() / 2
  }

  #[inline]
  pub fn is_positive(self) -> bool {
    self.index() % 2 == 1
  }

  #[inline]
  pub fn opposite(self) -> Self {
    Self::ALL[self.index() ^ 1]
  }
}

/// Neighbor leaves across one face. Most faces touch 1 or 4 leaves.
pub type NeighborList = SmallVec<[usize; 4]>;

/// Octree node stored in the grid arena.
#[derive(Clone, Debug)]
pub struct Node {
  pub(crate) id: usize,
  pub(crate) level: u32,
  pub(crate) extent: Extent,
  pub(crate) parent: Option<usize>,
  pub(crate) first_child: Option<usize>,
  /// Leaf ids across each face, indexed by [`Face::index`]. Only filled for
  /// the neighbor traversal strategy.
  pub(crate) neighbors: [NeighborList; 6],
}

impl Node {
  /// Create a childless node.
  pub fn new(id: usize, level: u32, extent: Extent, parent: Option<usize>) -> Self {
    Self {
      id,
      level,
      extent,
      parent,
      first_child: None,
      neighbors: Default::default(),
    }
  }

  #[inline]
  pub fn id(&self) -> usize {
    self.id
  }

  /// Tree depth (0 at the root).
  #[inline]
  pub fn level(&self) -> u32 {
    self.level
  }

  #[inline]
  pub fn extent(&self) -> &Extent {
    &self.extent
  }

  #[inline]
  pub fn parent(&self) -> Option<usize> {
    self.parent
  }

  /// Ids of the 8 children, empty for a leaf.
  #[inline]
  pub fn children(&self) -> Range<usize> {
    match self.first_child {
      Some(first) => first..first + 8,
      None => 0..0,
    }
  }

  /// Id of the child in the given octant.
  #[inline]
  pub fn child(&self, octant: Octant) -> Option<usize> {
    self.first_child.map(|first| first + octant.index())
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.first_child.is_none()
  }

  /// Octant of this node inside its parent, derived from the id offset.
  pub(crate) fn octant_in(&self, parent: &Node) -> Option<Octant> {
    let first = parent.first_child?;
    let offset = self.id.checked_sub(first)?;
    (offset < 8).then(|| Octant::new(offset as u8))
  }

  /// Cached neighbor leaves across `face`.
  #[inline]
  pub fn neighbors(&self, face: Face) -> &[usize] {
    &self.neighbors[face.index()]
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
