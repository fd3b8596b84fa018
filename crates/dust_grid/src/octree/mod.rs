//! Octree arena for adaptive spatial subdivision.
//!
//! The tree is stored as a flat arena of [`Node`]s linked by index. Children
//! are always created 8 at a time and appended contiguously, in the order
//! fixed by [`Octant`]:
//!
//! ```text
//! index = 4 * z + 2 * y + x      (x, y, z = 1 for the upper half)
//!
//!        z = 0             z = 1
//!     ┌─────┬─────┐     ┌─────┬─────┐
//!   y │  2  │  3  │   y │  6  │  7  │
//!     ├─────┼─────┤     ├─────┼─────┤
//!     │  0  │  1  │     │  4  │  5  │
//!     └─────┴─────┘     └─────┴─────┘
//!           x                 x
//! ```
//!
//! # Module Structure
//!
//! - [`bounds`]: `Extent` - axis-aligned box and ray/face geometry
//! - [`node`]: `Node`, `Octant`, `Face` - arena element and numbering
//! - [`tree`]: `Octree` - arena, point location, neighbor links

pub mod bounds;
pub mod node;
pub mod tree;

// Re-exports
pub use bounds::Extent;
pub use node::{Face, NeighborList, Node, Octant};
pub use tree::Octree;
