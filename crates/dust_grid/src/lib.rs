//! dust_grid - Adaptive octree dust grid for radiative transfer.
//!
//! The grid partitions a box centered on the origin into octree cells that
//! are refined where a density distribution holds more mass, optical depth
//! or density contrast than the configured limits allow. Once built it
//! answers two questions for any number of concurrent callers: which cell
//! contains a point, and which cells a ray crosses and for how long.
//!
//! # Features
//!
//! - **Adaptive construction**: mass fraction, optical depth and density
//!   dispersion criteria, evaluated by exact box integration or by Monte
//!   Carlo sampling on a bounded thread pool
//! - **Three traversal methods**: top-down, neighbor and bookkeeping, all
//!   producing the same cell sequence
//! - **Plot export**: cell outlines in the coordinate planes and in 3D
//!
//! # Example
//!
//! ```ignore
//! use dust_grid::{DustGrid, GridConfig, RandomStream, SearchMethod};
//! use dust_grid::distributions::PlummerSphere;
//! use glam::DVec3;
//!
//! let config = GridConfig::cube(2.0)
//!     .with_levels(2, 6)
//!     .with_max_mass_fraction(1e-3)
//!     .with_search_method(SearchMethod::Bookkeeping);
//! let random = RandomStream::new(42, config.random_slots());
//! let grid = DustGrid::build(config, &PlummerSphere::new(0.5, 1.0), &random)?;
//!
//! let path = grid.path(DVec3::new(-3.0, 0.1, 0.0), DVec3::X);
//! println!("{} cells, {} long", path.len(), path.total_length());
//! ```

pub mod density;
pub mod distributions;
pub mod error;
pub mod grid;
pub mod octree;
pub mod plot;
pub mod random;
pub mod threading;
pub mod traversal;

// Re-export commonly used items
pub use density::{DensityCalculator, Distribution, MassInBox};
pub use error::GridError;
pub use grid::{ConstructionStats, DustGrid, GridConfig, SearchMethod};
pub use octree::{Extent, Face, Octant};
pub use random::RandomStream;
pub use threading::SamplingPool;
pub use traversal::{DustGridPath, Segment};
