//! DustGrid - adaptive octree grid with point location and ray traversal.
//!
//! The grid is built once from a [`GridConfig`] and a density
//! [`Distribution`], then answers queries for the rest of the run. All query
//! methods take `&self`; the grid is `Sync` and can be shared by any number
//! of worker threads.
//!
//! # Cells
//!
//! Leaves of the octree are numbered `0..number_of_cells()` in arena order.
//! Internal nodes have no cell number.

pub mod config;
pub(crate) mod construction;
pub mod stats;

use glam::DVec3;
use tracing::{debug, info_span};

pub use config::{GridConfig, SearchMethod, GRID_DIMENSION, MAX_LEVEL_LIMIT, MIN_SAMPLE_COUNT};
pub use stats::ConstructionStats;

use construction::Builder;

use crate::density::Distribution;
use crate::error::GridError;
use crate::octree::{Extent, Node, Octree};
use crate::random::RandomStream;
use crate::threading::SamplingPool;
use crate::traversal::{self, DustGridPath};

/// Fraction of the grid diagonal used to push ray positions past a cell
/// boundary.
pub const EPSILON_FRACTION: f64 = 1e-12;

/// Upper bound on epsilon as a fraction of the narrowest cell side, so deep
/// cells are never stepped over.
pub const CELL_EPSILON_FRACTION: f64 = 1e-3;

/// Lower bound on epsilon in units of the f64 spacing at the outer grid
/// coordinates, so a push always moves the position.
const EPSILON_ULPS: f64 = 4.0;

/// Adaptive octree dust grid.
#[derive(Clone, Debug)]
pub struct DustGrid {
  config: GridConfig,
  tree: Octree,
  /// Node id of each cell, in cell order.
  leaf_node_ids: Vec<usize>,
  /// Cell number of each node, `None` for internal nodes.
  cell_numbers: Vec<Option<usize>>,
  total_mass: f64,
  epsilon: f64,
  stats: ConstructionStats,
}

impl DustGrid {
  /// Validate `config` and build the grid.
  ///
  /// Sampling runs on a dedicated pool of `config.sampling_threads` workers
  /// drawing from `random`, which needs [`GridConfig::random_slots`] slots.
  /// Fails before any node is built if the configuration is invalid or the
  /// stream is too small.
  pub fn build(
    config: GridConfig,
    distribution: &dyn Distribution,
    random: &RandomStream,
  ) -> Result<Self, GridError> {
    config.validate(distribution.dimension())?;
    if random.slot_count() < config.random_slots() {
      return Err(GridError::invalid(format!(
        "random stream has {} slots, {} sampling threads need {}",
        random.slot_count(),
        config.sampling_threads,
        config.random_slots()
      )));
    }
    let pool = SamplingPool::new(config.sampling_threads)?;

    let (mut tree, stats) = Builder::new(&config, distribution, random, &pool).build();

    if config.search_method == SearchMethod::Neighbor {
      let _span = info_span!("neighbor_links").entered();
      pool.install(|| {
        tree.add_neighbors();
        tree.sort_neighbors();
      });
      let links: usize = tree
        .nodes()
        .iter()
        .map(|node| node.neighbors.iter().map(|list| list.len()).sum::<usize>())
        .sum();
      debug!("Added {links} neighbor links");
    }

    let mut leaf_node_ids = Vec::with_capacity(stats.cell_count);
    let mut cell_numbers = vec![None; tree.len()];
    for node in tree.nodes().iter().filter(|node| node.is_leaf()) {
      cell_numbers[node.id()] = Some(leaf_node_ids.len());
      leaf_node_ids.push(node.id());
    }

    let epsilon = traversal_epsilon(&tree);
    debug!("Traversal epsilon {epsilon:e}");
    Ok(Self {
      total_mass: distribution.total_mass(),
      config,
      tree,
      leaf_node_ids,
      cell_numbers,
      epsilon,
      stats,
    })
  }

  #[inline]
  pub fn config(&self) -> &GridConfig {
    &self.config
  }

  #[inline]
  pub fn tree(&self) -> &Octree {
    &self.tree
  }

  #[inline]
  pub fn node(&self, id: usize) -> &Node {
    self.tree.node(id)
  }

  #[inline]
  pub fn stats(&self) -> &ConstructionStats {
    &self.stats
  }

  /// Total mass of the distribution the grid was built from.
  #[inline]
  pub fn total_mass(&self) -> f64 {
    self.total_mass
  }

  /// Distance used to step past cell boundaries while tracing.
  #[inline]
  pub fn epsilon(&self) -> f64 {
    self.epsilon
  }

  /// Outer box of the grid.
  #[inline]
  pub fn extent(&self) -> &Extent {
    self.tree.root().extent()
  }

  #[inline]
  pub fn dimension(&self) -> u8 {
    GRID_DIMENSION
  }

  #[inline]
  pub fn number_of_cells(&self) -> usize {
    self.leaf_node_ids.len()
  }

  /// Node ids of all cells, in cell order.
  #[inline]
  pub fn leaf_node_ids(&self) -> &[usize] {
    &self.leaf_node_ids
  }

  /// Cell number of a node, `None` for internal nodes.
  #[inline]
  pub fn cell_number(&self, node_id: usize) -> Option<usize> {
    self.cell_numbers.get(node_id).copied().flatten()
  }

  /// Leaf node backing cell `m`.
  ///
  /// # Panics
  /// Panics if `m` is not a valid cell number.
  #[inline]
  pub fn cell_node(&self, m: usize) -> &Node {
    self.tree.node(self.leaf_node_ids[m])
  }

  #[inline]
  pub fn cell_extent(&self, m: usize) -> &Extent {
    self.cell_node(m).extent()
  }

  #[inline]
  pub fn cell_volume(&self, m: usize) -> f64 {
    self.cell_extent(m).volume()
  }

  #[inline]
  pub fn cell_center(&self, m: usize) -> DVec3 {
    self.cell_extent(m).center()
  }

  /// Uniformly distributed point inside cell `m`.
  pub fn random_position_in_cell(&self, random: &RandomStream, m: usize) -> DVec3 {
    random.position_in(self.cell_extent(m))
  }

  /// Cell containing `point`, or `None` outside the grid.
  pub fn locate_cell(&self, point: DVec3) -> Option<usize> {
    self
      .tree
      .locate(0, point)
      .and_then(|leaf| self.cell_number(leaf))
  }

  /// Cells crossed by the ray from `origin` along `direction`, using the
  /// configured search method.
  pub fn path(&self, origin: DVec3, direction: DVec3) -> DustGridPath {
    self.path_with(origin, direction, self.config.search_method)
  }

  /// Cells crossed by the ray using an explicit search method.
  ///
  /// The neighbor method needs the links built for
  /// [`SearchMethod::Neighbor`] grids; without them every step relocates
  /// from the root.
  pub fn path_with(&self, origin: DVec3, direction: DVec3, method: SearchMethod) -> DustGridPath {
    traversal::trace(self, origin, direction, method)
  }
}

/// Distance a ray position is pushed past each crossed face.
///
/// A fixed fraction of the diagonal, shrunk for grids whose narrowest cell
/// would otherwise be skipped, but never below a few ulps of the outer
/// coordinates.
fn traversal_epsilon(tree: &Octree) -> f64 {
  let root = tree.root().extent();
  let narrowest = tree
    .nodes()
    .iter()
    .filter(|node| node.is_leaf())
    .map(|node| node.extent().size().min_element())
    .fold(f64::INFINITY, f64::min);
  let reach = root.min.abs().max(root.max.abs()).max_element();
  let floor = EPSILON_ULPS * f64::EPSILON * reach;
  (EPSILON_FRACTION * root.diagonal())
    .min(CELL_EPSILON_FRACTION * narrowest)
    .max(floor)
}
