//! Subdivision loop building the octree from a density distribution.
//!
//! # Algorithm
//!
//! Nodes are visited in arena order; children are appended at the end, so
//! the arena doubles as a breadth-first work list and the final node order
//! is deterministic. For each node:
//!
//! 1. **Minimum level** (`level <= min_level`): always subdivide at the center
//! 2. **Between levels**: subdivide unconditionally when no stopping
//!    criterion is configured; otherwise estimate the node with a density
//!    calculator and subdivide if any enabled criterion reaches its threshold
//! 3. **Maximum level** (`level >= max_level`): keep as a cell

use glam::DVec3;
use tracing::{debug, info, warn};
use web_time::Instant;

use super::config::GridConfig;
use super::stats::ConstructionStats;
use crate::density::{DensityCalculator, Distribution, ExactCalculator, SampledCalculator};
use crate::octree::{Extent, Octree};
use crate::random::RandomStream;
use crate::threading::SamplingPool;

/// Outcome of evaluating one node between the level limits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Decision {
  /// Keep the node as a cell.
  Keep,
  /// Subdivide, optionally at a weighted split point.
  Subdivide(Option<DVec3>),
}

/// Builds the octree for one grid.
pub(crate) struct Builder<'a> {
  config: &'a GridConfig,
  distribution: &'a dyn Distribution,
  random: &'a RandomStream,
  pool: &'a SamplingPool,
  total_mass: f64,
  stats: ConstructionStats,
}

impl<'a> Builder<'a> {
  pub(crate) fn new(
    config: &'a GridConfig,
    distribution: &'a dyn Distribution,
    random: &'a RandomStream,
    pool: &'a SamplingPool,
  ) -> Self {
    let total_mass = distribution.total_mass();
    if !(total_mass > 0.0) {
      warn!(total_mass, "distribution has no positive total mass, mass fractions are zero");
    }
    Self {
      config,
      distribution,
      random,
      pool,
      total_mass,
      stats: ConstructionStats::default(),
    }
  }

  /// Run the subdivision loop to completion.
  #[tracing::instrument(skip_all, name = "dust_grid::construct")]
  pub(crate) fn build(mut self) -> (Octree, ConstructionStats) {
    let start = Instant::now();
    let mut tree = Octree::new(self.config.extent());
    let mut current_level = None;

    let mut index = 0;
    while index < tree.len() {
      let node = tree.node(index);
      let level = node.level();
      let extent = *node.extent();

      if current_level != Some(level) {
        current_level = Some(level);
        // Breadth-first order: everything queued from here on is at this level
        let count = tree.len() - index;
        info!("Subdividing level {level}: {count} nodes");
      }

      if level <= self.config.min_level {
        tree.create_children(index, None);
        self.stats.forced_subdivisions += 1;
      } else if level < self.config.max_level {
        if !self.config.has_stopping_criterion() {
          tree.create_children(index, None);
          self.stats.unconditional_subdivisions += 1;
        } else if let Decision::Subdivide(split) = self.evaluate(&extent) {
          tree.create_children(index, split);
          self.stats.criteria_subdivisions += 1;
        }
      }
      index += 1;
    }

    for node in tree.nodes().iter().filter(|node| node.is_leaf()) {
      self.stats.record_cell(node.level());
    }
    self.stats.node_count = tree.len();
    self.stats.elapsed_us = start.elapsed().as_micros() as u64;

    info!(
      "Construction of the dust grid done: {} cells, {} nodes, {} ms",
      self.stats.cell_count,
      self.stats.node_count,
      self.stats.elapsed_us / 1000
    );
    for (level, count) in self.stats.cells_per_level.iter().enumerate() {
      if *count > 0 {
        debug!("  level {level}: {count} cells");
      }
    }

    (tree, self.stats)
  }

  /// Estimate a node and apply the enabled stopping criteria.
  pub(crate) fn evaluate(&mut self, extent: &Extent) -> Decision {
    let exact = match self.distribution.as_mass_in_box() {
      Some(integrator) if self.config.max_density_dispersion.is_none() => Some(integrator),
      _ => None,
    };

    match exact {
      Some(integrator) => {
        self.stats.exact_evaluations += 1;
        let calc = ExactCalculator::new(*extent, integrator, self.config.reference_opacity);
        self.decide(&calc)
      }
      None => {
        self.stats.sampled_evaluations += 1;
        let mut calc = SampledCalculator::new(
          *extent,
          self.config.sample_count,
          self.distribution,
          self.random,
          self.config.reference_opacity,
        );
        calc.sample_all(self.pool);
        self.decide(&calc)
      }
    }
  }

  fn decide(&self, calc: &dyn DensityCalculator) -> Decision {
    if !self.exceeds_threshold(calc) {
      return Decision::Keep;
    }
    if self.config.barycentric {
      Decision::Subdivide(Some(calc.barycenter()))
    } else {
      Decision::Subdivide(None)
    }
  }

  /// Whether any enabled criterion is at or above its threshold.
  fn exceeds_threshold(&self, calc: &dyn DensityCalculator) -> bool {
    if let Some(limit) = self.config.max_mass_fraction {
      let fraction = if self.total_mass > 0.0 {
        calc.mass() / self.total_mass
      } else {
        0.0
      };
      if fraction >= limit {
        return true;
      }
    }
    if let Some(limit) = self.config.max_optical_depth {
      if calc.optical_depth_estimate() >= limit {
        return true;
      }
    }
    if let Some(limit) = self.config.max_density_dispersion {
      if calc.density_dispersion_estimate() >= limit {
        return true;
      }
    }
    false
  }
}

#[cfg(test)]
#[path = "construction_test.rs"]
mod construction_test;
