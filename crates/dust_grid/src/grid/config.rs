//! GridConfig - subdivision limits, stopping criteria and traversal choice.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;

use crate::error::GridError;
use crate::octree::Extent;

/// Deepest level the arena supports.
///
/// Near this depth cell sides approach the f64 spacing of the grid
/// coordinates. Traversal shrinks its boundary push to match the narrowest
/// cell, but cells only a few ulps wide may still be stepped over.
pub const MAX_LEVEL_LIMIT: u32 = 50;

/// Lowest accepted sample count for the sampling density calculator.
pub const MIN_SAMPLE_COUNT: usize = 10;

/// Dimension of the grid itself; distributions may not exceed it.
pub const GRID_DIMENSION: u8 = 3;

/// Algorithm used to find the next cell while tracing a path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SearchMethod {
  /// Relocate from the root at every step.
  #[default]
  TopDown,
  /// Follow precomputed face neighbors, relocating from the root when the
  /// lookup is inconclusive.
  Neighbor,
  /// Climb and descend using the octant numbering of node ids.
  Bookkeeping,
}

impl SearchMethod {
  pub const ALL: [SearchMethod; 3] = [
    SearchMethod::TopDown,
    SearchMethod::Neighbor,
    SearchMethod::Bookkeeping,
  ];
}

impl fmt::Display for SearchMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      SearchMethod::TopDown => "top-down",
      SearchMethod::Neighbor => "neighbor",
      SearchMethod::Bookkeeping => "bookkeeping",
    };
    f.write_str(name)
  }
}

impl FromStr for SearchMethod {
  type Err = GridError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
      "top-down" | "topdown" => Ok(SearchMethod::TopDown),
      "neighbor" | "neighbour" => Ok(SearchMethod::Neighbor),
      "bookkeeping" => Ok(SearchMethod::Bookkeeping),
      other => Err(GridError::invalid(format!("unknown search method '{other}'"))),
    }
  }
}

/// Configuration for dust grid construction and traversal.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
  /// Half-widths of the grid box, centered on the origin.
  pub half_widths: DVec3,

  /// Nodes with a level up to and including this one are always subdivided.
  pub min_level: u32,

  /// Nodes at this level are never subdivided.
  pub max_level: u32,

  /// Traversal strategy used by [`DustGrid::path`](crate::DustGrid::path).
  pub search_method: SearchMethod,

  /// Random samples per node for the sampling density calculator.
  pub sample_count: usize,

  /// Subdivide while node mass / total mass is at least this value.
  pub max_mass_fraction: Option<f64>,

  /// Subdivide while the optical depth estimate is at least this value.
  pub max_optical_depth: Option<f64>,

  /// Subdivide while (max - min) / max of sampled densities is at least this
  /// value. Forces the sampling calculator.
  pub max_density_dispersion: Option<f64>,

  /// Opacity (area per unit mass) used for the optical depth estimate.
  pub reference_opacity: f64,

  /// Split at the density-weighted barycenter instead of the center.
  pub barycentric: bool,

  /// Worker threads for construction-time sampling.
  pub sampling_threads: usize,
}

impl GridConfig {
  /// Cube of the given half-width with the default settings.
  pub fn cube(half_width: f64) -> Self {
    Self {
      half_widths: DVec3::splat(half_width),
      ..Default::default()
    }
  }

  pub fn with_levels(mut self, min_level: u32, max_level: u32) -> Self {
    self.min_level = min_level;
    self.max_level = max_level;
    self
  }

  pub fn with_search_method(mut self, search_method: SearchMethod) -> Self {
    self.search_method = search_method;
    self
  }

  pub fn with_max_mass_fraction(mut self, value: f64) -> Self {
    self.max_mass_fraction = Some(value);
    self
  }

  pub fn with_max_optical_depth(mut self, value: f64) -> Self {
    self.max_optical_depth = Some(value);
    self
  }

  pub fn with_max_density_dispersion(mut self, value: f64) -> Self {
    self.max_density_dispersion = Some(value);
    self
  }

  /// Outer box of the grid.
  #[inline]
  pub fn extent(&self) -> Extent {
    Extent::from_center_half_extents(DVec3::ZERO, self.half_widths)
  }

  /// Whether any stopping criterion is enabled.
  ///
  /// Without one, every node between the levels is subdivided.
  #[inline]
  pub fn has_stopping_criterion(&self) -> bool {
    self.max_mass_fraction.is_some()
      || self.max_optical_depth.is_some()
      || self.max_density_dispersion.is_some()
  }

  /// Number of [`RandomStream`](crate::RandomStream) slots a build needs:
  /// one per sampling worker plus one for the calling thread.
  #[inline]
  pub fn random_slots(&self) -> usize {
    self.sampling_threads + 1
  }

  /// Check every limit before any node is built.
  pub fn validate(&self, distribution_dimension: u8) -> Result<(), GridError> {
    if distribution_dimension > GRID_DIMENSION {
      return Err(GridError::invalid(format!(
        "grid dimension {GRID_DIMENSION} is lower than the distribution dimension {distribution_dimension}"
      )));
    }
    let h = self.half_widths;
    if !(h.x > 0.0 && h.y > 0.0 && h.z > 0.0) || !h.is_finite() {
      return Err(GridError::invalid(format!(
        "half-widths must be positive and finite, got {h}"
      )));
    }
    if self.max_level < 2 {
      return Err(GridError::invalid(format!(
        "max_level must be at least 2, got {}",
        self.max_level
      )));
    }
    if self.max_level > MAX_LEVEL_LIMIT {
      return Err(GridError::invalid(format!(
        "max_level must not exceed {MAX_LEVEL_LIMIT}, got {}",
        self.max_level
      )));
    }
    if self.min_level >= self.max_level {
      return Err(GridError::invalid(format!(
        "min_level ({}) must be lower than max_level ({})",
        self.min_level, self.max_level
      )));
    }
    if self.sample_count < MIN_SAMPLE_COUNT {
      return Err(GridError::invalid(format!(
        "sample_count must be at least {MIN_SAMPLE_COUNT}, got {}",
        self.sample_count
      )));
    }
    for (name, value) in [
      ("max_mass_fraction", self.max_mass_fraction),
      ("max_optical_depth", self.max_optical_depth),
      ("max_density_dispersion", self.max_density_dispersion),
    ] {
      if let Some(value) = value {
        if value.is_nan() || value < 0.0 {
          return Err(GridError::invalid(format!(
            "{name} must be non-negative, got {value}"
          )));
        }
      }
    }
    if !(self.reference_opacity > 0.0) {
      return Err(GridError::invalid(format!(
        "reference_opacity must be positive, got {}",
        self.reference_opacity
      )));
    }
    if self.sampling_threads == 0 {
      return Err(GridError::invalid("sampling_threads must be at least 1"));
    }
    Ok(())
  }
}

impl Default for GridConfig {
  fn default() -> Self {
    Self {
      half_widths: DVec3::ONE,
      min_level: 2,
      max_level: 6,
      search_method: SearchMethod::TopDown,
      sample_count: 100,
      max_mass_fraction: None,
      max_optical_depth: None,
      max_density_dispersion: None,
      reference_opacity: 1.0,
      barycentric: false,
      sampling_threads: 4,
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
