//! Density calculators: mass, barycenter and refinement diagnostics of the
//! region covered by one node.
//!
//! Two interchangeable strategies share [`DensityCalculator`]:
//!
//! - [`ExactCalculator`]: asks the distribution for the exact mass in the
//!   node's box through [`MassInBox`].
//! - [`SampledCalculator`]: draws uniform random points inside the node on
//!   the bounded [`SamplingPool`](crate::threading::SamplingPool) and
//!   averages the density.

use glam::DVec3;

use crate::octree::Extent;

pub mod exact;
pub mod sampled;

pub use exact::ExactCalculator;
pub use sampled::{DensitySample, SampledCalculator};

/// Density field the grid adapts to.
///
/// Implementations are shared by all sampling workers.
pub trait Distribution: Send + Sync {
  /// Intrinsic dimension: 1 (spherical), 2 (axisymmetric) or 3.
  fn dimension(&self) -> u8 {
    3
  }

  /// Mass density at `position`.
  fn density(&self, position: DVec3) -> f64;

  /// Total mass of the distribution.
  fn total_mass(&self) -> f64;

  /// Exact box integration, if the distribution supports it.
  fn as_mass_in_box(&self) -> Option<&dyn MassInBox> {
    None
  }
}

/// Exact mass contained in an axis-aligned box.
pub trait MassInBox: Send + Sync {
  fn mass_in_box(&self, extent: &Extent) -> f64;
}

/// Estimates for the region covered by one node.
pub trait DensityCalculator {
  fn volume(&self) -> f64;

  fn mass(&self) -> f64;

  /// Representative point used for weighted splitting.
  fn barycenter(&self) -> DVec3;

  /// `opacity * mass / volume^(2/3)`: optical depth across a cube of the
  /// node's volume.
  fn optical_depth_estimate(&self) -> f64;

  /// `(max - min) / max` of the sampled densities.
  fn density_dispersion_estimate(&self) -> f64;
}

/// Optical depth across a cube holding `mass` in `volume`.
#[inline]
pub(crate) fn optical_depth(reference_opacity: f64, mass: f64, volume: f64) -> f64 {
  if volume <= 0.0 {
    return 0.0;
  }
  reference_opacity * mass / volume.powf(2.0 / 3.0)
}
