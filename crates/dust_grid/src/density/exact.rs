//! Exact calculator backed by a mass-in-box integration.

use glam::DVec3;

use super::{optical_depth, DensityCalculator, MassInBox};
use crate::octree::Extent;

/// Calculator using exact box integration.
///
/// Carries no density samples, so the dispersion estimate is always 0; the
/// grid only picks it when dispersion stopping is disabled.
#[derive(Clone, Copy, Debug)]
pub struct ExactCalculator {
  extent: Extent,
  mass: f64,
  reference_opacity: f64,
}

impl ExactCalculator {
  pub fn new(extent: Extent, integrator: &dyn MassInBox, reference_opacity: f64) -> Self {
    Self {
      extent,
      mass: integrator.mass_in_box(&extent),
      reference_opacity,
    }
  }
}

impl DensityCalculator for ExactCalculator {
  fn volume(&self) -> f64 {
    self.extent.volume()
  }

  fn mass(&self) -> f64 {
    self.mass
  }

  fn barycenter(&self) -> DVec3 {
    self.extent.center()
  }

  fn optical_depth_estimate(&self) -> f64 {
    optical_depth(self.reference_opacity, self.mass, self.volume())
  }

  fn density_dispersion_estimate(&self) -> f64 {
    0.0
  }
}
