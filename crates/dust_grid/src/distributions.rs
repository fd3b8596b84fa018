//! Analytic density distributions for tests, benchmarks and the CLI.
//!
//! Each one is cheap to evaluate and has a known total mass, so refinement
//! results are easy to check by hand.

use std::f64::consts::PI;

use glam::DVec3;

use crate::density::{Distribution, MassInBox};
use crate::octree::Extent;

/// Constant density inside a box, zero outside.
///
/// Supports exact mass-in-box integration.
#[derive(Clone, Copy, Debug)]
pub struct UniformBox {
  pub extent: Extent,
  pub total_mass: f64,
}

impl UniformBox {
  pub fn new(extent: Extent, total_mass: f64) -> Self {
    Self { extent, total_mass }
  }

  /// Unit-mass cube of the given half-width centered on the origin.
  pub fn cube(half_width: f64) -> Self {
    Self::new(
      Extent::from_center_half_extents(DVec3::ZERO, DVec3::splat(half_width)),
      1.0,
    )
  }

  fn density_inside(&self) -> f64 {
    let volume = self.extent.volume();
    if volume > 0.0 {
      self.total_mass / volume
    } else {
      0.0
    }
  }
}

impl Distribution for UniformBox {
  fn density(&self, position: DVec3) -> f64 {
    if self.extent.contains_point(position) {
      self.density_inside()
    } else {
      0.0
    }
  }

  fn total_mass(&self) -> f64 {
    self.total_mass
  }

  fn as_mass_in_box(&self) -> Option<&dyn MassInBox> {
    Some(self)
  }
}

impl MassInBox for UniformBox {
  fn mass_in_box(&self, extent: &Extent) -> f64 {
    if !self.extent.overlaps(extent) {
      return 0.0;
    }
    let min = self.extent.min.max(extent.min);
    let max = self.extent.max.min(extent.max);
    let size = (max - min).max(DVec3::ZERO);
    size.x * size.y * size.z * self.density_inside()
  }
}

/// Plummer sphere: `rho(r) = 3M / (4 pi a^3) * (1 + r^2/a^2)^(-5/2)`.
#[derive(Clone, Copy, Debug)]
pub struct PlummerSphere {
  pub scale_length: f64,
  pub total_mass: f64,
}

impl PlummerSphere {
  pub fn new(scale_length: f64, total_mass: f64) -> Self {
    Self {
      scale_length,
      total_mass,
    }
  }
}

impl Distribution for PlummerSphere {
  fn dimension(&self) -> u8 {
    1
  }

  fn density(&self, position: DVec3) -> f64 {
    let a = self.scale_length;
    let rho0 = 3.0 * self.total_mass / (4.0 * PI * a * a * a);
    rho0 * (1.0 + position.length_squared() / (a * a)).powf(-2.5)
  }

  fn total_mass(&self) -> f64 {
    self.total_mass
  }
}

/// Double-exponential disk:
/// `rho(R, z) = M / (4 pi h^2 hz) * exp(-R/h - |z|/hz)`.
#[derive(Clone, Copy, Debug)]
pub struct ExponentialDisk {
  pub scale_length: f64,
  pub scale_height: f64,
  pub total_mass: f64,
}

impl ExponentialDisk {
  pub fn new(scale_length: f64, scale_height: f64, total_mass: f64) -> Self {
    Self {
      scale_length,
      scale_height,
      total_mass,
    }
  }
}

impl Distribution for ExponentialDisk {
  fn dimension(&self) -> u8 {
    2
  }

  fn density(&self, position: DVec3) -> f64 {
    let h = self.scale_length;
    let hz = self.scale_height;
    let rho0 = self.total_mass / (4.0 * PI * h * h * hz);
    let radius = (position.x * position.x + position.y * position.y).sqrt();
    rho0 * (-radius / h - position.z.abs() / hz).exp()
  }

  fn total_mass(&self) -> f64 {
    self.total_mass
  }
}
