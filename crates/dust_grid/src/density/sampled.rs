//! Monte Carlo calculator: uniform random samples inside the node.

use glam::DVec3;

use super::{optical_depth, DensityCalculator, Distribution};
use crate::octree::Extent;
use crate::random::RandomStream;
use crate::threading::SamplingPool;

/// One density evaluation at a random position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DensitySample {
  pub position: DVec3,
  pub density: f64,
}

/// Aggregates over all samples, computed once after sampling.
#[derive(Clone, Copy, Debug, Default)]
struct Summary {
  mean: f64,
  min: f64,
  max: f64,
  barycenter: Option<DVec3>,
}

/// Calculator estimating node properties from random density samples.
///
/// ```ignore
/// let mut calc = SampledCalculator::new(extent, 100, &distribution, &random, 1.0);
/// calc.sample_all(&pool);
/// let fraction = calc.mass() / distribution.total_mass();
/// ```
pub struct SampledCalculator<'a> {
  extent: Extent,
  distribution: &'a dyn Distribution,
  random: &'a RandomStream,
  reference_opacity: f64,
  samples: Vec<DensitySample>,
  summary: Summary,
}

impl<'a> SampledCalculator<'a> {
  /// Create a calculator with `sample_count` empty sample slots.
  pub fn new(
    extent: Extent,
    sample_count: usize,
    distribution: &'a dyn Distribution,
    random: &'a RandomStream,
    reference_opacity: f64,
  ) -> Self {
    Self {
      extent,
      distribution,
      random,
      reference_opacity,
      samples: vec![DensitySample::default(); sample_count],
      summary: Summary::default(),
    }
  }

  #[inline]
  pub fn sample_count(&self) -> usize {
    self.samples.len()
  }

  #[inline]
  pub fn samples(&self) -> &[DensitySample] {
    &self.samples
  }

  /// Draw sample `index`. Independent of every other index, so any number
  /// of calls may run in parallel; randomness comes from the calling
  /// worker's slot of the random stream.
  pub fn sample(&self, index: usize) -> DensitySample {
    debug_assert!(index < self.samples.len(), "sample index {index} out of range");
    let position = self.random.position_in(&self.extent);
    DensitySample {
      position,
      density: self.distribution.density(position),
    }
  }

  /// Fill every sample slot on the pool, then summarize.
  pub fn sample_all(&mut self, pool: &SamplingPool) {
    let samples = {
      let this = &*self;
      pool.map_indexed(this.samples.len(), |index| this.sample(index))
    };
    self.samples = samples;
    self.summarize();
  }

  fn summarize(&mut self) {
    if self.samples.is_empty() {
      self.summary = Summary::default();
      return;
    }
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut weighted = DVec3::ZERO;
    for sample in &self.samples {
      sum += sample.density;
      min = min.min(sample.density);
      max = max.max(sample.density);
      weighted += sample.position * sample.density;
    }
    self.summary = Summary {
      mean: sum / self.samples.len() as f64,
      min,
      max,
      barycenter: (sum > 0.0).then(|| weighted / sum),
    };
  }
}

impl DensityCalculator for SampledCalculator<'_> {
  fn volume(&self) -> f64 {
    self.extent.volume()
  }

  fn mass(&self) -> f64 {
    self.summary.mean * self.volume()
  }

  fn barycenter(&self) -> DVec3 {
    self.summary.barycenter.unwrap_or_else(|| self.extent.center())
  }

  fn optical_depth_estimate(&self) -> f64 {
    optical_depth(self.reference_opacity, self.mass(), self.volume())
  }

  fn density_dispersion_estimate(&self) -> f64 {
    if self.summary.max > 0.0 {
      (self.summary.max - self.summary.min) / self.summary.max
    } else {
      0.0
    }
  }
}

#[cfg(test)]
#[path = "sampled_test.rs"]
mod sampled_test;
