//! Per-worker random number streams.
//!
//! One generator per worker slot, seeded deterministically from a base seed.
//! The slot is the rayon worker index of the calling thread (plus one), or 0
//! outside a rayon pool, so samplers running on different workers never
//! share a sequence.

use std::sync::Mutex;

use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::octree::Extent;

/// Shared random source with one independent generator per worker slot.
pub struct RandomStream {
  slots: Vec<Mutex<ChaCha8Rng>>,
  seed: u64,
}

impl RandomStream {
  /// Create a stream with `slots` generators derived from `seed`.
  ///
  /// Every worker only gets its own sequence with at least the number of
  /// pool threads + 1 slots; [`DustGrid::build`](crate::DustGrid::build)
  /// rejects smaller streams. Workers past the last slot wrap onto existing
  /// slots and share their sequence.
  pub fn new(seed: u64, slots: usize) -> Self {
    let slots = slots.max(1);
    Self {
      slots: (0..slots)
        .map(|slot| {
          let mut rng = ChaCha8Rng::seed_from_u64(seed);
          rng.set_stream(slot as u64);
          Mutex::new(rng)
        })
        .collect(),
      seed,
    }
  }

  /// Stream sized for the current machine's rayon pool.
  pub fn for_current_pool(seed: u64) -> Self {
    Self::new(seed, rayon::current_num_threads() + 1)
  }

  #[inline]
  pub fn seed(&self) -> u64 {
    self.seed
  }

  #[inline]
  pub fn slot_count(&self) -> usize {
    self.slots.len()
  }

  /// Slot of the calling thread.
  #[inline]
  pub fn current_slot(&self) -> usize {
    rayon::current_thread_index().map_or(0, |index| index + 1) % self.slots.len()
  }

  /// Uniform deviate in `[0, 1)` from an explicit slot.
  pub fn uniform_in_slot(&self, slot: usize) -> f64 {
    let mut rng = self.slots[slot % self.slots.len()]
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    rng.random::<f64>()
  }

  /// Uniform deviate in `[0, 1)` from the calling worker's slot.
  #[inline]
  pub fn uniform(&self) -> f64 {
    self.uniform_in_slot(self.current_slot())
  }

  /// Uniformly distributed point inside `extent`.
  pub fn position_in(&self, extent: &Extent) -> DVec3 {
    let mut rng = self.slots[self.current_slot()]
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    let fraction = DVec3::new(rng.random(), rng.random(), rng.random());
    extent.lerp(fraction)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_same_seed_same_sequence() {
    let a = RandomStream::new(42, 4);
    let b = RandomStream::new(42, 4);
    for _ in 0..10 {
      assert_eq!(a.uniform_in_slot(2), b.uniform_in_slot(2));
    }
  }

  #[test]
  fn test_slots_are_independent() {
    let stream = RandomStream::new(7, 2);
    let first: Vec<f64> = (0..8).map(|_| stream.uniform_in_slot(0)).collect();
    let second: Vec<f64> = (0..8).map(|_| stream.uniform_in_slot(1)).collect();
    assert_ne!(first, second);

    // Drawing from slot 1 did not advance slot 0
    let fresh = RandomStream::new(7, 2);
    let replay: Vec<f64> = (0..8).map(|_| fresh.uniform_in_slot(0)).collect();
    assert_eq!(first, replay);
  }

  #[test]
  fn test_uniform_range() {
    let stream = RandomStream::new(1, 1);
    for _ in 0..1000 {
      let u = stream.uniform();
      assert!((0.0..1.0).contains(&u));
    }
  }

  #[test]
  fn test_position_in_extent() {
    let stream = RandomStream::new(3, 1);
    let extent = Extent::new(DVec3::new(-1.0, 2.0, 5.0), DVec3::new(0.0, 4.0, 5.5));
    for _ in 0..1000 {
      assert!(extent.contains_point(stream.position_in(&extent)));
    }
  }

  #[test]
  fn test_for_current_pool() {
    let stream = RandomStream::for_current_pool(5);
    assert_eq!(stream.seed(), 5);
    assert_eq!(stream.slot_count(), rayon::current_num_threads() + 1);
  }

  #[test]
  fn test_current_slot_outside_pool() {
    let stream = RandomStream::new(0, 3);
    assert_eq!(stream.current_slot(), 0);
  }

  #[test]
  fn test_current_slot_inside_pool() {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
    let stream = RandomStream::new(0, 3);
    let slot = pool.install(|| stream.current_slot());
    assert!(slot == 1 || slot == 2);
  }

  #[test]
  fn test_every_pool_worker_has_its_own_slot() {
    let pool = crate::SamplingPool::new(4).unwrap();
    let stream = RandomStream::new(1, 5);
    let mut slots: Vec<(usize, usize)> =
      pool.install(|| rayon::broadcast(|ctx| (ctx.index(), stream.current_slot())));
    slots.sort_unstable();
    assert_eq!(slots, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
  }
}
