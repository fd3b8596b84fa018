//! Bounded worker pool for construction-time sampling.
//!
//! Sampling many small nodes gains little from wide parallelism, so
//! construction runs on its own small rayon pool instead of the global one.
//!
//! # Usage
//!
//! ```ignore
//! let pool = SamplingPool::new(4)?;
//!
//! // Fill pre-sized slots in parallel
//! let densities = pool.map_indexed(100, |i| expensive_sample(i));
//! ```

use rayon::prelude::*;

use crate::error::GridError;

/// Small rayon pool dedicated to density sampling.
pub struct SamplingPool {
  pool: rayon::ThreadPool,
}

impl SamplingPool {
  /// Create a pool with exactly `num_threads` workers.
  pub fn new(num_threads: usize) -> Result<Self, GridError> {
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(num_threads.max(1))
      .thread_name(|index| format!("dust-grid-sampler-{index}"))
      .build()?;
    Ok(Self { pool })
  }

  /// Number of worker threads in the pool.
  pub fn num_threads(&self) -> usize {
    self.pool.current_num_threads()
  }

  /// Evaluate `work(i)` for every `i` in `0..count` on the pool.
  ///
  /// Results land in slot `i` of the returned vector; calls share no
  /// mutable state.
  pub fn map_indexed<T, F>(&self, count: usize, work: F) -> Vec<T>
  where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
  {
    self
      .pool
      .install(|| (0..count).into_par_iter().map(&work).collect())
  }

  /// Run `op` inside the pool, so nested rayon calls use its workers.
  pub fn install<R, F>(&self, op: F) -> R
  where
    R: Send,
    F: FnOnce() -> R + Send,
  {
    self.pool.install(op)
  }
}

// =============================================================================
// Tests
// =============================================================================
