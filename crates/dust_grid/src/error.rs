//! Error type shared by grid construction and export.

use thiserror::Error;

/// Errors raised while setting up or exporting a dust grid.
///
/// Traversal and point location never fail; misses are empty results.
#[derive(Debug, Error)]
pub enum GridError {
  /// A configuration value is out of range. Raised before any node is built.
  #[error("invalid grid configuration: {0}")]
  InvalidConfig(String),

  /// The bounded sampling pool could not be created.
  #[error("failed to build sampling thread pool: {0}")]
  ThreadPool(#[from] rayon::ThreadPoolBuildError),

  /// Writing plot data failed.
  #[error("failed to write plot data: {0}")]
  Io(#[from] std::io::Error),
}

impl GridError {
  pub(crate) fn invalid(reason: impl Into<String>) -> Self {
    Self::InvalidConfig(reason.into())
  }
}
