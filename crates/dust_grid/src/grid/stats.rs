//! Statistics gathered while building a grid.

/// Counters from one construction run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstructionStats {
  /// Nodes in the arena, internal nodes included.
  pub node_count: usize,
  /// Leaf cells.
  pub cell_count: usize,
  /// Subdivisions of nodes at or below the minimum level.
  pub forced_subdivisions: usize,
  /// Subdivisions made because no stopping criterion is configured.
  pub unconditional_subdivisions: usize,
  /// Subdivisions triggered by a stopping criterion.
  pub criteria_subdivisions: usize,
  /// Nodes evaluated with the exact calculator.
  pub exact_evaluations: usize,
  /// Nodes evaluated with the sampling calculator.
  pub sampled_evaluations: usize,
  /// Leaf count at each level (index = level).
  pub cells_per_level: Vec<usize>,
  /// Wall time of the construction in microseconds.
  pub elapsed_us: u64,
}

impl ConstructionStats {
  /// Total number of subdivisions performed.
  #[inline]
  pub fn total_subdivisions(&self) -> usize {
    self.forced_subdivisions + self.unconditional_subdivisions + self.criteria_subdivisions
  }

  /// Total number of density calculator evaluations.
  #[inline]
  pub fn total_evaluations(&self) -> usize {
    self.exact_evaluations + self.sampled_evaluations
  }

  /// Level of the deepest cell.
  pub fn deepest_level(&self) -> Option<usize> {
    self.cells_per_level.iter().rposition(|&count| count > 0)
  }

  pub(crate) fn record_cell(&mut self, level: u32) {
    let level = level as usize;
    if self.cells_per_level.len() <= level {
      self.cells_per_level.resize(level + 1, 0);
    }
    self.cells_per_level[level] += 1;
    self.cell_count += 1;
  }
}
