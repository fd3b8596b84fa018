//! DustGridPath - ordered cell crossings of one ray.

use glam::DVec3;

/// One crossing: cell number and the length travelled inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
  pub cell: usize,
  pub length: f64,
}

/// Cells crossed by a ray, in travel order.
///
/// When the ray starts outside the grid, segments begin at the entry point,
/// which lies `entry_distance` along the ray from `origin`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DustGridPath {
  origin: DVec3,
  direction: DVec3,
  entry_distance: f64,
  segments: Vec<Segment>,
}

impl DustGridPath {
  /// Empty path for a ray with a normalized (or zero) direction.
  pub fn new(origin: DVec3, direction: DVec3) -> Self {
    Self {
      origin,
      direction,
      entry_distance: 0.0,
      segments: Vec::new(),
    }
  }

  pub(crate) fn set_entry_distance(&mut self, distance: f64) {
    self.entry_distance = distance;
  }

  /// Append a crossing.
  #[inline]
  pub fn push(&mut self, cell: usize, length: f64) {
    self.segments.push(Segment { cell, length });
  }

  #[inline]
  pub fn origin(&self) -> DVec3 {
    self.origin
  }

  /// Unit direction of travel, zero for a degenerate ray.
  #[inline]
  pub fn direction(&self) -> DVec3 {
    self.direction
  }

  /// Distance from the origin to the point where the ray enters the grid.
  #[inline]
  pub fn entry_distance(&self) -> f64 {
    self.entry_distance
  }

  #[inline]
  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.segments.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  /// Sum of all segment lengths.
  pub fn total_length(&self) -> f64 {
    self.segments.iter().map(|segment| segment.length).sum()
  }

  /// Cell numbers in travel order.
  pub fn cells(&self) -> impl Iterator<Item = usize> + '_ {
    self.segments.iter().map(|segment| segment.cell)
  }

  /// Distance travelled inside the grid at the end of each segment.
  pub fn cumulative(&self) -> Vec<f64> {
    self
      .segments
      .iter()
      .scan(0.0, |travelled, segment| {
        *travelled += segment.length;
        Some(*travelled)
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_path() {
    let path = DustGridPath::new(DVec3::ZERO, DVec3::X);
    assert!(path.is_empty());
    assert_eq!(path.len(), 0);
    assert_eq!(path.total_length(), 0.0);
    assert!(path.cumulative().is_empty());
  }

  #[test]
  fn test_accumulates_segments() {
    let mut path = DustGridPath::new(DVec3::ZERO, DVec3::X);
    path.push(4, 0.5);
    path.push(2, 0.25);
    path.push(9, 1.0);

    assert_eq!(path.len(), 3);
    assert_eq!(path.cells().collect::<Vec<_>>(), vec![4, 2, 9]);
    assert_eq!(path.total_length(), 1.75);
    assert_eq!(path.cumulative(), vec![0.5, 0.75, 1.75]);
  }
}
