//! Axis-aligned bounding box with double precision.

use glam::DVec3;

use super::node::{Face, Octant};

/// Double-precision axis-aligned box covering a node of the dust grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
	/// Minimum corner (inclusive).
	pub min: DVec3,
	/// Maximum corner (inclusive for the outer box, exclusive between siblings).
	pub max: DVec3,
}

impl Extent {
	/// Create a new extent from min and max corners.
	///
	/// # Panics
	/// Debug-asserts that min <= max on all axes.
	pub fn new(min: DVec3, max: DVec3) -> Self {
		debug_assert!(
			min.x <= max.x && min.y <= max.y && min.z <= max.z,
			"Extent min must be <= max on all axes"
		);
		Self { min, max }
	}

	/// Create a new extent from center and half-widths.
	pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
		Self {
			min: center - half_extents,
			max: center + half_extents,
		}
	}

	/// Check if this extent overlaps with another, boundaries included.
	#[inline]
	pub fn overlaps(&self, other: &Extent) -> bool {
		self.min.x <= other.max.x
			&& self.max.x >= other.min.x
			&& self.min.y <= other.max.y
			&& self.max.y >= other.min.y
			&& self.min.z <= other.max.z
			&& self.max.z >= other.min.z
	}

	/// Check if this extent contains a point, boundaries included.
	#[inline]
	pub fn contains_point(&self, point: DVec3) -> bool {
		point.x >= self.min.x
			&& point.x <= self.max.x
			&& point.y >= self.min.y
			&& point.y <= self.max.y
			&& point.z >= self.min.z
			&& point.z <= self.max.z
	}

	/// Check if `[min, max)` contains a point on every axis.
	///
	/// Matches the tie rule used when descending the tree: a point on a split
	/// plane belongs to the upper child.
	#[inline]
	pub fn contains_point_half_open(&self, point: DVec3) -> bool {
		point.x >= self.min.x
			&& point.x < self.max.x
			&& point.y >= self.min.y
			&& point.y < self.max.y
			&& point.z >= self.min.z
			&& point.z < self.max.z
	}

	/// Get the widths of the extent (max - min).
	#[inline]
	pub fn size(&self) -> DVec3 {
		self.max - self.min
	}

	/// Get the center of the extent.
	#[inline]
	pub fn center(&self) -> DVec3 {
		(self.min + self.max) * 0.5
	}

	#[inline]
	pub fn volume(&self) -> f64 {
		let size = self.size();
		size.x * size.y * size.z
	}

	/// Length of the main diagonal.
	#[inline]
	pub fn diagonal(&self) -> f64 {
		self.size().length()
	}

	/// Map a point in the unit cube onto this extent.
	#[inline]
	pub fn lerp(&self, fraction: DVec3) -> DVec3 {
		self.min + self.size() * fraction
	}

	/// Sub-box for one octant when the box is split at `split`.
	pub fn octant(&self, split: DVec3, octant: Octant) -> Extent {
		let (x, y, z) = octant.bits();
		let min = DVec3::new(
			if x { split.x } else { self.min.x },
			if y { split.y } else { self.min.y },
			if z { split.z } else { self.min.z },
		);
		let max = DVec3::new(
			if x { self.max.x } else { split.x },
			if y { self.max.y } else { split.y },
			if z { self.max.z } else { split.z },
		);
		Extent { min, max }
	}

	/// Coordinate of the plane carrying `face`.
	#[inline]
	pub fn face_coordinate(&self, face: Face) -> f64 {
		let axis = face.axis();
		if face.is_positive() {
			self.max[axis]
		} else {
			self.min[axis]
		}
	}

	/// Area of the overlap of two rectangles lying in planes orthogonal to
	/// `axis`. Zero when they only touch along an edge.
	pub fn shared_area(&self, other: &Extent, axis: usize) -> f64 {
		let (a, b) = tangent_axes(axis);
		let wa = self.max[a].min(other.max[a]) - self.min[a].max(other.min[a]);
		let wb = self.max[b].min(other.max[b]) - self.min[b].max(other.min[b]);
		if wa > 0.0 && wb > 0.0 {
			wa * wb
		} else {
			0.0
		}
	}

	/// Distance from `point` (inside the box) to the first face hit when
	/// moving along `direction`, together with that face.
	///
	/// Axes with a zero direction component never exit.
	pub fn exit_distance(&self, point: DVec3, direction: DVec3) -> (f64, Face) {
		let mut best = (f64::INFINITY, Face::PosX);
		for axis in 0..3 {
			let k = direction[axis];
			let (distance, face) = if k > 0.0 {
				((self.max[axis] - point[axis]) / k, Face::positive(axis))
			} else if k < 0.0 {
				((self.min[axis] - point[axis]) / k, Face::negative(axis))
			} else {
				continue;
			};
			if distance < best.0 {
				best = (distance, face);
			}
		}
		(best.0.max(0.0), best.1)
	}

	/// Distance along a ray to the first point inside the box.
	///
	/// Returns `Some(0.0)` when the origin is already inside and `None` when the
	/// ray line misses the box or the box lies behind the origin.
	pub fn ray_entry(&self, origin: DVec3, direction: DVec3) -> Option<f64> {
		let mut t_min = f64::NEG_INFINITY;
		let mut t_max = f64::INFINITY;
		for axis in 0..3 {
			let o = origin[axis];
			let k = direction[axis];
			if k == 0.0 {
				if o < self.min[axis] || o > self.max[axis] {
					return None;
				}
				continue;
			}
			let t1 = (self.min[axis] - o) / k;
			let t2 = (self.max[axis] - o) / k;
			t_min = t_min.max(t1.min(t2));
			t_max = t_max.min(t1.max(t2));
		}
		let entry = t_min.max(0.0);
		if t_max < entry {
			None
		} else {
			Some(entry)
		}
	}
}

/// The two axes spanning the plane orthogonal to `axis`.
#[inline]
pub(crate) fn tangent_axes(axis: usize) -> (usize, usize) {
	match axis {
		0 => (1, 2),
		1 => (0, 2),
		_ => (0, 1),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new() {
		let extent = Extent::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
		assert_eq!(extent.min, DVec3::new(-1.0, -2.0, -3.0));
		assert_eq!(extent.max, DVec3::new(1.0, 2.0, 3.0));
	}

	#[test]
	fn test_from_center_half_extents() {
		let extent = Extent::from_center_half_extents(DVec3::ZERO, DVec3::splat(10.0));
		assert_eq!(extent.min, DVec3::splat(-10.0));
		assert_eq!(extent.max, DVec3::splat(10.0));
	}

	#[test]
	fn test_overlaps_touching() {
		// Touching at boundary should count as overlapping
		let a = Extent::new(DVec3::ZERO, DVec3::splat(10.0));
		let b = Extent::new(DVec3::splat(10.0), DVec3::splat(20.0));
		assert!(a.overlaps(&b));
		assert!(b.overlaps(&a));
	}

	#[test]
	fn test_contains_point_closed_and_half_open() {
		let extent = Extent::new(DVec3::ZERO, DVec3::splat(10.0));

		assert!(extent.contains_point(DVec3::splat(5.0)));
		assert!(extent.contains_point(DVec3::splat(10.0)));
		assert!(!extent.contains_point(DVec3::splat(-1.0)));

		assert!(extent.contains_point_half_open(DVec3::ZERO));
		assert!(!extent.contains_point_half_open(DVec3::new(10.0, 5.0, 5.0)));
	}

	#[test]
	fn test_volume_and_diagonal() {
		let extent = Extent::new(DVec3::new(-1.0, -2.0, -3.0), DVec3::new(1.0, 2.0, 3.0));
		assert_eq!(extent.size(), DVec3::new(2.0, 4.0, 6.0));
		assert_eq!(extent.center(), DVec3::ZERO);
		assert_eq!(extent.volume(), 48.0);
		assert!((extent.diagonal() - 56.0_f64.sqrt()).abs() < 1e-12);
	}

	#[test]
	fn test_octants_tile_parent() {
		let extent = Extent::new(DVec3::ZERO, DVec3::splat(4.0));
		let split = DVec3::new(1.0, 2.0, 3.0);
		let total: f64 = Octant::ALL
			.iter()
			.map(|&o| extent.octant(split, o).volume())
			.sum();
		assert!((total - extent.volume()).abs() < 1e-12);

		let upper = extent.octant(split, Octant::new(7));
		assert_eq!(upper.min, split);
		assert_eq!(upper.max, DVec3::splat(4.0));
	}

	#[test]
	fn test_exit_distance_picks_nearest_face() {
		let extent = Extent::new(DVec3::ZERO, DVec3::splat(1.0));
		let (d, face) = extent.exit_distance(DVec3::new(0.5, 0.9, 0.5), DVec3::new(0.6, 0.8, 0.0));
		assert_eq!(face, Face::PosY);
		assert!((d - 0.125).abs() < 1e-12);

		let (d, face) = extent.exit_distance(DVec3::splat(0.25), DVec3::NEG_X);
		assert_eq!(face, Face::NegX);
		assert!((d - 0.25).abs() < 1e-12);
	}

	#[test]
	fn test_ray_entry() {
		let extent = Extent::new(DVec3::splat(-1.0), DVec3::splat(1.0));

		assert_eq!(extent.ray_entry(DVec3::ZERO, DVec3::X), Some(0.0));
		assert_eq!(extent.ray_entry(DVec3::new(-3.0, 0.0, 0.0), DVec3::X), Some(2.0));
		// Pointing away
		assert_eq!(extent.ray_entry(DVec3::new(-3.0, 0.0, 0.0), DVec3::NEG_X), None);
		// Parallel and outside the slab
		assert_eq!(extent.ray_entry(DVec3::new(-3.0, 2.0, 0.0), DVec3::X), None);
	}

	#[test]
	fn test_shared_area() {
		let a = Extent::new(DVec3::ZERO, DVec3::splat(2.0));
		let b = Extent::new(DVec3::new(2.0, 1.0, 1.0), DVec3::new(3.0, 3.0, 3.0));
		assert_eq!(a.shared_area(&b, 0), 1.0);

		let edge = Extent::new(DVec3::new(2.0, 2.0, 0.0), DVec3::new(3.0, 3.0, 2.0));
		assert_eq!(a.shared_area(&edge, 0), 0.0);
	}
}
