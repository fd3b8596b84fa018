//! Plain-text export of cell boundaries for plotting.
//!
//! Every file holds whitespace-separated coordinate tuples, one polyline per
//! block, blocks separated by a blank line. This is the layout gnuplot reads
//! with `plot 'grid_xy.dat' with lines`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::DVec3;
use tracing::info;

use crate::error::GridError;
use crate::grid::DustGrid;
use crate::octree::Extent;

/// Coordinate plane through the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
  XY,
  XZ,
  YZ,
}

impl Plane {
  pub const ALL: [Plane; 3] = [Plane::XY, Plane::XZ, Plane::YZ];

  /// In-plane axes (horizontal, vertical) and the normal axis.
  #[inline]
  pub fn axes(self) -> (usize, usize, usize) {
    match self {
      Plane::XY => (0, 1, 2),
      Plane::XZ => (0, 2, 1),
      Plane::YZ => (1, 2, 0),
    }
  }

  pub fn file_name(self) -> &'static str {
    match self {
      Plane::XY => "grid_xy.dat",
      Plane::XZ => "grid_xz.dat",
      Plane::YZ => "grid_yz.dat",
    }
  }

  /// Whether the plane cuts through `extent`. Cells touching the plane from
  /// below are left out so each cut is drawn once.
  fn cuts(self, extent: &Extent) -> bool {
    let (_, _, normal) = self.axes();
    extent.min[normal] <= 0.0 && extent.max[normal] > 0.0
  }
}

/// File name of the 3D dump.
pub const CELLS_3D_FILE: &str = "grid_xyz.dat";

/// Write the outline of every cell cut by `plane`. Returns the number of
/// outlines written.
pub fn write_plane<W: Write>(grid: &DustGrid, plane: Plane, out: &mut W) -> std::io::Result<usize> {
  let (h, v, _) = plane.axes();
  let mut count = 0;
  for m in 0..grid.number_of_cells() {
    let extent = grid.cell_extent(m);
    if !plane.cuts(extent) {
      continue;
    }
    let (x0, x1) = (extent.min[h], extent.max[h]);
    let (y0, y1) = (extent.min[v], extent.max[v]);
    for (x, y) in [(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)] {
      writeln!(out, "{x} {y}")?;
    }
    writeln!(out)?;
    count += 1;
  }
  Ok(count)
}

/// Write the 12 edges of every cell as polylines: the bottom and top loops
/// and the 4 vertical edges.
pub fn write_cells_3d<W: Write>(grid: &DustGrid, out: &mut W) -> std::io::Result<usize> {
  for m in 0..grid.number_of_cells() {
    let Extent { min, max } = *grid.cell_extent(m);
    let corner = |x: f64, y: f64, z: f64| DVec3::new(x, y, z);
    let loop_at = |z: f64| {
      [
        corner(min.x, min.y, z),
        corner(max.x, min.y, z),
        corner(max.x, max.y, z),
        corner(min.x, max.y, z),
        corner(min.x, min.y, z),
      ]
    };
    write_polyline(out, &loop_at(min.z))?;
    write_polyline(out, &loop_at(max.z))?;
    for (x, y) in [(min.x, min.y), (max.x, min.y), (max.x, max.y), (min.x, max.y)] {
      write_polyline(out, &[corner(x, y, min.z), corner(x, y, max.z)])?;
    }
  }
  Ok(grid.number_of_cells())
}

fn write_polyline<W: Write>(out: &mut W, points: &[DVec3]) -> std::io::Result<()> {
  for p in points {
    writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
  }
  writeln!(out)
}

/// Write the three plane cuts and the 3D dump into `dir`.
pub fn write_all(grid: &DustGrid, dir: &Path) -> Result<Vec<PathBuf>, GridError> {
  std::fs::create_dir_all(dir)?;
  let mut written = Vec::with_capacity(4);

  for plane in Plane::ALL {
    let path = dir.join(plane.file_name());
    let mut out = BufWriter::new(File::create(&path)?);
    let count = write_plane(grid, plane, &mut out)?;
    out.flush()?;
    info!("Wrote {count} cell outlines to {}", path.display());
    written.push(path);
  }

  let path = dir.join(CELLS_3D_FILE);
  let mut out = BufWriter::new(File::create(&path)?);
  let count = write_cells_3d(grid, &mut out)?;
  out.flush()?;
  info!("Wrote {count} cell boxes to {}", path.display());
  written.push(path);

  Ok(written)
}
