//! Configuration parsing for dust grid runs.

use std::path::Path;

use anyhow::{Context, Result};
use dust_grid::distributions::{ExponentialDisk, PlummerSphere, UniformBox};
use dust_grid::{Distribution, Extent, GridConfig, SearchMethod};
use glam::DVec3;
use serde::Deserialize;

/// Root configuration of one run.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Directory for plot files, relative to the working directory.
	#[serde(default = "default_output_dir")]
	pub output_dir: String,
	/// Write the plane cuts and the 3D cell dump.
	#[serde(default)]
	pub write_plots: bool,
	/// Base seed of the random stream.
	#[serde(default)]
	pub seed: u64,
	/// Grid settings.
	pub grid: GridSection,
	/// Density field the grid adapts to.
	pub distribution: DistributionConfig,
}

/// The `[grid]` table.
#[derive(Debug, Deserialize)]
pub struct GridSection {
	/// Half-widths of the grid box [x, y, z].
	pub half_widths: [f64; 3],
	#[serde(default = "default_min_level")]
	pub min_level: u32,
	#[serde(default = "default_max_level")]
	pub max_level: u32,
	/// "top-down", "neighbor" or "bookkeeping".
	#[serde(default = "default_search_method")]
	pub search_method: String,
	#[serde(default = "default_sample_count")]
	pub sample_count: usize,
	pub max_mass_fraction: Option<f64>,
	pub max_optical_depth: Option<f64>,
	pub max_density_dispersion: Option<f64>,
	#[serde(default = "default_reference_opacity")]
	pub reference_opacity: f64,
	#[serde(default)]
	pub barycentric: bool,
	#[serde(default = "default_sampling_threads")]
	pub sampling_threads: usize,
}

/// The `[distribution]` table, selected by `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DistributionConfig {
	/// Constant density inside a centered box.
	Uniform {
		half_widths: [f64; 3],
		#[serde(default = "default_total_mass")]
		total_mass: f64,
	},
	/// Plummer sphere.
	Plummer {
		scale_length: f64,
		#[serde(default = "default_total_mass")]
		total_mass: f64,
	},
	/// Double-exponential disk in the xy plane.
	Disk {
		scale_length: f64,
		scale_height: f64,
		#[serde(default = "default_total_mass")]
		total_mass: f64,
	},
}

fn default_output_dir() -> String {
	"dust_grid_output".to_string()
}

fn default_min_level() -> u32 {
	2
}

fn default_max_level() -> u32 {
	6
}

fn default_search_method() -> String {
	SearchMethod::default().to_string()
}

fn default_sample_count() -> usize {
	100
}

fn default_reference_opacity() -> f64 {
	1.0
}

fn default_sampling_threads() -> usize {
	4
}

fn default_total_mass() -> f64 {
	1.0
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		Self::parse(&content)
	}

	/// Parse and validate configuration text.
	pub fn parse(content: &str) -> Result<Self> {
		let config: Config = toml::from_str(content).with_context(|| "Failed to parse config TOML")?;

		config.distribution.check()?;
		let grid = config.grid_config()?;
		grid
			.validate(config.distribution.build().dimension())
			.context("Invalid [grid] table")?;

		Ok(config)
	}

	/// Grid configuration described by the `[grid]` table.
	pub fn grid_config(&self) -> Result<GridConfig> {
		let grid = &self.grid;
		let search_method: SearchMethod = grid
			.search_method
			.parse()
			.with_context(|| format!("Invalid search_method '{}'", grid.search_method))?;

		Ok(GridConfig {
			half_widths: DVec3::from_array(grid.half_widths),
			min_level: grid.min_level,
			max_level: grid.max_level,
			search_method,
			sample_count: grid.sample_count,
			max_mass_fraction: grid.max_mass_fraction,
			max_optical_depth: grid.max_optical_depth,
			max_density_dispersion: grid.max_density_dispersion,
			reference_opacity: grid.reference_opacity,
			barycentric: grid.barycentric,
			sampling_threads: grid.sampling_threads,
		})
	}
}

impl DistributionConfig {
	/// Reject parameters the distributions cannot evaluate.
	fn check(&self) -> Result<()> {
		let positive = |name: &str, value: f64| -> Result<()> {
			if !(value > 0.0 && value.is_finite()) {
				anyhow::bail!("distribution {name} must be positive, got {value}");
			}
			Ok(())
		};
		match *self {
			DistributionConfig::Uniform {
				half_widths,
				total_mass,
			} => {
				for h in half_widths {
					positive("half_widths", h)?;
				}
				positive("total_mass", total_mass)
			}
			DistributionConfig::Plummer {
				scale_length,
				total_mass,
			} => {
				positive("scale_length", scale_length)?;
				positive("total_mass", total_mass)
			}
			DistributionConfig::Disk {
				scale_length,
				scale_height,
				total_mass,
			} => {
				positive("scale_length", scale_length)?;
				positive("scale_height", scale_height)?;
				positive("total_mass", total_mass)
			}
		}
	}

	/// Instantiate the density field.
	pub fn build(&self) -> Box<dyn Distribution> {
		match *self {
			DistributionConfig::Uniform {
				half_widths,
				total_mass,
			} => Box::new(UniformBox::new(
				Extent::from_center_half_extents(DVec3::ZERO, DVec3::from_array(half_widths)),
				total_mass,
			)),
			DistributionConfig::Plummer {
				scale_length,
				total_mass,
			} => Box::new(PlummerSphere::new(scale_length, total_mass)),
			DistributionConfig::Disk {
				scale_length,
				scale_height,
				total_mass,
			} => Box::new(ExponentialDisk::new(scale_length, scale_height, total_mass)),
		}
	}

	/// Short name for log output.
	pub fn name(&self) -> &'static str {
		match self {
			DistributionConfig::Uniform { .. } => "uniform",
			DistributionConfig::Plummer { .. } => "plummer",
			DistributionConfig::Disk { .. } => "disk",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const PLUMMER: &str = r#"
		write_plots = true
		seed = 7

		[grid]
		half_widths = [2.0, 2.0, 2.0]
		max_level = 5
		search_method = "bookkeeping"
		max_mass_fraction = 0.001

		[distribution]
		kind = "plummer"
		scale_length = 0.5
	"#;

	#[test]
	fn test_parse_with_defaults() {
		let config = Config::parse(PLUMMER).unwrap();
		assert!(config.write_plots);
		assert_eq!(config.seed, 7);
		assert_eq!(config.output_dir, "dust_grid_output");

		let grid = config.grid_config().unwrap();
		assert_eq!(grid.half_widths, DVec3::splat(2.0));
		assert_eq!(grid.min_level, 2);
		assert_eq!(grid.max_level, 5);
		assert_eq!(grid.search_method, SearchMethod::Bookkeeping);
		assert_eq!(grid.max_mass_fraction, Some(0.001));
		assert_eq!(grid.max_optical_depth, None);
		assert_eq!(grid.sampling_threads, 4);

		assert_eq!(config.distribution.name(), "plummer");
		let distribution = config.distribution.build();
		assert_eq!(distribution.total_mass(), 1.0);
		assert_eq!(distribution.dimension(), 1);
	}

	#[test]
	fn test_distribution_kinds() {
		let uniform: DistributionConfig =
			toml::from_str("kind = \"uniform\"\nhalf_widths = [1.0, 1.0, 0.5]\ntotal_mass = 3.0").unwrap();
		assert!(uniform.build().as_mass_in_box().is_some());
		assert_eq!(uniform.build().total_mass(), 3.0);

		let disk: DistributionConfig =
			toml::from_str("kind = \"disk\"\nscale_length = 1.0\nscale_height = 0.1").unwrap();
		assert_eq!(disk.name(), "disk");
		assert_eq!(disk.build().dimension(), 2);

		assert!(toml::from_str::<DistributionConfig>("kind = \"spiral\"").is_err());
	}

	#[test]
	fn test_rejects_invalid_values() {
		let bad_method = PLUMMER.replace("bookkeeping", "zigzag");
		let err = Config::parse(&bad_method).unwrap_err();
		assert!(format!("{err:#}").contains("zigzag"));

		let bad_levels = PLUMMER.replace("max_level = 5", "max_level = 1");
		assert!(Config::parse(&bad_levels).is_err());

		let bad_scale = PLUMMER.replace("scale_length = 0.5", "scale_length = -0.5");
		let err = Config::parse(&bad_scale).unwrap_err();
		assert!(err.to_string().contains("scale_length"));
	}

	#[test]
	fn test_missing_grid_table() {
		let err = Config::parse("[distribution]\nkind = \"plummer\"\nscale_length = 1.0").unwrap_err();
		assert!(format!("{err:#}").contains("grid"));
	}
}
