//! Dust grid builder.
//!
//! Builds an adaptive octree dust grid from a TOML description, prints the
//! construction statistics, optionally writes plot files and traces rays.
//!
//! ```text
//! dust_grid --config plummer.toml --ray -3,0.1,0,1,0,0
//! ```

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dust_grid::{plot, DustGrid, RandomStream};
use glam::DVec3;

use config::Config;

/// Adaptive octree dust grid builder.
#[derive(Parser, Debug)]
#[command(name = "dust_grid")]
#[command(about = "Builds an adaptive dust grid and exports plot data")]
struct Args {
	/// Path to configuration TOML file.
	#[arg(short, long)]
	config: PathBuf,

	/// Output directory for plot files (overrides the config).
	#[arg(short, long)]
	output_dir: Option<PathBuf>,

	/// Random seed (overrides the config).
	#[arg(short, long)]
	seed: Option<u64>,

	/// Ray to trace, as ox,oy,oz,dx,dy,dz. May be repeated.
	#[arg(long, value_parser = parse_ray)]
	ray: Vec<Ray>,
}

/// Origin and direction of a traced ray.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Ray {
	origin: DVec3,
	direction: DVec3,
}

fn parse_ray(text: &str) -> Result<Ray, String> {
	let values = text
		.split(',')
		.map(|part| part.trim().parse::<f64>())
		.collect::<Result<Vec<_>, _>>()
		.map_err(|e| format!("invalid number in ray '{text}': {e}"))?;
	if values.len() != 6 {
		return Err(format!("expected 6 comma-separated values, got {}", values.len()));
	}
	let direction = DVec3::new(values[3], values[4], values[5]);
	if direction == DVec3::ZERO {
		return Err("ray direction must not be zero".to_string());
	}
	Ok(Ray {
		origin: DVec3::new(values[0], values[1], values[2]),
		direction,
	})
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	println!("Loading config from: {}", args.config.display());
	let config = Config::load(&args.config)?;

	let grid_config = config.grid_config()?;
	let distribution = config.distribution.build();
	let seed = args.seed.unwrap_or(config.seed);
	let random = RandomStream::new(seed, grid_config.random_slots());

	println!(
		"Building {} grid for a {} distribution (levels {}..{}, seed {seed})",
		grid_config.search_method,
		config.distribution.name(),
		grid_config.min_level,
		grid_config.max_level
	);

	let grid = DustGrid::build(grid_config, distribution.as_ref(), &random)
		.context("Building dust grid")?;
	print_stats(&grid);

	if config.write_plots {
		let output_dir = args
			.output_dir
			.unwrap_or_else(|| PathBuf::from(&config.output_dir));
		let files = plot::write_all(&grid, &output_dir)
			.with_context(|| format!("Writing plot files to {}", output_dir.display()))?;
		println!("\nPlot files:");
		for file in files {
			println!("  ✓ {}", file.display());
		}
	}

	for ray in &args.ray {
		trace(&grid, ray);
	}

	Ok(())
}

fn print_stats(grid: &DustGrid) {
	let stats = grid.stats();
	println!("\nGrid statistics:");
	println!("  cells:             {}", grid.number_of_cells());
	println!("  nodes:             {}", stats.node_count);
	println!("  subdivisions:      {}", stats.total_subdivisions());
	println!(
		"  evaluations:       {} exact, {} sampled",
		stats.exact_evaluations, stats.sampled_evaluations
	);
	println!("  construction time: {:.1} ms", stats.elapsed_us as f64 / 1000.0);
	for (level, count) in stats.cells_per_level.iter().enumerate() {
		if *count > 0 {
			println!("  level {level:>2}: {count} cells");
		}
	}
}

fn trace(grid: &DustGrid, ray: &Ray) {
	let path = grid.path(ray.origin, ray.direction);
	println!("\nRay from {} along {}:", ray.origin, path.direction());
	if path.is_empty() {
		println!("  misses the grid");
		return;
	}
	println!(
		"  enters at distance {:.6}, crosses {} cells, length {:.6}",
		path.entry_distance(),
		path.len(),
		path.total_length()
	);
	for (segment, travelled) in path.segments().iter().zip(path.cumulative()) {
		println!(
			"  cell {:>8}  ds = {:.6}  s = {:.6}",
			segment.cell, segment.length, travelled
		);
	}
}
