//! Game of Life CLI - Open a window, or run headless and print statistics.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use gpu_life::{
    app::{self, LifeDemo},
    compute::{
        LifeGrid,
        gpu::{GpuContext, GpuLife},
    },
    schema::{LifeConfig, Pattern},
};

/// Conway's Game of Life simulated in a compute shader.
#[derive(Debug, Parser)]
#[command(name = "life", version)]
struct Args {
    /// JSON configuration file. Missing fields take their defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start from the 512x512, 200 ms preset.
    #[arg(long, conflicts_with = "config")]
    large: bool,

    /// Grid edge length in cells.
    #[arg(long, value_name = "N")]
    grid_size: Option<u32>,

    /// Milliseconds between ticks.
    #[arg(long, value_name = "N")]
    interval_ms: Option<u64>,

    /// Fixed RNG seed for the random initial population.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Run STEPS ticks without a window and print population statistics.
    #[arg(long, value_name = "STEPS")]
    headless: Option<u64>,

    /// With --headless, also step the CPU reference and compare.
    #[arg(long, requires = "headless")]
    verify: bool,

    /// Print the resolved configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() {
    app::init_logging();
    let args = Args::parse();

    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args)?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match args.headless {
        Some(steps) => run_headless(config, steps, args.verify),
        None => Ok(app::run::<LifeDemo>(config)?),
    }
}

fn resolve_config(args: &Args) -> Result<LifeConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => LifeConfig::from_json_file(path)?,
        None if args.large => LifeConfig::large(),
        None => LifeConfig::default(),
    };

    if let Some(grid_size) = args.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.update_interval_ms = interval_ms;
    }
    if let Some(value) = args.seed {
        match &mut config.seed.pattern {
            Pattern::Random { seed, .. } => *seed = Some(value),
            _ => log::warn!("--seed ignored: the configured pattern is not random"),
        }
    }

    config.validate()?;
    Ok(config)
}

fn run_headless(
    config: LifeConfig,
    steps: u64,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = pollster::block_on(GpuContext::headless())?;
    let cells = config.seed.generate(config.grid_size);
    let grid_size = config.grid_size;

    println!("Game of Life (headless)");
    println!("=======================");
    println!("Grid: {0}x{0}, workgroup {1}", grid_size, config.workgroup_size);
    println!("Steps: {steps}");

    let mut life = GpuLife::with_cells(&ctx, config, wgpu::TextureFormat::Rgba8Unorm, &cells)?;
    println!("Dispatch: {0}x{0} workgroups", life.workgroups());

    let start = Instant::now();
    life.run(steps);
    let stats = life.stats()?;
    let elapsed = start.elapsed();

    println!();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!(
        "Completed in {:.2?} ({:.1} steps/s)",
        elapsed,
        steps as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );

    if verify {
        let mut reference = LifeGrid::from_cells(grid_size, cells);
        reference.run(steps);
        let gpu_cells = life.read_cells()?;
        let mismatches = gpu_cells
            .iter()
            .zip(reference.cells())
            .filter(|(a, b)| a != b)
            .count();
        if mismatches > 0 {
            return Err(format!("GPU and CPU grids differ in {mismatches} cells").into());
        }
        println!("Verified against CPU reference");
    }

    Ok(())
}
