//! Textured cube CLI - Open a window with a spinning, textured cube.

use std::path::PathBuf;

use clap::Parser;

use gpu_life::{
    app::{self, CubeDemo, CubeSetup},
    schema::CubeConfig,
};

/// A rotating textured cube rendered with a depth buffer.
#[derive(Debug, Parser)]
#[command(name = "cube", version)]
struct Args {
    /// JSON configuration file. Missing fields take their defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// PNG or JPEG image to map onto each face. Defaults to a checkerboard.
    #[arg(long, value_name = "FILE")]
    texture: Option<PathBuf>,

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
    let mut config = match &args.config {
        Some(path) => CubeConfig::from_json_file(path)?,
        None => CubeConfig::default(),
    };
    if args.texture.is_some() {
        config.texture_path = args.texture;
    }
    config.validate()?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let setup = CubeSetup::load(config)?;
    app::run::<CubeDemo>(setup)?;
    Ok(())
}
