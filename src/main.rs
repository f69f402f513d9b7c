//! Park Steward - Entry Point
//!
//! Runs the staff controller against a seeded sandbox park and prints the
//! final statistics snapshot as JSON.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use park_steward::core::error::Result;
use park_steward::core::StaffConfig;
use park_steward::sandbox::SandboxPark;
use park_steward::simulation::tick::StaffManager;
use park_steward::world::NetworkMode;

/// Park Steward - autonomous hiring and patrol zoning
#[derive(Parser, Debug)]
#[command(name = "park-steward")]
#[command(about = "Run the staff controller against a generated park")]
struct Args {
    /// Ticks to simulate
    #[arg(long, default_value_t = 5_000)]
    ticks: u64,

    /// Park width in tiles
    #[arg(long, default_value_t = 96)]
    width: i32,

    /// Park height in tiles
    #[arg(long, default_value_t = 96)]
    height: i32,

    /// Random seed for the generated park
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// TOML configuration file (defaults when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run as a read-only observer; nothing is ever dispatched
    #[arg(long, default_value_t = false)]
    observer: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("park_steward=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => StaffConfig::load(path)?,
        None => StaffConfig::default(),
    };

    let mut park = SandboxPark::generate(args.seed, args.width, args.height);
    if args.observer {
        park.set_mode(NetworkMode::Client);
    }

    let mut manager = StaffManager::new(config)?;
    tracing::info!(
        ticks = args.ticks,
        width = args.width,
        height = args.height,
        seed = args.seed,
        "Park Steward starting"
    );

    for _ in 0..args.ticks {
        park.advance();
        manager.on_tick(&mut park);
    }

    let snapshot = manager.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
