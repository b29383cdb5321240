//! Duskfall headless simulation runner.
//!
//! Usage: `duskfall-sim [path/to/duskfall.toml]`
//!
//! Set `DUSKFALL_LOG_FORMAT=json` for JSON log lines.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::Result;
use duskfall_sim::{SimConfig, Simulation};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("duskfall=info"))?;
    let json = std::env::var("DUSKFALL_LOG_FORMAT").is_ok_and(|v| v == "json");
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(fmt::layer))
        .init();

    info!("Duskfall sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load_from(path),
        None => SimConfig::load(),
    };

    let mut simulation = Simulation::new(config)?;
    let summary = simulation.run()?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!("Duskfall sim shutdown complete");
    Ok(())
}
