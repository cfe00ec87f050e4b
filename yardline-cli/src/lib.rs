//! Command-line interface for Yardline route planning.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

mod error;
mod fs;
mod geocode;
mod optimize;
mod plan;

pub use error::CliError;

use geocode::{GeocodeArgs, run_geocode};
use optimize::{OptimizeArgs, run_optimize};

const ARG_PLAN: &str = "plan";
const ARG_MATRIX: &str = "matrix";
const ARG_MAPBOX_TOKEN: &str = "mapbox-token";
const ARG_MAPBOX_BASE_URL: &str = "mapbox-base-url";
const ARG_MAPBOX_PROFILE: &str = "mapbox-profile";
const ARG_MAX_COORDS_PER_REQUEST: &str = "max-coords-per-request";
const ARG_MAX_CONCURRENT_REQUESTS: &str = "max-concurrent-requests";
const ARG_TIME_LIMIT_SECS: &str = "time-limit-secs";
const ARG_MAX_GENERATIONS: &str = "max-generations";
const ARG_ADDRESS: &str = "address";
const ENV_PLAN: &str = "YARDLINE_CMDS_OPTIMIZE_PLAN_PATH";
const ENV_ADDRESS: &str = "YARDLINE_CMDS_GEOCODE_ADDRESS";

/// Run the Yardline CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    match cli.command {
        Command::Optimize(args) => run_optimize(args),
        Command::Geocode(args) => run_geocode(args),
    }
}

/// Send `tracing` events, and `log` records from the libraries, to stderr.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    // Fails only when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "yardline",
    about = "Plan profit-maximising multi-day routes for field service crews",
    version
)]
struct Cli {
    /// Log debug detail to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan routes for the stops in a plan file.
    Optimize(OptimizeArgs),
    /// Look up the coordinate of an address.
    Geocode(GeocodeArgs),
}

#[cfg(test)]
mod tests;
