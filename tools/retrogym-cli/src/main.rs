//! Retrogym CLI - Journal and configuration tooling
//!
//! # Commands
//!
//! - `retrogym inspect` - Print a replay journal's header and per-tick masks
//! - `retrogym resolve` - Resolve an environment config against integration data
//!
//! # Usage
//!
//! ```bash
//! # Show the first 100 ticks with Genesis button names
//! retrogym inspect Airstriker-Genesis-Level1-000000.rgj --frames 100 \
//!     --buttons B,A,MODE,START,UP,DOWN,LEFT,RIGHT,C,Y,X,Z
//!
//! # Export a whole journal as JSON
//! retrogym inspect episode.rgj --json > episode.json
//!
//! # Check which ROM, state and definitions a config would use
//! retrogym resolve env.toml --data-dir ./integrations
//! ```

mod inspect;
mod resolve;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Retrogym CLI - Journal and configuration tooling
#[derive(Parser)]
#[command(name = "retrogym")]
#[command(about = "Journal and configuration tooling for retrogym environments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a replay journal's header and per-tick masks
    Inspect(inspect::InspectArgs),

    /// Resolve ROM, state and definition paths for an environment config
    Resolve(resolve::ResolveArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Resolve(args) => resolve::execute(args),
    }
}
