//! Resolve command - show what an environment config would load
//!
//! Performs the same lookups as environment construction (ROM, initial state,
//! info and scenario definitions) without creating an emulator.

use anyhow::{Context, Result};
use clap::Args;
use retrogym_core::data::{self, DataStore, IntegrationDir};
use retrogym_core::{EnvConfig, StateSelection};
use std::path::{Path, PathBuf};

/// Arguments for the resolve command
#[derive(Args)]
pub struct ResolveArgs {
    /// Environment config file (TOML)
    pub config: PathBuf,

    /// Integration data root (defaults to the platform data directory)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Paths a config resolves to
#[derive(Debug)]
struct Resolution {
    rom: PathBuf,
    state: Option<PathBuf>,
    info: PathBuf,
    scenario: PathBuf,
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs) -> Result<()> {
    let config = EnvConfig::load(&args.config)
        .with_context(|| format!("Failed to load config: {}", args.config.display()))?;

    let root = match args.data_dir {
        Some(dir) => dir,
        None => IntegrationDir::default_root().context("No platform data directory available")?,
    };
    let store = IntegrationDir::new(root);
    let resolution = resolve(&config, &store)?;

    println!("=== Environment ===");
    println!("  Game: {}", config.game);
    println!("  Players: {}", config.players);
    println!("  Actions: {:?}", config.actions);
    println!("  Observations: {}", config.observations.as_str());
    println!("  Data: {}", store.root().display());
    println!();
    println!("  ROM: {}", resolution.rom.display());
    match &resolution.state {
        Some(path) => println!("  State: {}{}", path.display(), missing_marker(path)),
        None => println!("  State: none (power-on)"),
    }
    println!("  Info: {}{}", resolution.info.display(), missing_marker(&resolution.info));
    println!(
        "  Scenario: {}{}",
        resolution.scenario.display(),
        missing_marker(&resolution.scenario)
    );
    if let Some(dir) = &config.record {
        println!("  Recording to: {}", dir.display());
    }

    Ok(())
}

fn resolve<D: DataStore>(config: &EnvConfig, store: &D) -> Result<Resolution> {
    let game = config.game.as_str();
    let rom = store.rom_path(game)?;

    let state_name = match &config.state {
        StateSelection::None => None,
        StateSelection::Default => data::default_state(store, game, config.players),
        StateSelection::Named(name) => Some(name.clone()),
    };
    let state = state_name.map(|name| store.file_path(game, &data::state_file_name(&name)));

    Ok(Resolution {
        rom,
        state,
        info: data::resolve_definition(store, game, &config.info),
        scenario: data::resolve_definition(store, game, &config.scenario),
    })
}

fn missing_marker(path: &Path) -> &'static str {
    if path.exists() { "" } else { " (missing)" }
}
