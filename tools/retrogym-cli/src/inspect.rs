//! Inspect command - print a replay journal
//!
//! Text output lists the header followed by one line per tick; `--json` emits
//! the same data as a single JSON document.

use anyhow::{Context, Result};
use clap::Args;
use retrogym_core::ButtonMask;
use retrogym_core::replay::{self, Journal, JournalHeader};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Journal file (.rgj)
    pub journal: PathBuf,

    /// Only show the first N ticks
    #[arg(long)]
    pub frames: Option<u64>,

    /// Button names in core order, comma-separated (e.g. "B,A,MODE,START")
    #[arg(long, value_delimiter = ',')]
    pub buttons: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct JournalReport<'a> {
    header: &'a JournalHeader,
    finished: bool,
    initial_state_bytes: Option<usize>,
    ticks: Vec<TickReport>,
}

#[derive(Debug, PartialEq, Serialize)]
struct TickReport {
    tick: u64,
    players: Vec<PlayerReport>,
}

#[derive(Debug, PartialEq, Serialize)]
struct PlayerReport {
    bits: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pressed: Vec<String>,
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let journal = replay::load(&args.journal)
        .with_context(|| format!("Failed to read journal: {}", args.journal.display()))?;

    if !args.buttons.is_empty() && args.buttons.len() != usize::from(journal.header.num_buttons) {
        tracing::warn!(
            given = args.buttons.len(),
            expected = journal.header.num_buttons,
            "button name count does not match journal"
        );
    }

    let report = build_report(&journal, &args.buttons, args.frames);

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode JSON")?;
        println!("{json}");
        return Ok(());
    }

    let header = report.header;
    println!("=== Journal ===");
    println!("  File: {}", args.journal.display());
    println!("  Game: {}", header.game_id);
    println!("  Players: {}", header.player_count);
    println!("  Buttons: {}", header.num_buttons);
    println!(
        "  Ticks: {}{}",
        journal.ticks.tick_count(),
        if report.finished { "" } else { " (unfinished)" }
    );
    match report.initial_state_bytes {
        Some(len) => println!("  Initial state: {len} bytes"),
        None => println!("  Initial state: none"),
    }
    println!();

    let digits = header.mask_bytes() * 2;
    for tick in &report.ticks {
        println!("{}", format_tick(tick, digits));
    }

    let shown = report.ticks.len() as u64;
    if shown < journal.ticks.tick_count() {
        println!("... {} more ticks", journal.ticks.tick_count() - shown);
    }

    Ok(())
}

fn build_report<'a>(
    journal: &'a Journal,
    names: &[String],
    frames: Option<u64>,
) -> JournalReport<'a> {
    let limit = frames.unwrap_or(u64::MAX);
    let ticks = journal
        .ticks
        .iter()
        .zip(0u64..)
        .take_while(|(_, tick)| *tick < limit)
        .map(|(masks, tick)| TickReport {
            tick,
            players: masks.iter().map(|mask| player_report(mask, names)).collect(),
        })
        .collect();

    JournalReport {
        header: &journal.header,
        finished: journal.finished,
        initial_state_bytes: journal.initial_state.as_ref().map(Vec::len),
        ticks,
    }
}

fn player_report(mask: &ButtonMask, names: &[String]) -> PlayerReport {
    PlayerReport {
        bits: mask.bits(),
        pressed: mask.names(names).into_iter().map(str::to_string).collect(),
    }
}

fn format_tick(tick: &TickReport, digits: usize) -> String {
    let mut line = format!("{:>8}", tick.tick);
    for (player, report) in tick.players.iter().enumerate() {
        line.push_str(&format!("  P{} {:#0width$x}", player + 1, report.bits, width = digits + 2));
        if !report.pressed.is_empty() {
            line.push_str(&format!(" [{}]", report.pressed.join(" ")));
        }
    }
    line
}
