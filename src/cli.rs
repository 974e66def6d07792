//! Command-line interface for Spellforge
//!
//! Supports both graphical (default) and headless modes.

use clap::Parser;
use std::path::PathBuf;

/// Spell-crafting action RPG prototype
#[derive(Parser, Debug)]
#[command(name = "spellforge")]
#[command(about = "Spell-crafting action RPG prototype")]
#[command(version)]
pub struct Args {
    /// Run in headless mode with the specified JSON config file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Output path for the run log (headless mode only)
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum run duration in seconds (headless mode only)
    #[arg(long, value_name = "SECONDS")]
    pub max_duration: Option<f32>,

    /// Random seed for deterministic simulation (headless mode only)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
