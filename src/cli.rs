//! Command-line interface for SquadSim
//!
//! The simulator is headless-only: point it at a JSON battle config and
//! it runs the battle to completion.

use clap::Parser;
use std::path::PathBuf;

/// Party-versus-party battle simulator
#[derive(Parser, Debug)]
#[command(name = "squadsim")]
#[command(about = "Party-versus-party battle simulator")]
#[command(version)]
pub struct Args {
    /// JSON battle configuration file
    #[arg(value_name = "CONFIG_FILE")]
    pub config: PathBuf,

    /// Output path for the battle log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Override the maximum battle duration in seconds
    #[arg(long, value_name = "SECONDS")]
    pub max_duration: Option<f32>,

    /// Override the random seed for a reproducible battle
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
