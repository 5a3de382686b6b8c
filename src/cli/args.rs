//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "keyfinder")]
#[command(about = "Estimate the musical key of audio files")]
#[command(version)]
pub struct Args {
    /// Input files or directories (searched recursively)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Print one JSON array of reports instead of text
    #[arg(long)]
    pub json: bool,

    /// Show runner-up keys and enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of runner-up keys listed in verbose mode
    #[arg(long, default_value_t = 3)]
    pub alternatives: usize,

    /// Feed decoded audio to the analyser in chunks of this many frames
    #[arg(long, value_name = "FRAMES")]
    pub chunk_frames: Option<usize>,

    /// Analysis parameters as JSON (missing fields use defaults)
    #[arg(short, long, value_name = "FILE", env = "KEYFINDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
