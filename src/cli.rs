//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use harvester_core::{
    DEFAULT_BATCH_SIZE, DEFAULT_WINDOW_PAUSE_SECS, ENTREZ_BASE_URL, MAX_FETCH_ATTEMPTS,
};

/// Resumable batch retrieval of protein records from NCBI Entrez.
///
/// Harvester reads a jobs file mapping job keys to search terms, opens an
/// Entrez history session per job, and pages the results into per-job FASTA
/// files, checkpointing progress after every window so an interrupted run
/// picks up where it left off.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the jobs file (search terms and per-job progress)
    #[arg(short = 'f', long, default_value = "terms.json")]
    pub config: PathBuf,

    /// Directory for per-job FASTA output files
    #[arg(short = 'o', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Report each job's total record count without fetching or mutating state
    #[arg(long)]
    pub dry_run: bool,

    /// Records fetched per window (1-10000)
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = clap::value_parser!(u64).range(1..=10_000))]
    pub batch_size: u64,

    /// Pause before each window fetch in seconds (0-3600)
    #[arg(short = 'l', long, default_value_t = DEFAULT_WINDOW_PAUSE_SECS, value_parser = clap::value_parser!(u64).range(0..=3600))]
    pub rate_limit: u64,

    /// Maximum fetch attempts per window (1-100)
    #[arg(short = 'r', long, default_value_t = MAX_FETCH_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_retries: u32,

    /// Contact e-mail sent with every Entrez request (falls back to NCBI_EMAIL)
    #[arg(long)]
    pub email: Option<String>,

    /// Entrez API key for the higher request-rate tier (falls back to NCBI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// E-utilities base URL (override for testing)
    #[arg(long, default_value = ENTREZ_BASE_URL)]
    pub base_url: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
