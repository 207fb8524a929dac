//! CLI entry point for the harvester tool.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use harvester_core::{
    CheckpointStore, Credentials, EntrezClient, JobDriver, MALFORMED_RETRY_DELAY, PageFetcher,
    RetryPolicy, TRANSIENT_BASE_DELAY,
};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Harvester starting");

    // Resolve Entrez identification: flags win over environment.
    let email = args
        .email
        .clone()
        .or_else(|| std::env::var("NCBI_EMAIL").ok())
        .context("an Entrez contact e-mail is required: pass --email or set NCBI_EMAIL")?;
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("NCBI_API_KEY").ok());
    let credentials = Credentials::new(email, api_key);

    let client = EntrezClient::with_base_url(credentials, &args.base_url);
    let store = CheckpointStore::new(&args.config);

    let retry = RetryPolicy::new(args.max_retries, TRANSIENT_BASE_DELAY, MALFORMED_RETRY_DELAY);
    let fetcher = PageFetcher::new(args.batch_size, Duration::from_secs(args.rate_limit), retry)?;

    let driver = JobDriver::new(&client, &store, fetcher, &args.output_dir);
    let report = driver.run(args.dry_run).await?;

    if args.dry_run {
        for job in &report.jobs {
            println!("{}\t{}", job.key, job.total);
        }
    }

    info!(
        jobs = report.jobs.len(),
        windows = report.windows_fetched(),
        bytes = report.bytes_appended(),
        "Harvest complete"
    );

    Ok(())
}
