//! Harvester Core Library
//!
//! This library retrieves large protein-record result sets from NCBI Entrez
//! under its rate limit, persisting per-job progress so an interrupted run
//! resumes instead of restarting.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`checkpoint`] - Durable per-job progress state (shared jobs file)
//! - [`entrez`] - Query shaping, the record-service trait, and the HTTP client
//! - [`harvest`] - Windowing, retry classification, and the fetch engine
//! - [`driver`] - Sequential job orchestration and reporting
//! - [`output`] - Append-only per-job payload sinks

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod checkpoint;
pub mod driver;
pub mod entrez;
pub mod harvest;
pub mod output;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use checkpoint::{CheckpointRecord, CheckpointStore, JobState, StateError};
pub use driver::{JobDriver, JobReport, RunReport};
pub use entrez::{
    Credentials, ENTREZ_BASE_URL, EntrezClient, FetchError, RecordService, SearchError,
    SearchSession, build_query,
};
pub use harvest::{
    DEFAULT_BATCH_SIZE, DEFAULT_WINDOW_PAUSE_SECS, FailureClass, HarvestError, JobStats,
    MALFORMED_RETRY_DELAY, MAX_FETCH_ATTEMPTS, PageFetcher, RetryPolicy, TRANSIENT_BASE_DELAY,
    classify_fetch_error,
};
pub use output::OutputSink;
