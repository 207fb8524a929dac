//! Run-level error taxonomy for the harvest engine and job driver.

use std::path::PathBuf;

use thiserror::Error;

use crate::checkpoint::StateError;
use crate::entrez::{FetchError, SearchError};

/// Errors that abort a harvest run.
///
/// Per-window fetch failures are absorbed by the retry loop and never appear
/// here; only budget exhaustion, search failure, and local persistence
/// failures escalate to run level.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// A job's search could not be completed. Fail-fast: no later job is
    /// attempted.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// One window failed every attempt in the budget. Fatal for the whole
    /// run, since repeated failure usually indicates a systemic problem that
    /// would recur for every remaining job.
    #[error("retries exhausted for job {job} at offset {start} after {attempts} attempts")]
    RetriesExhausted {
        /// The job whose window could not be fetched.
        job: String,
        /// Start offset of the failing window.
        start: u64,
        /// Number of attempts made.
        attempts: u32,
        /// The last failure observed.
        #[source]
        source: FetchError,
    },

    /// Appending to a job's output file failed.
    #[error("failed writing output to {path}: {source}")]
    Output {
        /// The output file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Loading or persisting checkpoint state failed.
    #[error("checkpoint state error: {0}")]
    State(#[from] StateError),

    /// The configured batch size is unusable.
    #[error("invalid batch size {value}: must be at least 1")]
    InvalidBatchSize {
        /// The invalid value that was provided.
        value: u64,
    },
}

impl HarvestError {
    /// Creates a retries-exhausted error for a window.
    pub fn retries_exhausted(
        job: impl Into<String>,
        start: u64,
        attempts: u32,
        source: FetchError,
    ) -> Self {
        Self::RetriesExhausted {
            job: job.into(),
            start,
            attempts,
            source,
        }
    }

    /// Creates an output-write error.
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}
