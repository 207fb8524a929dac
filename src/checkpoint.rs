//! Durable per-job progress state.
//!
//! Job configuration and checkpoint state share one JSON document: each job
//! key maps to its ordered search terms and a `completed` offset counting
//! records already fetched and durably appended. The whole mapping is
//! rewritten after every window, atomically (temp file + rename), so a crash
//! mid-write can never truncate the state.
//!
//! # File format
//!
//! ```json
//! {
//!   "terminase": { "labels": ["terminase", "large subunit"], "completed": 600 },
//!   "portal":    { "labels": ["portal"] }
//! }
//! ```
//!
//! A missing `completed` means the job has not started. Unknown fields are
//! ignored on load, so the file stays readable across versions and across
//! jobs added since the last write.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from loading or persisting the state file.
#[derive(Debug, Error)]
pub enum StateError {
    /// The state file could not be read or written.
    #[error("cannot access state file {path}: {source}")]
    Io {
        /// The file path involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The persisted structure could not be parsed. Never auto-repaired;
    /// surfaced immediately at startup.
    #[error("corrupt state file {path}: {source}")]
    Corrupt {
        /// The file that failed to parse.
        path: PathBuf,
        /// The parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory mapping could not be serialized.
    #[error("cannot encode state for {path}: {source}")]
    Encode {
        /// The target file path.
        path: PathBuf,
        /// The serialization failure.
        #[source]
        source: serde_json::Error,
    },
}

/// One job's configuration and progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobState {
    /// Ordered search terms for this job.
    pub labels: Vec<String>,

    /// Records already fetched and durably appended. Monotonically
    /// non-decreasing; may overshoot the true result count after the final
    /// window, which resume checks tolerate by design.
    #[serde(default)]
    pub completed: u64,
}

impl JobState {
    /// Creates a fresh job with no progress.
    #[must_use]
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            completed: 0,
        }
    }
}

/// An updated progress cursor handed back by the fetch stage after each
/// window. The job driver owns writing it into the [`CheckpointStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointRecord {
    /// New value of the job's completed-records offset.
    pub completed: u64,
}

/// Store for the shared jobs/checkpoint file.
///
/// No locking: jobs run sequentially in one process, and saves are atomic
/// with respect to process crash.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    /// Creates a store over the given state file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the state file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the full job mapping, in sorted key order.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] when the file cannot be read and
    /// [`StateError::Corrupt`] when it cannot be parsed.
    pub fn load(&self) -> Result<BTreeMap<String, JobState>, StateError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| StateError::Io {
            path: self.path.clone(),
            source,
        })?;
        let jobs: BTreeMap<String, JobState> =
            serde_json::from_str(&raw).map_err(|source| StateError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), jobs = jobs.len(), "loaded state file");
        Ok(jobs)
    }

    /// Persists the full job mapping with a full rewrite.
    ///
    /// The mapping is serialized to a sibling temp file and renamed over the
    /// target, so a crash mid-write leaves the previous state intact.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Encode`] when serialization fails and
    /// [`StateError::Io`] when the temp file cannot be written or renamed.
    pub fn save(&self, jobs: &BTreeMap<String, JobState>) -> Result<(), StateError> {
        let encoded = serde_json::to_vec_pretty(jobs).map_err(|source| StateError::Encode {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.temp_path();
        std::fs::write(&tmp_path, &encoded).map_err(|source| StateError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| StateError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), jobs = jobs.len(), "state file rewritten");
        Ok(())
    }

    /// Sibling temp path used for atomic rewrites.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
