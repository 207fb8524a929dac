//! Append-only output sink for fetched record payloads.
//!
//! One sink per job. Payload bytes are appended and flushed before the job's
//! checkpoint advances, so an interrupted run can at worst re-append a
//! window that was already recorded, never lose one.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::harvest::HarvestError;

/// Append-only byte sink backed by a file.
#[derive(Debug)]
pub struct OutputSink {
    path: PathBuf,
    file: File,
}

impl OutputSink {
    /// Opens (creating if necessary) the sink file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Output`] when the file cannot be opened.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, HarvestError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| HarvestError::output(path.clone(), e))?;
        debug!(path = %path.display(), "output sink opened");
        Ok(Self { path, file })
    }

    /// Appends a window payload and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Output`] when the write or flush fails.
    pub async fn append(&mut self, payload: &[u8]) -> Result<(), HarvestError> {
        self.file
            .write_all(payload)
            .await
            .map_err(|e| HarvestError::output(self.path.clone(), e))?;
        self.file
            .flush()
            .await
            .map_err(|e| HarvestError::output(self.path.clone(), e))?;
        Ok(())
    }

    /// Returns the sink file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_writes_exact_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("terminase.fasta");

        let mut sink = OutputSink::open(&path).await.unwrap();
        sink.append(b">a\nMK\n").await.unwrap();
        sink.append(b">b\nVL\n").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b">a\nMK\n>b\nVL\n");
    }

    #[tokio::test]
    async fn test_reopen_appends_after_existing_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("portal.fasta");

        {
            let mut sink = OutputSink::open(&path).await.unwrap();
            sink.append(b">first\nAA\n").await.unwrap();
        }
        {
            let mut sink = OutputSink::open(&path).await.unwrap();
            sink.append(b">second\nCC\n").await.unwrap();
        }

        assert_eq!(std::fs::read(&path).unwrap(), b">first\nAA\n>second\nCC\n");
    }

    #[tokio::test]
    async fn test_open_missing_parent_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.fasta");

        let result = OutputSink::open(&path).await;
        assert!(matches!(result, Err(HarvestError::Output { .. })));
    }
}
