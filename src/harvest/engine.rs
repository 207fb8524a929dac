//! Paginated fetch engine: the per-job state machine.
//!
//! Given an open [`SearchSession`] and a resume offset, the engine walks
//! fixed-size windows, pausing before each fetch, retrying failures per
//! [`RetryPolicy`], appending each window's payload to the job's sink, and
//! handing an updated [`CheckpointRecord`] to the caller after every
//! durably-written window.
//!
//! # Ordering invariant
//!
//! Append happens before the checkpoint advances. An interruption between
//! the two re-fetches and re-appends one window on resume; the reverse order
//! could silently lose a window.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::checkpoint::{CheckpointRecord, StateError};
use crate::entrez::{RecordService, SearchSession};
use crate::output::OutputSink;

use super::error::HarvestError;
use super::retry::{FailureClass, RetryPolicy, classify_fetch_error};
use super::window::window_starts;

/// Per-job counters reported back to the driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobStats {
    /// Windows fetched and appended during this run.
    pub windows_fetched: u64,
    /// Payload bytes appended during this run.
    pub bytes_appended: u64,
}

/// Sequential window fetcher with retry and checkpoint reporting.
///
/// One fetcher serves every job in a run; all per-window state (the attempt
/// counter in particular) is local to each window.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    /// Records requested per window.
    batch_size: u64,
    /// Unconditional pause before every window fetch.
    window_pause: Duration,
    /// Per-window retry configuration.
    retry: RetryPolicy,
}

impl PageFetcher {
    /// Creates a fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidBatchSize`] when `batch_size` is zero.
    pub fn new(
        batch_size: u64,
        window_pause: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, HarvestError> {
        if batch_size == 0 {
            return Err(HarvestError::InvalidBatchSize { value: batch_size });
        }
        Ok(Self {
            batch_size,
            window_pause,
            retry,
        })
    }

    /// Returns the configured batch size.
    #[must_use]
    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Fetches every remaining window of a job.
    ///
    /// `on_window_complete` receives the updated checkpoint after each
    /// window's payload has been appended and flushed; the caller owns
    /// persisting it. The recorded offset is `start + batch_size` even when
    /// that overshoots the true total on the final window — the resume check
    /// `completed >= total` stays correct, and the overshoot keeps window
    /// starts aligned to batch boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::RetriesExhausted`] when one window fails
    /// every attempt in the budget, [`HarvestError::Output`] when appending
    /// fails, and [`HarvestError::State`] when the checkpoint callback
    /// fails. All are fatal for the run.
    pub async fn fetch_job<F>(
        &self,
        service: &dyn RecordService,
        job_key: &str,
        session: &SearchSession,
        resume_offset: u64,
        sink: &mut OutputSink,
        mut on_window_complete: F,
    ) -> Result<JobStats, HarvestError>
    where
        F: FnMut(CheckpointRecord) -> Result<(), StateError>,
    {
        let mut stats = JobStats::default();

        if resume_offset >= session.total {
            info!(
                job = %job_key,
                completed = resume_offset,
                total = session.total,
                "job already complete, nothing to fetch"
            );
            return Ok(stats);
        }

        for start in window_starts(resume_offset, session.total, self.batch_size) {
            let end = start.saturating_add(self.batch_size);
            info!(
                job = %job_key,
                start,
                end,
                total = session.total,
                "fetching window"
            );

            // Unconditional, even on the first window of a resumed run: the
            // service enforces a global rate ceiling independent of job
            // history.
            tokio::time::sleep(self.window_pause).await;

            let payload = self.fetch_window(service, job_key, session, start).await?;

            sink.append(&payload).await?;
            stats.bytes_appended += u64::try_from(payload.len()).unwrap_or(u64::MAX);

            on_window_complete(CheckpointRecord { completed: end })?;
            stats.windows_fetched += 1;
        }

        info!(
            job = %job_key,
            windows = stats.windows_fetched,
            bytes = stats.bytes_appended,
            "job fetch complete"
        );
        Ok(stats)
    }

    /// Fetches one window, retrying up to the attempt budget.
    ///
    /// Success is an explicit return from inside the loop; exhausting the
    /// budget is the only other exit.
    async fn fetch_window(
        &self,
        service: &dyn RecordService,
        job_key: &str,
        session: &SearchSession,
        start: u64,
    ) -> Result<Vec<u8>, HarvestError> {
        let mut attempt: u32 = 0;

        loop {
            match service.fetch(session, start, self.batch_size).await {
                Ok(payload) => return Ok(payload),
                Err(fetch_error) => {
                    attempt += 1;
                    let class = classify_fetch_error(&fetch_error);
                    match class {
                        FailureClass::Transient => warn!(
                            job = %job_key,
                            start,
                            attempt,
                            max_attempts = self.retry.max_attempts(),
                            error = %fetch_error,
                            "transient fetch failure"
                        ),
                        FailureClass::Malformed => warn!(
                            job = %job_key,
                            start,
                            attempt,
                            max_attempts = self.retry.max_attempts(),
                            error = %fetch_error,
                            "malformed response, backing off conservatively"
                        ),
                        FailureClass::Unclassified => error!(
                            job = %job_key,
                            start,
                            attempt,
                            max_attempts = self.retry.max_attempts(),
                            error = %fetch_error,
                            "unclassified fetch failure"
                        ),
                    }

                    if attempt >= self.retry.max_attempts() {
                        return Err(HarvestError::retries_exhausted(
                            job_key,
                            start,
                            attempt,
                            fetch_error,
                        ));
                    }

                    let delay = self.retry.backoff_delay(class, attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}
