//! Job driver: iterates configured jobs, runs search then fetch for each,
//! and owns checkpoint persistence.
//!
//! Jobs run strictly one at a time, in sorted key order, to respect the
//! service's global rate ceiling. Any search failure or retry exhaustion
//! aborts the whole run; the state file then reflects exactly the last
//! fully-completed window, so re-invocation is the correct recovery action.

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::checkpoint::CheckpointStore;
use crate::entrez::{RecordService, build_query};
use crate::harvest::{HarvestError, PageFetcher};
use crate::output::OutputSink;

/// Outcome of one job within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// The job key.
    pub key: String,
    /// Total record count reported by the search.
    pub total: u64,
    /// Checkpoint offset the job started from.
    pub resumed_from: u64,
    /// Windows fetched during this run (always 0 in dry mode).
    pub windows_fetched: u64,
    /// Payload bytes appended during this run.
    pub bytes_appended: u64,
}

/// Aggregated outcome of a run, one entry per job in execution order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Per-job outcomes.
    pub jobs: Vec<JobReport>,
}

impl RunReport {
    /// Total windows fetched across all jobs.
    #[must_use]
    pub fn windows_fetched(&self) -> u64 {
        self.jobs.iter().map(|job| job.windows_fetched).sum()
    }

    /// Total payload bytes appended across all jobs.
    #[must_use]
    pub fn bytes_appended(&self) -> u64 {
        self.jobs.iter().map(|job| job.bytes_appended).sum()
    }
}

/// Sequential driver over the configured jobs.
pub struct JobDriver<'a> {
    service: &'a dyn RecordService,
    store: &'a CheckpointStore,
    fetcher: PageFetcher,
    output_dir: PathBuf,
}

impl<'a> JobDriver<'a> {
    /// Creates a driver writing per-job output files under `output_dir`.
    pub fn new(
        service: &'a dyn RecordService,
        store: &'a CheckpointStore,
        fetcher: PageFetcher,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            service,
            store,
            fetcher,
            output_dir: output_dir.into(),
        }
    }

    /// Runs every configured job.
    ///
    /// In dry mode only the search runs: the report carries each job's total
    /// record count, and neither output files nor checkpoints are touched.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::State`] when the state file cannot be loaded
    /// or persisted, [`HarvestError::Search`] when any job's search fails,
    /// and the engine's fatal errors from the fetch stage. The first error
    /// aborts the run; remaining jobs are not attempted.
    #[instrument(skip(self))]
    pub async fn run(&self, dry_run: bool) -> Result<RunReport, HarvestError> {
        let mut jobs = self.store.load()?;

        // Snapshot the plan up front so the mapping itself stays free for
        // checkpoint updates during the fetch loop.
        let planned: Vec<(String, Vec<String>, u64)> = jobs
            .iter()
            .map(|(key, job)| (key.clone(), job.labels.clone(), job.completed))
            .collect();

        let mut report = RunReport::default();

        for (key, labels, resumed_from) in planned {
            info!(job = %key, resumed_from, "starting job");

            let query = build_query(&labels);
            let session = self.service.search(&query).await?;

            if dry_run {
                info!(job = %key, total = session.total, "dry run: count only");
                report.jobs.push(JobReport {
                    key,
                    total: session.total,
                    resumed_from,
                    windows_fetched: 0,
                    bytes_appended: 0,
                });
                continue;
            }

            let out_path = self.output_dir.join(format!("{key}.fasta"));
            let mut sink = OutputSink::open(&out_path).await?;

            let stats = self
                .fetcher
                .fetch_job(
                    self.service,
                    &key,
                    &session,
                    resumed_from,
                    &mut sink,
                    |record| {
                        if let Some(state) = jobs.get_mut(&key) {
                            state.completed = record.completed;
                        }
                        self.store.save(&jobs)
                    },
                )
                .await?;

            report.jobs.push(JobReport {
                key,
                total: session.total,
                resumed_from,
                windows_fetched: stats.windows_fetched,
                bytes_appended: stats.bytes_appended,
            });
        }

        info!(
            jobs = report.jobs.len(),
            windows = report.windows_fetched(),
            bytes = report.bytes_appended(),
            dry_run,
            "run complete"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for JobDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobDriver")
            .field("output_dir", &self.output_dir)
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}
