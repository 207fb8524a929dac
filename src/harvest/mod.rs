//! Resumable paginated fetch: windows, failure classification, retry
//! backoff, and the per-job fetch engine.
//!
//! # Architecture
//!
//! - [`window_starts`] - Window arithmetic over `(resume, total, batch)`
//! - [`FailureClass`] / [`classify_fetch_error`] - Maps fetch errors to
//!   backoff classes
//! - [`RetryPolicy`] - Attempt budget and per-class backoff delays
//! - [`PageFetcher`] - The state machine walking windows for one job
//! - [`HarvestError`] - Run-aborting failures

mod constants;
mod engine;
mod error;
mod retry;
mod window;

pub use constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_WINDOW_PAUSE_SECS, MALFORMED_RETRY_DELAY, MAX_FETCH_ATTEMPTS,
    TRANSIENT_BASE_DELAY,
};
pub use engine::{JobStats, PageFetcher};
pub use error::HarvestError;
pub use retry::{FailureClass, RetryPolicy, classify_fetch_error};
pub use window::window_starts;
