//! Constants for the harvest engine (window sizing, pacing, retry budget).
//!
//! The pacing values encode an informal rate-limit contract with Entrez; do
//! not change the defaults without confirming the service's actual policy.

use std::time::Duration;

/// Default number of records fetched per window.
pub const DEFAULT_BATCH_SIZE: u64 = 200;

/// Default courtesy pause before every window fetch (seconds).
pub const DEFAULT_WINDOW_PAUSE_SECS: u64 = 10;

/// Maximum fetch attempts per window before the run is aborted.
pub const MAX_FETCH_ATTEMPTS: u32 = 20;

/// Base delay for linear backoff after a transient failure; the n-th failed
/// attempt waits n times this.
pub const TRANSIENT_BASE_DELAY: Duration = Duration::from_secs(15);

/// Fixed backoff after a malformed response. Deliberately conservative: a
/// payload the client cannot parse usually means Entrez is rate-limiting or
/// degraded.
pub const MALFORMED_RETRY_DELAY: Duration = Duration::from_secs(180);
