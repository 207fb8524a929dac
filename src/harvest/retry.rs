//! Failure classification and per-class backoff for window fetches.
//!
//! Every fetch failure is retryable up to the attempt budget; what differs
//! per class is the delay before the next attempt:
//!
//! - [`FailureClass::Transient`] - linear backoff, base delay times attempt
//! - [`FailureClass::Malformed`] - fixed conservative backoff
//! - [`FailureClass::Unclassified`] - no backoff, logged prominently
//!
//! Budget exhaustion is fatal for the whole run, not just the job: twenty
//! consecutive failures on one window almost always mean a systemic problem
//! (revoked credentials, service outage) that would recur for every
//! subsequent job.

use std::time::Duration;

use crate::entrez::FetchError;

use super::constants::{MALFORMED_RETRY_DELAY, MAX_FETCH_ATTEMPTS, TRANSIENT_BASE_DELAY};

/// Classification of a window-fetch failure, selecting the backoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Protocol or transport failure that may clear quickly (HTTP error
    /// status, network error, timeout).
    Transient,

    /// The service answered with something the client cannot use; back off
    /// conservatively regardless of attempt count.
    Malformed,

    /// A failure mode nothing anticipated. Retried without added delay but
    /// always logged loudly.
    Unclassified,
}

/// Classifies a fetch error into its backoff class.
#[must_use]
pub fn classify_fetch_error(error: &FetchError) -> FailureClass {
    match error {
        FetchError::HttpStatus { .. } | FetchError::Network { .. } | FetchError::Timeout { .. } => {
            FailureClass::Transient
        }
        FetchError::MalformedResponse { .. } => FailureClass::Malformed,
        FetchError::Other { .. } => FailureClass::Unclassified,
    }
}

/// Retry configuration for the per-window fetch loop.
///
/// # Default Values
///
/// - `max_attempts`: 20
/// - `transient_base_delay`: 15 seconds
/// - `malformed_delay`: 180 seconds
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts per window (including the initial attempt).
    max_attempts: u32,

    /// Base delay for linear transient backoff.
    transient_base_delay: Duration,

    /// Fixed delay after a malformed response.
    malformed_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_FETCH_ATTEMPTS,
            transient_base_delay: TRANSIENT_BASE_DELAY,
            malformed_delay: MALFORMED_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a retry policy with custom settings.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, transient_base_delay: Duration, malformed_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            transient_base_delay,
            malformed_delay,
        }
    }

    /// Creates a policy with a custom attempt budget and default delays.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the attempt following the `attempt`-th failure
    /// (1-indexed).
    #[must_use]
    pub fn backoff_delay(&self, class: FailureClass, attempt: u32) -> Duration {
        match class {
            FailureClass::Transient => self.transient_base_delay * attempt,
            FailureClass::Malformed => self.malformed_delay,
            FailureClass::Unclassified => Duration::ZERO,
        }
    }
}
