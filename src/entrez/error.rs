//! Error types for the Entrez record service.
//!
//! Search and fetch carry separate error surfaces because they have separate
//! failure policies: a search failure is terminal for the run, while fetch
//! failures are classified and retried by the harvest engine.

use thiserror::Error;

/// Errors raised while opening a result set with `esearch`.
///
/// None of these are retried at this layer; they surface to the job driver
/// and abort the run.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The Entrez service could not be reached at all (DNS failure,
    /// connection refused, TLS failure, timeout).
    #[error("Entrez unreachable at {url}: {source}")]
    RemoteUnavailable {
        /// The endpoint that could not be reached.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Entrez answered the search with a non-success HTTP status.
    #[error("Entrez search returned HTTP {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// The search response could not be interpreted (missing history token,
    /// non-numeric count, undecodable JSON envelope).
    #[error("malformed Entrez search response: {detail}")]
    MalformedResponse {
        /// Short description of what failed to parse.
        detail: String,
    },
}

impl SearchError {
    /// Creates a remote-unavailable error from a transport failure.
    pub fn remote_unavailable(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::RemoteUnavailable {
            url: url.into(),
            source,
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            detail: detail.into(),
        }
    }
}

/// Errors raised while fetching one result window with `efetch`.
///
/// The harvest engine classifies these into backoff classes via
/// [`classify_fetch_error`](crate::harvest::classify_fetch_error); every
/// variant is retryable up to the attempt budget.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Entrez answered the fetch with a non-success HTTP status.
    #[error("HTTP {status} fetching records {start}..{end}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
        /// Window start offset.
        start: u64,
        /// Window end offset (exclusive, as requested).
        end: u64,
    },

    /// Transport-level failure (DNS, connection reset, body read error).
    #[error("network error fetching records from offset {start}: {source}")]
    Network {
        /// Window start offset.
        start: u64,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The request timed out before the window payload arrived.
    #[error("timeout fetching records from offset {start}")]
    Timeout {
        /// Window start offset.
        start: u64,
    },

    /// The response body is not usable as record payload (an Entrez error
    /// document where FASTA was expected). Usually means the service is
    /// rate-limiting or degraded.
    #[error("malformed Entrez fetch response: {detail}")]
    MalformedResponse {
        /// Preview of the unexpected payload.
        detail: String,
    },

    /// A failure mode not anticipated by the Entrez client. Produced by
    /// alternative [`RecordService`](crate::entrez::RecordService)
    /// implementations; always logged prominently by the engine.
    #[error("unexpected fetch failure: {detail}")]
    Other {
        /// Description of the failure.
        detail: String,
    },
}

impl FetchError {
    /// Creates an HTTP status error for a window.
    #[must_use]
    pub fn http_status(status: u16, start: u64, end: u64) -> Self {
        Self::HttpStatus { status, start, end }
    }

    /// Creates a network error for a window.
    pub fn network(start: u64, source: reqwest::Error) -> Self {
        Self::Network { start, source }
    }

    /// Creates a malformed-response error.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            detail: detail.into(),
        }
    }

    /// Creates an unclassified error.
    pub fn other(detail: impl Into<String>) -> Self {
        Self::Other {
            detail: detail.into(),
        }
    }
}
