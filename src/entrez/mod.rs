//! Entrez record service: query shaping, the service capability trait, and
//! the HTTP client that talks to the E-utilities endpoints.
//!
//! # Architecture
//!
//! - [`build_query`] - Pure query-shaping policy for protein-title searches
//! - [`RecordService`] - Async capability trait the harvest engine and job
//!   driver are written against
//! - [`SearchSession`] - History token plus total count returned by a search
//! - [`EntrezClient`] - reqwest-backed implementation of [`RecordService`]
//!
//! The trait seam exists so the engine's retry and checkpoint behavior can
//! be exercised against scripted services without a network.

mod client;
mod error;
mod query;

pub use client::{Credentials, ENTREZ_BASE_URL, EntrezClient};
pub use error::{FetchError, SearchError};
pub use query::{EXCLUDED_TITLE_TERMS, REQUIRED_TITLE_TERM, SEQUENCE_LENGTH_FILTER, build_query};

use async_trait::async_trait;

/// An open server-side result set.
///
/// The history token (`web_env` + `query_key`) scopes subsequent paginated
/// fetches to the search that produced it. Sessions are only valid for the
/// lifetime of the server-side result cache and are never persisted; a
/// resumed run re-establishes a fresh session and continues from the
/// persisted checkpoint offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    /// Server-side history environment token.
    pub web_env: String,
    /// Query key within the history environment.
    pub query_key: String,
    /// Total number of records matching the search.
    pub total: u64,
}

/// Capability trait for the remote record service.
///
/// Implementations may raise transient errors from either operation; retry
/// policy lives in the harvest engine, not here.
#[async_trait]
pub trait RecordService: Send + Sync {
    /// Opens a result set for `query`, returning a resumable session and the
    /// total record count.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when the service cannot be reached or the
    /// response cannot be interpreted. Not retried at this layer.
    async fn search(&self, query: &str) -> Result<SearchSession, SearchError>;

    /// Fetches the raw payload for records `[start, start + count)` of the
    /// session's result set. The service clamps a window that extends past
    /// the total count.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on any failure; the caller classifies and
    /// retries.
    async fn fetch(
        &self,
        session: &SearchSession,
        start: u64,
        count: u64,
    ) -> Result<Vec<u8>, FetchError>;
}
