//! Scripted [`RecordService`] used by engine and driver unit tests.
#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::entrez::{FetchError, RecordService, SearchError, SearchSession};

/// Payload returned when no fetch outcome has been scripted.
pub(crate) const DEFAULT_PAYLOAD: &[u8] = b">WP_0\nM\n";

/// In-memory service with scripted outcomes and call recording.
#[derive(Debug, Default)]
pub(crate) struct ScriptedService {
    total: u64,
    fetch_outcomes: Mutex<VecDeque<Result<Vec<u8>, FetchError>>>,
    fetch_calls: Mutex<Vec<(u64, u64)>>,
    search_queries: Mutex<Vec<String>>,
    search_failures: Mutex<VecDeque<bool>>,
}

impl ScriptedService {
    /// Service whose searches report 450 total records.
    pub(crate) fn new() -> Self {
        Self::with_total(450)
    }

    pub(crate) fn with_total(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Scripts the outcome of the next unscripted fetch call. Unscripted
    /// calls succeed with [`DEFAULT_PAYLOAD`].
    pub(crate) fn push_fetch(&self, outcome: Result<Vec<u8>, FetchError>) {
        self.fetch_outcomes.lock().unwrap().push_back(outcome);
    }

    /// Scripts search outcomes positionally: `true` fails that search.
    pub(crate) fn script_searches(&self, failures: &[bool]) {
        self.search_failures
            .lock()
            .unwrap()
            .extend(failures.iter().copied());
    }

    /// Returns every `(start, count)` fetch call seen so far.
    pub(crate) fn fetch_calls(&self) -> Vec<(u64, u64)> {
        self.fetch_calls.lock().unwrap().clone()
    }

    /// Returns every search query seen so far.
    pub(crate) fn search_queries(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordService for ScriptedService {
    async fn search(&self, query: &str) -> Result<SearchSession, SearchError> {
        self.search_queries.lock().unwrap().push(query.to_string());
        if self
            .search_failures
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(false)
        {
            return Err(SearchError::HttpStatus { status: 503 });
        }
        Ok(SearchSession {
            web_env: "MCID_test".to_string(),
            query_key: "1".to_string(),
            total: self.total,
        })
    }

    async fn fetch(
        &self,
        _session: &SearchSession,
        start: u64,
        count: u64,
    ) -> Result<Vec<u8>, FetchError> {
        self.fetch_calls.lock().unwrap().push((start, count));
        match self.fetch_outcomes.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(DEFAULT_PAYLOAD.to_vec()),
        }
    }
}
