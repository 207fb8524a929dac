//! HTTP client for the NCBI Entrez E-utilities endpoints.
//!
//! Wraps a shared reqwest client and implements [`RecordService`] over
//! `esearch.fcgi` (history enabled, JSON envelope) and `efetch.fcgi`
//! (FASTA text windows).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::error::{FetchError, SearchError};
use super::{RecordService, SearchSession};

/// Production E-utilities base URL.
pub const ENTREZ_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Database every search and fetch runs against.
const ENTREZ_DB: &str = "protein";

/// HTTP connect timeout (30 seconds).
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// HTTP read timeout (2 minutes; a window is a few hundred FASTA records).
const READ_TIMEOUT_SECS: u64 = 120;

/// Identification parameters sent with every request.
///
/// NCBI asks clients to identify themselves with a tool name and contact
/// e-mail; an API key raises the request-rate ceiling.
#[derive(Debug, Clone)]
pub struct Credentials {
    email: String,
    api_key: Option<String>,
}

impl Credentials {
    /// Creates credentials from a contact e-mail and an optional API key.
    #[must_use]
    pub fn new(email: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            email: email.into(),
            api_key,
        }
    }

    /// Returns the contact e-mail.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// JSON envelope returned by `esearch.fcgi` with `retmode=json`.
#[derive(Debug, Deserialize)]
struct EsearchEnvelope {
    esearchresult: EsearchResult,
}

/// The fields of the search result this client consumes. Entrez encodes the
/// count as a JSON string.
#[derive(Debug, Deserialize)]
struct EsearchResult {
    count: Option<String>,
    webenv: Option<String>,
    querykey: Option<String>,
}

/// reqwest-backed [`RecordService`] implementation.
///
/// Designed to be created once at startup and reused for every job, taking
/// advantage of connection pooling. Credentials are carried here rather than
/// in process globals so every request is explicitly attributed.
#[derive(Debug, Clone)]
pub struct EntrezClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl EntrezClient {
    /// Creates a client against the production E-utilities endpoints.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, ENTREZ_BASE_URL)
    }

    /// Creates a client against a custom base URL. Used by tests to point at
    /// a mock server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(std::time::Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .user_agent(concat!("harvester/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client with static configuration");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Identification parameters appended to every request.
    fn identity_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("tool", env!("CARGO_PKG_NAME").to_string()),
            ("email", self.credentials.email.clone()),
        ];
        if let Some(api_key) = &self.credentials.api_key {
            params.push(("api_key", api_key.clone()));
        }
        params
    }
}

#[async_trait]
impl RecordService for EntrezClient {
    #[instrument(skip(self, query))]
    async fn search(&self, query: &str) -> Result<SearchSession, SearchError> {
        let url = format!("{}/esearch.fcgi", self.base_url);

        let mut params = vec![
            ("db", ENTREZ_DB.to_string()),
            ("term", query.to_string()),
            ("idtype", "acc".to_string()),
            ("usehistory", "y".to_string()),
            ("retmode", "json".to_string()),
        ];
        params.extend(self.identity_params());

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::remote_unavailable(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let envelope: EsearchEnvelope = response
            .json()
            .await
            .map_err(|e| SearchError::malformed(format!("undecodable JSON envelope: {e}")))?;
        let result = envelope.esearchresult;

        let total = result
            .count
            .as_deref()
            .ok_or_else(|| SearchError::malformed("count field missing"))?
            .parse::<u64>()
            .map_err(|_| SearchError::malformed("count field is not a number"))?;
        let web_env = result
            .webenv
            .ok_or_else(|| SearchError::malformed("WebEnv history token missing"))?;
        let query_key = result
            .querykey
            .ok_or_else(|| SearchError::malformed("query_key missing"))?;

        debug!(total, "search opened result set");

        Ok(SearchSession {
            web_env,
            query_key,
            total,
        })
    }

    #[instrument(skip(self, session))]
    async fn fetch(
        &self,
        session: &SearchSession,
        start: u64,
        count: u64,
    ) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}/efetch.fcgi", self.base_url);

        let mut params = vec![
            ("db", ENTREZ_DB.to_string()),
            ("rettype", "fasta".to_string()),
            ("retmode", "text".to_string()),
            ("retstart", start.to_string()),
            ("retmax", count.to_string()),
            ("WebEnv", session.web_env.clone()),
            ("query_key", session.query_key.clone()),
            ("idtype", "acc".to_string()),
        ];
        params.extend(self.identity_params());

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout { start }
                } else {
                    FetchError::network(start, e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(
                status.as_u16(),
                start,
                start.saturating_add(count),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(start, e))?;

        if !looks_like_fasta(&body) {
            return Err(FetchError::malformed(payload_preview(&body)));
        }

        Ok(body.to_vec())
    }
}

/// Returns true when the payload can be treated as FASTA text: it starts
/// with a record header, or is empty (a clamped final window can return
/// nothing). Anything else is an Entrez error document.
fn looks_like_fasta(payload: &[u8]) -> bool {
    match payload.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(first) => *first == b'>',
        None => true,
    }
}

/// First line of the payload, lossily decoded and bounded, for error detail.
fn payload_preview(payload: &[u8]) -> String {
    let prefix = &payload[..payload.len().min(120)];
    let text = String::from_utf8_lossy(prefix);
    text.lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_credentials() -> Credentials {
        Credentials::new("tests@example.org", None)
    }

    fn esearch_body(count: &str) -> String {
        format!(
            r#"{{"header":{{"type":"esearch","version":"0.3"}},"esearchresult":{{"count":"{count}","retmax":"20","retstart":"0","querykey":"1","webenv":"MCID_abc123","idlist":[]}}}}"#
        )
    }

    #[test]
    fn test_looks_like_fasta_accepts_record_header() {
        assert!(looks_like_fasta(b">WP_000001.1 terminase\nMKV\n"));
    }

    #[test]
    fn test_looks_like_fasta_accepts_leading_whitespace() {
        assert!(looks_like_fasta(b"\n>WP_000001.1\nMKV\n"));
    }

    #[test]
    fn test_looks_like_fasta_accepts_empty_payload() {
        assert!(looks_like_fasta(b""));
        assert!(looks_like_fasta(b"\n\n"));
    }

    #[test]
    fn test_looks_like_fasta_rejects_error_document() {
        assert!(!looks_like_fasta(b"<?xml version=\"1.0\"?><ERROR>bad</ERROR>"));
        assert!(!looks_like_fasta(b"Error: cannot process query"));
    }

    #[test]
    fn test_payload_preview_is_first_line_bounded() {
        let long = format!("Error: {}", "x".repeat(500));
        let preview = payload_preview(long.as_bytes());
        assert!(preview.starts_with("Error: "));
        assert!(preview.len() <= 120);
    }

    #[tokio::test]
    async fn test_search_parses_session_and_count() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .and(query_param("db", "protein"))
            .and(query_param("usehistory", "y"))
            .and(query_param("idtype", "acc"))
            .and(query_param("retmode", "json"))
            .and(query_param("email", "tests@example.org"))
            .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body("450")))
            .mount(&mock_server)
            .await;

        let client = EntrezClient::with_base_url(test_credentials(), mock_server.uri());
        let session = client.search("(terminase[Title]) AND phage[Title]").await;

        let session = session.unwrap();
        assert_eq!(session.total, 450);
        assert_eq!(session.web_env, "MCID_abc123");
        assert_eq!(session.query_key, "1");
    }

    #[tokio::test]
    async fn test_search_sends_api_key_when_present() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .and(query_param("api_key", "secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body("1")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let credentials = Credentials::new("tests@example.org", Some("secret-key".to_string()));
        let client = EntrezClient::with_base_url(credentials, mock_server.uri());
        client.search("capsid[Title]").await.unwrap();
    }

    #[tokio::test]
    async fn test_search_http_error_is_not_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&mock_server)
            .await;

        let client = EntrezClient::with_base_url(test_credentials(), mock_server.uri());
        let result = client.search("capsid[Title]").await;

        match result {
            Err(SearchError::HttpStatus { status: 502 }) => {}
            other => panic!("Expected HttpStatus 502, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_garbage_body_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>down</html>"))
            .mount(&mock_server)
            .await;

        let client = EntrezClient::with_base_url(test_credentials(), mock_server.uri());
        let result = client.search("capsid[Title]").await;

        assert!(matches!(result, Err(SearchError::MalformedResponse { .. })));
    }

    #[tokio::test]
    async fn test_search_non_numeric_count_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_string(esearch_body("many")))
            .mount(&mock_server)
            .await;

        let client = EntrezClient::with_base_url(test_credentials(), mock_server.uri());
        let result = client.search("capsid[Title]").await;

        match result {
            Err(SearchError::MalformedResponse { detail }) => {
                assert!(detail.contains("count"), "Expected count detail in: {detail}");
            }
            other => panic!("Expected MalformedResponse, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_unreachable_server_is_remote_unavailable() {
        // Port 1 is practically never listening.
        let client = EntrezClient::with_base_url(test_credentials(), "http://127.0.0.1:1");
        let result = client.search("capsid[Title]").await;

        assert!(matches!(result, Err(SearchError::RemoteUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_fetch_returns_window_payload() {
        let mock_server = MockServer::start().await;
        let fasta = ">WP_000001.1 terminase [Escherichia phage T4]\nMKVLA\n";

        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .and(query_param("db", "protein"))
            .and(query_param("rettype", "fasta"))
            .and(query_param("retmode", "text"))
            .and(query_param("retstart", "200"))
            .and(query_param("retmax", "200"))
            .and(query_param("WebEnv", "MCID_abc123"))
            .and(query_param("query_key", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(fasta))
            .mount(&mock_server)
            .await;

        let client = EntrezClient::with_base_url(test_credentials(), mock_server.uri());
        let session = SearchSession {
            web_env: "MCID_abc123".to_string(),
            query_key: "1".to_string(),
            total: 450,
        };

        let payload = client.fetch(&session, 200, 200).await.unwrap();
        assert_eq!(payload, fasta.as_bytes());
    }

    #[tokio::test]
    async fn test_fetch_http_error_carries_window() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = EntrezClient::with_base_url(test_credentials(), mock_server.uri());
        let session = SearchSession {
            web_env: "MCID_abc123".to_string(),
            query_key: "1".to_string(),
            total: 450,
        };

        match client.fetch(&session, 400, 200).await {
            Err(FetchError::HttpStatus {
                status: 429,
                start: 400,
                end: 600,
            }) => {}
            other => panic!("Expected HttpStatus 429 for [400,600), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_error_document_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<?xml version=\"1.0\"?><ERROR>History expired</ERROR>"),
            )
            .mount(&mock_server)
            .await;

        let client = EntrezClient::with_base_url(test_credentials(), mock_server.uri());
        let session = SearchSession {
            web_env: "MCID_expired".to_string(),
            query_key: "1".to_string(),
            total: 450,
        };

        assert!(matches!(
            client.fetch(&session, 0, 200).await,
            Err(FetchError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_empty_payload_is_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/efetch.fcgi"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&mock_server)
            .await;

        let client = EntrezClient::with_base_url(test_credentials(), mock_server.uri());
        let session = SearchSession {
            web_env: "MCID_abc123".to_string(),
            query_key: "1".to_string(),
            total: 450,
        };

        let payload = client.fetch(&session, 400, 200).await.unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let client = EntrezClient::with_base_url(test_credentials(), "http://localhost:9/eutils/");
        assert_eq!(client.base_url, "http://localhost:9/eutils");
    }
}
