//! Bounded HTTP retrieval with categorized failures
//!
//! One fetch attempt = one request with its own timeout budget. Failures
//! are classified (HTTP status vs timeout vs network) so observability can
//! tell them apart, even though both transport classes surface to the
//! caller under the same warning.

use std::time::Duration;
use thiserror::Error;

/// Default per-attempt budget. Each attempt (primary or confirmation
/// retry) gets its own independent timer.
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;

/// Fixed User-Agent sent on every outbound request.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; linkread/0.1)";

/// Redirect chains are capped so a misbehaving host cannot loop forever.
pub const MAX_REDIRECTS: usize = 5;

/// Warning for a non-success HTTP status on the primary fetch.
pub const ACCESS_WARNING: &str = "Could not access the link. Make sure it is publicly shared.";

/// Warning for transport-level failures (DNS, TLS, reset, timeout) and
/// unparseable binary content.
pub const TRANSPORT_WARNING: &str =
    "Could not fetch content from the link. Ensure the file is publicly accessible.";

/// A fetched response, reduced to what the extraction pipeline needs.
/// Status is checked here; only successful bodies leave this module.
#[derive(Debug)]
pub struct FetchedBody {
    /// Declared Content-Type header, lowercased; empty when absent.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Why a fetch attempt produced no usable response.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// Server answered, but with a non-success status.
    #[error("HTTP {0}")]
    HttpStatus(u16),
    /// The attempt exceeded its time budget.
    #[error("timed out")]
    Timeout,
    /// DNS, TLS, connection or protocol error.
    #[error("network: {0}")]
    Network(String),
}

impl FetchFailure {
    /// Caller-facing warning for this failure class.
    pub fn warning(&self) -> &'static str {
        match self {
            FetchFailure::HttpStatus(_) => ACCESS_WARNING,
            FetchFailure::Timeout | FetchFailure::Network(_) => TRANSPORT_WARNING,
        }
    }
}

/// Build the client used for every attempt of one ingestion request:
/// fixed UA, bounded timeout, capped redirect following.
pub fn build_client(timeout_ms: u64, user_agent: &str) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_millis(timeout_ms))
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
}

/// Fetch a URL and pull the whole body into memory.
///
/// Non-success statuses are failures here: the pipeline never extracts
/// content from an error page.
pub async fn fetch_url(client: &reqwest::Client, url: &str) -> Result<FetchedBody, FetchFailure> {
    let response = client.get(url).send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::HttpStatus(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_lowercase();

    let bytes = response.bytes().await.map_err(classify)?;

    Ok(FetchedBody {
        content_type,
        bytes: bytes.to_vec(),
    })
}

/// Classify a reqwest error: timeouts are kept distinct from other
/// transport errors.
fn classify(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Network(e.to_string())
    }
}
