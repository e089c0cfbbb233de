//! ingest command: Fetch share links and extract plain text
//!
//! LLM-optimized output - one settled object per URL. Per-document
//! failures never become errors; every branch degrades to a structured
//! warning so the caller always gets a settled result.

use crate::confirm::{self, ConfirmState};
use crate::extract;
use crate::fetch::{self, FetchedBody};
use crate::output;
use crate::resolve::resolve_share_link;
use anyhow::Result;
use chrono::Utc;
use clap::Args;
use futures::future::join_all;
use serde::Serialize;
use std::io::{self, BufRead};

/// Warning for empty or whitespace-only input; no network call is made.
pub const NO_URL_WARNING: &str = "No URL provided";

#[derive(Args)]
pub struct IngestArgs {
    /// Share links to ingest (multiple allowed)
    #[arg(required_unless_present = "stdin")]
    pub urls: Vec<String>,

    /// Read URLs from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// Output format: json (default) or yaml
    #[arg(long, short, default_value = "json")]
    pub format: String,

    /// Timeout per fetch attempt in milliseconds
    #[arg(long, default_value = "20000")]
    pub timeout: u64,

    /// Max extracted characters per document (0 = unlimited)
    #[arg(long, default_value = "50000")]
    pub max_chars: usize,
}

/// Configuration for one ingestion pipeline, injected rather than read
/// from the environment at call time.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Budget per fetch attempt; the confirmation retry gets its own.
    pub timeout_ms: u64,
    /// Output bound; 0 disables truncation.
    pub max_chars: usize,
    pub user_agent: String,
    /// Host the Drive confirmation retry is issued against.
    pub confirm_base: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            timeout_ms: fetch::DEFAULT_TIMEOUT_MS,
            max_chars: output::MAX_TEXT_CHARS,
            user_agent: fetch::USER_AGENT.to_string(),
            confirm_base: confirm::DRIVE_CONFIRM_BASE.to_string(),
        }
    }
}

/// One ingested document (compact).
///
/// Exactly one of a non-empty `text` or a `warning` is meaningful; both
/// are empty only when the source itself was empty.
#[derive(Debug, Serialize)]
pub struct Ingested {
    pub url: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub chars: usize,
}

impl Ingested {
    fn warned(url: &str, warning: &str) -> Self {
        Ingested {
            url: url.to_string(),
            text: String::new(),
            warning: Some(warning.to_string()),
            content_type: None,
            chars: 0,
        }
    }
}

/// Report wrapper for multiple URLs (compact).
#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
    pub timestamp: String,
    pub results: Vec<Ingested>,
}

/// Run the ingest command
pub async fn run_ingest(args: IngestArgs) -> Result<()> {
    let urls = gather_urls(&args)?;

    if urls.is_empty() {
        eprintln!("No URLs provided.");
        std::process::exit(1);
    }

    let url_count = urls.len();
    eprintln!(
        "Ingesting {} URL{}...",
        url_count,
        if url_count == 1 { "" } else { "s" }
    );

    let config = IngestConfig {
        timeout_ms: args.timeout,
        max_chars: args.max_chars,
        ..IngestConfig::default()
    };

    // Requests are independent; fan out one task per URL.
    let tasks: Vec<_> = urls
        .into_iter()
        .map(|url| {
            let config = config.clone();
            tokio::spawn(async move {
                eprintln!("  -> {}", truncate_label(&url, 60));
                ingest_url(&url, &config).await
            })
        })
        .collect();

    let results: Vec<Ingested> = join_all(tasks)
        .await
        .into_iter()
        .filter_map(|r| r.ok())
        .collect();

    let ok_count = results.iter().filter(|r| r.warning.is_none()).count();
    let failed_count = results.len() - ok_count;

    let rendered = if results.len() == 1 {
        // Single URL: output just the document object
        match args.format.as_str() {
            "yaml" | "yml" => serde_yaml::to_string(&results[0])?,
            _ => serde_json::to_string_pretty(&results[0])?,
        }
    } else {
        let report = IngestReport {
            total: url_count,
            ok: ok_count,
            failed: failed_count,
            timestamp: Utc::now().to_rfc3339(),
            results,
        };
        match args.format.as_str() {
            "yaml" | "yml" => serde_yaml::to_string(&report)?,
            _ => serde_json::to_string_pretty(&report)?,
        }
    };

    println!("{}", rendered);
    eprintln!("Done: {}/{} OK", ok_count, url_count);

    Ok(())
}

/// Get URLs from arguments or stdin
fn gather_urls(args: &IngestArgs) -> Result<Vec<String>> {
    if args.stdin {
        let stdin = io::stdin();
        let urls: Vec<String> = stdin
            .lock()
            .lines()
            .map_while(Result::ok)
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        return Ok(urls);
    }

    Ok(args.urls.clone())
}

/// Ingest a single share link: resolve it to a direct-download URL, fetch
/// with a bounded timeout, follow the Drive confirmation interstitial if
/// one appears, extract text by content type and truncate the output.
///
/// Always settles. Failures come back inside the result as a warning,
/// never as a panic or an `Err`, since callers feed the result straight
/// into form auto-fill.
pub async fn ingest_url(raw_url: &str, config: &IngestConfig) -> Ingested {
    let original = raw_url.trim();
    if original.is_empty() {
        return Ingested {
            url: raw_url.to_string(),
            text: String::new(),
            warning: Some(NO_URL_WARNING.to_string()),
            content_type: None,
            chars: 0,
        };
    }

    let resolved = resolve_share_link(original);

    let client = match fetch::build_client(config.timeout_ms, &config.user_agent) {
        Ok(client) => client,
        Err(_) => return Ingested::warned(original, fetch::TRANSPORT_WARNING),
    };

    let mut active: FetchedBody = match fetch::fetch_url(&client, &resolved).await {
        Ok(response) => response,
        Err(failure) => return Ingested::warned(original, failure.warning()),
    };

    // Drive serves an HTML interstitial instead of bytes for files it
    // cannot virus-scan; retry once with the scraped confirm token. Any
    // failure here falls back to the original response.
    if active.content_type.contains("text/html") {
        let body = String::from_utf8_lossy(&active.bytes).into_owned();
        if confirm::is_confirmation_page(&active.content_type, &body) {
            let attempt =
                confirm::resolve_confirmation(&client, &config.confirm_base, original, &body)
                    .await;
            if attempt.state == ConfirmState::Resolved {
                if let Some(response) = attempt.response {
                    active = response;
                }
            }
        }
    }

    // Tiny HTML left after all attempts is a sharing gate, not content.
    if active.content_type.contains("text/html") {
        let body = String::from_utf8_lossy(&active.bytes);
        if confirm::is_login_gate(&active.content_type, &body) {
            return Ingested::warned(original, confirm::LOGIN_GATE_WARNING);
        }
    }

    let text = match extract::extract_text(&active.content_type, &active.bytes) {
        Ok(text) => text,
        Err(_) => return Ingested::warned(original, fetch::TRANSPORT_WARNING),
    };

    let text = output::truncate_text(&text, config.max_chars);

    Ingested {
        url: original.to_string(),
        chars: text.chars().count(),
        content_type: Some(active.content_type),
        warning: None,
        text,
    }
}

fn truncate_label(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }

    // Back off to a char boundary; URLs can carry multibyte characters.
    let mut cut = max - 3;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &s[..cut])
}
