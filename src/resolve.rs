//! resolve command: Rewrite share links into direct-download URLs
//!
//! Pure string rewriting, no network. First matching provider rule wins;
//! unknown links pass through trimmed.

use anyhow::Result;
use clap::Args;
use regex::Regex;
use serde::Serialize;
use url::Url;

#[derive(Args)]
pub struct ResolveArgs {
    /// Share links to resolve (multiple allowed)
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Output format: plain (default), json or yaml
    #[arg(long, short, default_value = "plain")]
    pub format: String,
}

/// A resolved share link (compact)
#[derive(Debug, Serialize)]
pub struct ResolvedLink {
    pub url: String,
    pub resolved: String,
}

/// Run the resolve command
pub fn run_resolve(args: ResolveArgs) -> Result<()> {
    let links: Vec<ResolvedLink> = args
        .urls
        .iter()
        .map(|u| ResolvedLink {
            url: u.clone(),
            resolved: resolve_share_link(u),
        })
        .collect();

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&links)?),
        "yaml" | "yml" => print!("{}", serde_yaml::to_string(&links)?),
        _ => {
            for link in &links {
                println!("{}", link.resolved);
            }
        }
    }

    Ok(())
}

/// Rewrite a human-shared cloud URL into a direct-download URL.
///
/// Rules are applied first-match-wins and are independent of each other:
/// - Google Drive `/file/d/{id}/...` and `/open?id={id}` links become
///   `uc?export=download` links on the same host.
/// - Google Docs/Sheets/Slides editor links become export links
///   (`csv` for spreadsheets, `txt` for everything else).
/// - OneDrive/SharePoint links get `redir?` swapped for `download?` and a
///   `download=1` parameter appended once.
/// - Anything else passes through trimmed.
pub fn resolve_share_link(raw: &str) -> String {
    let url = raw.trim();

    // Drive file viewer links: https://drive.google.com/file/d/{id}/view
    let file_re = Regex::new(r"^https?://([^/]+)/file/d/([A-Za-z0-9_-]+)").unwrap();
    if let Some(cap) = file_re.captures(url) {
        return format!("https://{}/uc?export=download&id={}", &cap[1], &cap[2]);
    }

    // Drive open links: https://drive.google.com/open?id={id}
    let open_re = Regex::new(r"^https?://([^/]+)/open\?(?:[^#]*&)?id=([A-Za-z0-9_-]+)").unwrap();
    if let Some(cap) = open_re.captures(url) {
        return format!("https://{}/uc?export=download&id={}", &cap[1], &cap[2]);
    }

    // Docs/Sheets/Slides editor links become export links.
    let editor_re = Regex::new(
        r"^https?://docs\.google\.com/(document|spreadsheets|presentation)/d/([A-Za-z0-9_-]+)",
    )
    .unwrap();
    if let Some(cap) = editor_re.captures(url) {
        let format = if &cap[1] == "spreadsheets" { "csv" } else { "txt" };
        return format!(
            "https://docs.google.com/{}/d/{}/export?format={}",
            &cap[1], &cap[2], format
        );
    }

    if is_onedrive_family(url) {
        let mut out = url.replace("redir?", "download?");
        if !out.contains("download=1") {
            out.push(if out.contains('?') { '&' } else { '?' });
            out.push_str("download=1");
        }
        return out;
    }

    url.to_string()
}

/// True for OneDrive/SharePoint-family hosts (onedrive.live.com, 1drv.ms,
/// *.sharepoint.com).
fn is_onedrive_family(url: &str) -> bool {
    let host = match Url::parse(url) {
        Ok(u) => match u.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        },
        Err(_) => return false,
    };

    host == "onedrive.live.com"
        || host.ends_with(".onedrive.live.com")
        || host == "1drv.ms"
        || host == "sharepoint.com"
        || host.ends_with(".sharepoint.com")
}
