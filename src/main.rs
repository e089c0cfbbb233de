//! linkread CLI
//!
//! Resolves cloud share links (Google Drive/Docs, OneDrive/SharePoint) to
//! direct downloads and extracts plain text for LLM prompt payloads.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod confirm;
mod docx;
mod extract;
mod fetch;
mod ingest;
mod output;
mod resolve;

use ingest::{run_ingest, IngestArgs};
use resolve::{run_resolve, ResolveArgs};

#[derive(Parser)]
#[command(name = "linkread")]
#[command(version)]
#[command(about = "Fetch cloud share links and extract plain text")]
#[command(long_about = "Rewrites share links into direct-download URLs, follows Google Drive's\nlarge-file confirmation page, and extracts text from text/PDF/DOCX\nresponses. Failures degrade to structured warnings, never errors.\n\nCommands:\n  ingest     Fetch share links and extract their text\n  resolve    Rewrite share links to direct-download URLs (no network)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch share links and extract plain text
    Ingest(IngestArgs),
    /// Rewrite share links to direct-download URLs without fetching
    Resolve(ResolveArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest(args) => run_ingest(args).await,
        Commands::Resolve(args) => run_resolve(args),
    }
}
