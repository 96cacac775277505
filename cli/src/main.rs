//! snapdelta - compare two directory-service snapshots.
//!
//! Reads two snapshot archives (or directories, or single JSON exports),
//! indexes both with the snapdelta engine and reports objects added, deleted
//! and modified, as a terminal summary and optionally as HTML and JSON files.

mod archive;
mod config;
mod error;
mod load;
mod report;

use crate::config::{Config, Overrides};
use crate::error::Result;
use crate::load::load_snapshot;
use crate::report::Report;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code when `--fail-on-change` is set and the snapshots differ.
const EXIT_CHANGED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "snapdelta")]
#[command(about = "Compare two directory-service snapshots", long_about = None)]
struct Cli {
    /// Older snapshot (.zip archive, directory or .json file)
    old: PathBuf,

    /// Newer snapshot (.zip archive, directory or .json file)
    new: PathBuf,

    /// Write an HTML report to this path
    #[arg(long)]
    html: Option<PathBuf>,

    /// Write a JSON report to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Additional attribute to ignore (repeatable)
    #[arg(long = "ignore", value_name = "ATTRIBUTE")]
    ignore: Vec<String>,

    /// Multi-value separator, replacing the configured ones (repeatable, `\n` allowed)
    #[arg(long = "separator", value_name = "SEP")]
    separators: Vec<String>,

    /// Abort on the first malformed payload instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Exit with status 2 when the snapshots differ
    #[arg(long)]
    fail_on_change: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            ignore: self.ignore.clone(),
            separators: self.separators.clone(),
            strict: self.strict,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before tracing so RUST_LOG can come from it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "snapdelta=debug"
    } else {
        "snapdelta=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Arc::new(Config::from_env()?.with_overrides(&cli.overrides())?);
    tracing::debug!(?config, "Resolved configuration");

    // Both snapshots are independent; index them in parallel.
    let old_task = {
        let (path, config) = (cli.old.clone(), Arc::clone(&config));
        tokio::task::spawn_blocking(move || load_snapshot(&path, &config))
    };
    let new_task = {
        let (path, config) = (cli.new.clone(), Arc::clone(&config));
        tokio::task::spawn_blocking(move || load_snapshot(&path, &config))
    };
    let (old, new) = tokio::try_join!(old_task, new_task)?;
    let (old, new) = (old?, new?);

    let result = snapdelta_engine::diff(&old.store, &new.store);
    let report = Report::new(&old, &new, &result);

    if let Some(path) = &cli.html {
        report::write_html(&report, path)?;
        tracing::info!(path = %path.display(), "HTML report written");
    }
    if let Some(path) = &cli.json {
        report::write_json(&report, path)?;
        tracing::info!(path = %path.display(), "JSON report written");
    }

    print!("{}", report::render_summary(&report));

    if cli.fail_on_change && !result.is_empty() {
        return Ok(ExitCode::from(EXIT_CHANGED));
    }
    Ok(ExitCode::SUCCESS)
}
