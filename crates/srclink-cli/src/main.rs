//! srclink - module source link resolver
//!
//! Usage:
//!   srclink github.com/org/repo v1.2.3                 # Module home URL
//!   srclink example.org/mod v1.0.0 --dir pkg/util      # Directory URL
//!   srclink example.org/mod v1.0.0 --file a.go -l 10   # Line URL
//!   srclink std v1.21.0 --format json                  # JSON output

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use srclink_core::config;
use srclink_core::source::{SourceInfo, SourceResolver};

#[derive(Parser)]
#[command(name = "srclink")]
#[command(about = "Resolve module versions to source repository links", long_about = None)]
struct Cli {
    /// Module path or repository reference (e.g., github.com/org/repo/sub)
    module: String,

    /// Module version (tag or pseudo-version)
    version: String,

    /// Directory relative to the module root
    #[arg(long, conflicts_with = "file")]
    dir: Option<String>,

    /// File relative to the module root
    #[arg(long)]
    file: Option<String>,

    /// Line in --file
    #[arg(short, long, requires = "file")]
    line: Option<u32>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the discovery timeout, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    module: &'a str,
    version: &'a str,
    source: &'a SourceInfo,
    has_templates: bool,
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "srclink=debug,srclink_core=debug,info"
    } else {
        "srclink=info,srclink_core=info,warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(secs) = cli.timeout {
        config.discovery_timeout_secs = secs;
    }

    let resolver =
        SourceResolver::from_config(&config).context("Failed to set up source resolver")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, canceling");
            on_interrupt.cancel();
        }
    });

    let info = resolver
        .module_info(&cancel, &cli.module, &cli.version)
        .await
        .with_context(|| format!("Failed to resolve {}@{}", cli.module, cli.version))?;

    if !info.has_templates() {
        tracing::warn!(
            repo_url = info.repo_url(),
            "no URL convention known for this repository host"
        );
    }

    let url = requested_url(&cli, &info);

    match cli.format {
        OutputFormat::Text => print_text(&info, &url),
        OutputFormat::Json => {
            let report = Report {
                module: &cli.module,
                version: &cli.version,
                source: &info,
                has_templates: info.has_templates(),
                url,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn requested_url(cli: &Cli, info: &SourceInfo) -> String {
    match (&cli.file, cli.line, &cli.dir) {
        (Some(file), Some(line), _) => info.line_url(file, line),
        (Some(file), None, _) => info.file_url(file),
        (None, _, Some(dir)) => info.directory_url(dir),
        (None, _, None) => info.module_url(),
    }
}

fn print_text(info: &SourceInfo, url: &str) {
    let dir = if info.module_dir().is_empty() {
        "."
    } else {
        info.module_dir()
    };
    println!("repository: {}", info.repo_url());
    println!("directory:  {}", dir);
    println!("commit:     {}", info.commit());
    if info.has_templates() {
        println!("url:        {}", url);
    } else {
        println!("url:        (unknown hosting convention)");
    }
}
