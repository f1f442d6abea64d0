//! subaudit - Submission audit entry point
//!
//! Reconciles every contestant under the source directory and prints one
//! import instruction per submission that must be replayed. Diagnostics go
//! to stderr, instructions to stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for subaudit
#[derive(Parser, Debug)]
#[command(name = "subaudit")]
#[command(about = "Reconcile contest submissions across file store and event logs")]
#[command(version)]
struct Args {
    /// Directory holding one sub-directory per contestant
    #[arg(short, long, default_value = "contest-data")]
    source_dir: PathBuf,

    /// Audit only this contestant
    #[arg(short, long)]
    contestant: Option<String>,

    /// Enable debug diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "subaudit=debug,subaudit_common=debug"
    } else {
        "subaudit=info,subaudit_common=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting subaudit v{}", env!("CARGO_PKG_VERSION"));
    info!("Source directory: {}", args.source_dir.display());

    let config = subaudit::config::resolve_config().context("Failed to load configuration")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    subaudit::run_audit(&config, &args.source_dir, args.contestant.as_deref(), &mut out)
        .context("Audit aborted")?;

    Ok(())
}
