//! atn-correct (Anomaly Correction) - batch job entry point
//!
//! Intended to be scheduled externally (e.g. nightly cron); overlap
//! prevention is the scheduler's concern.

use std::path::PathBuf;

use anyhow::Result;
use atn_common::config;
use atn_common::db::init_database;
use atn_common::repo::SqlAttendanceRepository;
use atn_correct::{correct_all, CorrectionScope};
use clap::Parser;
use tracing::{info, warn};

/// Command-line arguments for atn-correct
#[derive(Parser, Debug)]
#[command(name = "atn-correct")]
#[command(about = "Re-evaluate flagged missing-checkout anomalies")]
#[command(version)]
struct Args {
    /// Restrict the pass to one tenant (default: all tenants)
    #[arg(short, long)]
    tenant: Option<String>,

    /// Root folder containing the attendance database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting anomaly correction pass (atn-correct) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let root_folder =
        config::resolve_root_folder(args.root_folder.as_deref(), "ATN_ROOT_FOLDER");
    let db_path = config::prepare_root_folder(&root_folder)?;
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;
    let attendance = SqlAttendanceRepository::new(pool);

    let scope = match args.tenant {
        Some(tenant) => CorrectionScope::Tenant(tenant),
        None => CorrectionScope::Global,
    };

    let report = correct_all(&attendance, &scope).await?;

    info!(
        "Correction pass finished: {} fixed, {} still missing, {} errors",
        report.fixed_count,
        report.still_missing_count,
        report.errors.len()
    );
    for error in &report.errors {
        warn!(record_id = %error.record_id, "record skipped: {}", error.message);
    }

    Ok(())
}
