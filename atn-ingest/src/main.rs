//! atn-ingest (Attendance Ingestion) - service entry point

use std::path::PathBuf;

use anyhow::Result;
use atn_common::config::{self, EngineConfig};
use atn_common::db::init_database;
use atn_ingest::{build_router, AppState};
use clap::Parser;
use tracing::info;

/// Command-line arguments for atn-ingest
#[derive(Parser, Debug)]
#[command(name = "atn-ingest")]
#[command(about = "Attendance event ingestion service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "ATN_INGEST_PORT")]
    port: Option<u16>,

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
        "Starting attendance ingestion service (atn-ingest) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let root_folder =
        config::resolve_root_folder(args.root_folder.as_deref(), "ATN_ROOT_FOLDER");
    let db_path = config::prepare_root_folder(&root_folder)?;
    info!("Database path: {}", db_path.display());

    let engine_config = EngineConfig::load(&root_folder)?;
    let port = args.port.unwrap_or(engine_config.bind_port);

    let pool = init_database(&db_path).await?;

    let state = AppState::new(pool, engine_config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("atn-ingest listening on http://0.0.0.0:{port}");
    info!("Webhook: POST http://0.0.0.0:{port}/api/attendance/webhook/state");

    axum::serve(listener, app).await?;

    Ok(())
}
