//! sparkify-etl - Warehouse loader
//!
//! Reads the song-metadata and event-log corpora, normalizes them into the
//! star schema and loads the SQLite warehouse. Safe to re-run: existing rows
//! are kept and only user subscription levels are refreshed.
//!
//! Exits non-zero when the source records cannot be parsed or any table batch
//! was rolled back.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sparkify_etl::config::{CliOverrides, EtlConfig};

/// Command-line arguments for sparkify-etl
#[derive(Parser, Debug)]
#[command(name = "sparkify-etl")]
#[command(about = "Load Sparkify song and event logs into the analytics warehouse")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "SPARKIFY_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite warehouse file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Root folder of the song-metadata corpus
    #[arg(long)]
    song_data: Option<PathBuf>,

    /// Root folder of the event-log corpus
    #[arg(long)]
    log_data: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let config = EtlConfig::resolve(&CliOverrides {
        config: args.config,
        database: args.database,
        song_data: args.song_data,
        log_data: args.log_data,
    });

    // Initialize tracing (RUST_LOG wins over the configured level)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sparkify_etl={0},sparkify_common={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sparkify-etl {}", env!("CARGO_PKG_VERSION"));
    info!("Database: {}", config.database_path.display());
    info!("Song data: {}", config.song_data.display());
    info!("Log data: {}", config.log_data.display());

    let pool = sparkify_common::db::init_database(&config.database_path)
        .await
        .context("Failed to initialize warehouse database")?;

    let report = sparkify_etl::run_from_paths(&pool, &config.song_data, &config.log_data)
        .await
        .context("Failed to read or parse source records, nothing was loaded")?;

    report.log_summary();
    pool.close().await;

    if report.is_success() {
        info!("Warehouse load complete");
        Ok(ExitCode::SUCCESS)
    } else {
        let failed: Vec<&str> = report.failures().map(|e| e.table).collect();
        tracing::error!("Load finished with failed tables: {}", failed.join(", "));
        Ok(ExitCode::FAILURE)
    }
}
