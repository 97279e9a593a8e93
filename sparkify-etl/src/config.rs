//! Configuration resolution for sparkify-etl
//!
//! Each path resolves CLI → environment → TOML → compiled default.

use sparkify_common::config::{load_toml_or_default, resolve_path, CompiledDefaults};
use std::path::PathBuf;

pub const DATABASE_ENV_VAR: &str = "SPARKIFY_DB";
pub const SONG_DATA_ENV_VAR: &str = "SPARKIFY_SONG_DATA";
pub const LOG_DATA_ENV_VAR: &str = "SPARKIFY_LOG_DATA";

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub song_data: Option<PathBuf>,
    pub log_data: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct EtlConfig {
    pub database_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub log_level: String,
}

impl EtlConfig {
    pub fn resolve(cli: &CliOverrides) -> Self {
        let toml = load_toml_or_default(cli.config.as_deref());
        let defaults = CompiledDefaults::for_current_platform();

        Self {
            database_path: resolve_path(
                cli.database.as_deref(),
                DATABASE_ENV_VAR,
                toml.database_path.as_deref(),
                &defaults.database_path,
            ),
            song_data: resolve_path(
                cli.song_data.as_deref(),
                SONG_DATA_ENV_VAR,
                toml.song_data.as_deref(),
                &defaults.song_data,
            ),
            log_data: resolve_path(
                cli.log_data.as_deref(),
                LOG_DATA_ENV_VAR,
                toml.log_data.as_deref(),
                &defaults.log_data,
            ),
            log_level: toml.logging.level.unwrap_or(defaults.log_level),
        }
    }
}
