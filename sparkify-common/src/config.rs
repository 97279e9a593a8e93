//! Configuration loading and path resolution
//!
//! Bootstrap settings come from up to four places. Resolution order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! the remaining tiers are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming an explicit TOML config file
pub const CONFIG_ENV_VAR: &str = "SPARKIFY_CONFIG";

/// Bootstrap configuration loaded from TOML file
///
/// Every field is optional; absent values fall through to the compiled
/// defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    /// Path to the SQLite warehouse file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Root folder of the song-metadata corpus
    #[serde(default)]
    pub song_data: Option<PathBuf>,

    /// Root folder of the event-log corpus
    #[serde(default)]
    pub log_data: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); compiled default when absent
    #[serde(default)]
    pub level: Option<String>,
}

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            database_path: default_data_folder().join("sparkify.db"),
            song_data: PathBuf::from("data/song_data"),
            log_data: PathBuf::from("data/log_data"),
            log_level: "info".to_string(),
        }
    }
}

/// Get OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("sparkify"))
        .unwrap_or_else(|| PathBuf::from("./sparkify_data"))
}

/// Default location of the TOML config file (`<config_dir>/sparkify/etl.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sparkify").join("etl.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Locate and load the TOML config, degrading to defaults
///
/// An explicit path (CLI argument, then `SPARKIFY_CONFIG`) that cannot be
/// read is reported as a warning; the platform default location is only
/// consulted when it exists.
pub fn load_toml_or_default(explicit: Option<&Path>) -> TomlConfig {
    let env_path = std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from);
    let candidate = explicit
        .map(Path::to_path_buf)
        .or(env_path)
        .or_else(|| default_config_path().filter(|p| p.exists()));

    let Some(path) = candidate else {
        debug!("No TOML config file found, using defaults");
        return TomlConfig::default();
    };

    match load_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded TOML config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{}; continuing with defaults", e);
            TomlConfig::default()
        }
    }
}

/// Resolve a path setting following the priority order
pub fn resolve_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
    default: &Path,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    // Priority 4: Compiled default
    default.to_path_buf()
}
