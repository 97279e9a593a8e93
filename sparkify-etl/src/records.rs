//! Record source: JSON-lines corpus reader and validated record shapes
//!
//! Raw input is a tree of `*.json` files, each holding one JSON object per
//! line. [`JsonLinesSource`] walks the tree and yields the objects as
//! [`RawRecord`] maps; [`parse_song_records`] and [`parse_log_events`] turn
//! those maps into typed records, failing fast on missing or mistyped fields.

use crate::error::{EtlError, ParseError};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// One parsed JSON object, keyed by field name
pub type RawRecord = Map<String, Value>;

/// `page` value marking a song play
pub const NEXT_SONG_PAGE: &str = "NextSong";

/// Recursive JSON-lines reader
pub struct JsonLinesSource {
    ignore_patterns: Vec<String>,
    extension: String,
}

impl Default for JsonLinesSource {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonLinesSource {
    /// Create new source with default ignore patterns
    ///
    /// Ignores notebook checkpoints and VCS folders, which hold stale copies
    /// of data files.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".ipynb_checkpoints".to_string(),
                ".git".to_string(),
                ".DS_Store".to_string(),
            ],
            extension: "json".to_string(),
        }
    }

    /// List data files beneath `root`, sorted by path
    ///
    /// A missing root yields an empty list.
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        if !root.exists() {
            tracing::warn!("Data folder not found: {}", root.display());
            return Vec::new();
        }

        let mut symlink_visited = HashSet::new();
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.has_data_extension(entry.path()) {
                        files.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!("{} data files found under {}", files.len(), root.display());
        files
    }

    /// Read every record beneath `root`
    ///
    /// Records are returned in file-path order, then line order. Blank lines
    /// are skipped.
    pub fn read_records(&self, root: &Path) -> Result<Vec<RawRecord>, EtlError> {
        let mut records = Vec::new();
        for path in self.scan(root) {
            read_file(&path, &mut records)?;
        }

        if records.is_empty() {
            tracing::warn!("No records found under {}", root.display());
        } else {
            tracing::info!("Read {} records from {}", records.len(), root.display());
        }
        Ok(records)
    }

    fn has_data_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }

    fn should_process_entry(&self, entry: &DirEntry, symlink_visited: &mut HashSet<PathBuf>) -> bool {
        // Never filter the root itself
        if entry.depth() == 0 {
            return true;
        }

        let file_name = entry.file_name().to_string_lossy();
        if self.ignore_patterns.iter().any(|p| file_name == p.as_str()) {
            return false;
        }

        if entry.path_is_symlink() {
            if let Ok(canonical) = entry.path().canonicalize() {
                if !symlink_visited.insert(canonical) {
                    tracing::warn!("Symlink loop detected: {}", entry.path().display());
                    return false;
                }
            }
        }

        true
    }
}

fn read_file(path: &Path, records: &mut Vec<RawRecord>) -> Result<(), EtlError> {
    let file = File::open(path).map_err(|source| EtlError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| EtlError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let value: Value = serde_json::from_str(&line).map_err(|source| ParseError::Json {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;

        match value {
            Value::Object(map) => records.push(map),
            _ => {
                return Err(ParseError::NotAnObject {
                    path: path.to_path_buf(),
                    line: idx + 1,
                }
                .into())
            }
        }
    }

    Ok(())
}

/// Song-metadata record
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
    pub artist_name: String,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
}

/// Application log event
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Millisecond Unix epoch
    pub ts: i64,
    pub page: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub song: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub length: Option<f64>,
    pub session_id: i64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl LogEvent {
    /// Whether this event records a song being played
    pub fn is_song_play(&self) -> bool {
        self.page == NEXT_SONG_PAGE
    }

    /// Numeric user id, or `None` for anonymous/non-numeric markers
    pub fn numeric_user_id(&self) -> Result<Option<i64>, ParseError> {
        match self.user_id.as_deref() {
            Some(id) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => id
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ParseError::UserId(id.to_string())),
            _ => Ok(None),
        }
    }

    /// Event timestamp as UTC
    pub fn start_time(&self) -> Result<chrono::DateTime<chrono::Utc>, ParseError> {
        sparkify_common::time::millis_to_utc(self.ts).map_err(|e| ParseError::Timestamp {
            millis: self.ts,
            reason: e.to_string(),
        })
    }
}

/// `userId` arrives as a string in most logs and as an integer in some
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number for userId, found {}",
            other
        ))),
    }
}

fn parse_records<T>(kind: &'static str, raw: &[RawRecord]) -> Result<Vec<T>, ParseError>
where
    T: for<'de> Deserialize<'de>,
{
    raw.iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(Value::Object(record.clone())).map_err(|source| {
                ParseError::Record {
                    kind,
                    index,
                    source,
                }
            })
        })
        .collect()
}

/// Validate raw song-metadata records
pub fn parse_song_records(raw: &[RawRecord]) -> Result<Vec<SongRecord>, ParseError> {
    parse_records("song", raw)
}

/// Validate raw log-event records
pub fn parse_log_events(raw: &[RawRecord]) -> Result<Vec<LogEvent>, ParseError> {
    parse_records("log event", raw)
}
