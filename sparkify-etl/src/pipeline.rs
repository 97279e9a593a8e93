//! Warehouse load pipeline
//!
//! Run order:
//! 1. Validate every record and extract all dimension rows. Any parse error
//!    stops the run here, before anything is written.
//! 2. Load songs, artists, time and users, one batch each.
//! 3. Extract songplays (resolving against the committed songs/artists) and
//!    load them.
//!
//! A failed batch is rolled back and recorded in the [`PipelineReport`]; the
//! remaining tables still load. A store error while resolving songplays counts
//! as a failed songplays batch. Re-running after a partial failure is safe
//! because every upsert is idempotent.

use crate::db::SongplayRow;
use crate::error::{EtlError, EtlResult, LoadError};
use crate::extract::{extract_artists, extract_songplays, extract_songs, extract_time, extract_users};
use crate::loader::{self, Upsert};
use crate::records::{parse_log_events, parse_song_records, JsonLinesSource, RawRecord};
use crate::resolver::Resolver;
use sqlx::SqlitePool;
use std::path::Path;

/// Outcome of one table batch
#[derive(Debug)]
pub struct TableReport {
    pub table: &'static str,
    /// Rows extracted for the batch
    pub extracted: usize,
    /// Rows written, or the reason the batch was rolled back
    pub outcome: Result<u64, LoadError>,
}

/// Per-table outcomes of a pipeline run, in load order
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub tables: Vec<TableReport>,
}

impl PipelineReport {
    /// True when every batch committed
    pub fn is_success(&self) -> bool {
        self.tables.iter().all(|t| t.outcome.is_ok())
    }

    /// Batches that were rolled back
    pub fn failures(&self) -> impl Iterator<Item = &LoadError> {
        self.tables.iter().filter_map(|t| t.outcome.as_ref().err())
    }

    /// Report for one table
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// Rows written to `name`, if its batch committed
    pub fn written(&self, name: &str) -> Option<u64> {
        self.table(name).and_then(|t| t.outcome.as_ref().ok().copied())
    }

    /// Log one summary line per table
    pub fn log_summary(&self) {
        for t in &self.tables {
            match &t.outcome {
                Ok(written) => tracing::info!(
                    table = t.table,
                    extracted = t.extracted,
                    written = *written,
                    "Table loaded"
                ),
                Err(e) => tracing::error!(
                    table = t.table,
                    extracted = t.extracted,
                    error = %e,
                    "Table load failed"
                ),
            }
        }
    }

    async fn load_batch<R: Upsert>(&mut self, pool: &SqlitePool, rows: &[R]) {
        let outcome = loader::load(pool, rows).await;
        if let Err(e) = &outcome {
            tracing::error!(table = R::TABLE, error = %e, "Batch rolled back");
        }
        self.tables.push(TableReport {
            table: R::TABLE,
            extracted: rows.len(),
            outcome,
        });
    }

    /// The songplays batch never started because a resolver query failed
    fn record_failed_lookup(&mut self, source: sqlx::Error) {
        let error = LoadError::batch(SongplayRow::TABLE, source);
        tracing::error!(table = SongplayRow::TABLE, error = %error, "Song resolution failed");
        self.tables.push(TableReport {
            table: SongplayRow::TABLE,
            extracted: 0,
            outcome: Err(error),
        });
    }
}

/// Run the pipeline over raw song-metadata and log-event records
pub async fn run(
    pool: &SqlitePool,
    song_records: &[RawRecord],
    log_records: &[RawRecord],
) -> EtlResult<PipelineReport> {
    let songs_in = parse_song_records(song_records)?;
    let events = parse_log_events(log_records)?;

    let songs = extract_songs(&songs_in);
    let artists = extract_artists(&songs_in);
    let times = extract_time(&events)?;
    let users = extract_users(&events)?;

    tracing::info!(
        songs = songs.len(),
        artists = artists.len(),
        time = times.len(),
        users = users.len(),
        "Dimension rows extracted"
    );

    let mut report = PipelineReport::default();
    report.load_batch(pool, &songs).await;
    report.load_batch(pool, &artists).await;
    report.load_batch(pool, &times).await;
    report.load_batch(pool, &users).await;

    // Dimension batches are committed (or rolled back) at this point
    let resolver = Resolver::new(pool);
    match extract_songplays(&resolver, &events).await {
        Ok(songplays) => report.load_batch(pool, &songplays).await,
        Err(EtlError::Database(e)) => report.record_failed_lookup(e),
        Err(e) => return Err(e),
    }

    Ok(report)
}

/// Read both corpora from disk and run the pipeline
pub async fn run_from_paths(
    pool: &SqlitePool,
    song_data: &Path,
    log_data: &Path,
) -> EtlResult<PipelineReport> {
    let source = JsonLinesSource::new();
    let song_records = source.read_records(song_data)?;
    let log_records = source.read_records(log_data)?;

    run(pool, &song_records, &log_records).await
}
