//! Song dimension rows

use crate::loader::Upsert;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// Row of the `songs` table
#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i64,
    pub duration: f64,
}

impl Upsert for SongRow {
    const TABLE: &'static str = "songs";

    // Write-once: an existing song keeps its original values
    fn upsert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            r#"
            INSERT INTO songs (song_id, title, artist_id, year, duration)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(song_id) DO NOTHING
            "#,
        )
        .bind(&self.song_id)
        .bind(&self.title)
        .bind(&self.artist_id)
        .bind(self.year)
        .bind(self.duration)
    }
}
