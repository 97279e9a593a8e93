//! Songplay fact rows

use crate::loader::Upsert;
use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// Row of the `songplays` table
///
/// `song_id` and `artist_id` are `None` when the play could not be matched
/// to a loaded song.
#[derive(Debug, Clone, PartialEq)]
pub struct SongplayRow {
    pub start_time: DateTime<Utc>,
    pub user_id: i64,
    pub level: Option<String>,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl Upsert for SongplayRow {
    const TABLE: &'static str = "songplays";

    fn upsert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            r#"
            INSERT INTO songplays (
                start_time, user_id, level, song_id, artist_id,
                session_id, location, user_agent
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(start_time, user_id, session_id) DO NOTHING
            "#,
        )
        .bind(self.start_time)
        .bind(self.user_id)
        .bind(&self.level)
        .bind(&self.song_id)
        .bind(&self.artist_id)
        .bind(self.session_id)
        .bind(&self.location)
        .bind(&self.user_agent)
    }
}
