//! Song/artist resolution for play events
//!
//! A play event only names its song (title, artist name, duration). The
//! resolver maps those to the warehouse identifiers by an exact equality join
//! over committed `songs` and `artists` rows. No fuzzy matching: a play whose
//! song metadata was never loaded resolves to `None`.

use crate::records::LogEvent;
use sqlx::SqlitePool;

/// Identifier pair of a resolved song
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SongRef {
    pub song_id: String,
    pub artist_id: String,
}

/// Read-only lookup into committed dimension rows
pub struct Resolver<'p> {
    pool: &'p SqlitePool,
}

impl<'p> Resolver<'p> {
    pub fn new(pool: &'p SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up the song matching title, artist name and duration exactly
    ///
    /// When several songs share all three values any one of them is returned;
    /// the ambiguity is logged at debug level.
    pub async fn resolve(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongRef>, sqlx::Error> {
        // LIMIT 2 is enough to tell a unique match from an ambiguous one
        let mut matches: Vec<SongRef> = sqlx::query_as(
            r#"
            SELECT s.song_id, s.artist_id
            FROM songs s
            JOIN artists a ON s.artist_id = a.artist_id
            WHERE s.title = ? AND a.name = ? AND s.duration = ?
            LIMIT 2
            "#,
        )
        .bind(title)
        .bind(artist_name)
        .bind(duration)
        .fetch_all(self.pool)
        .await?;

        if matches.len() > 1 {
            tracing::debug!(
                title,
                artist = artist_name,
                duration,
                "Ambiguous song match, using first result"
            );
        }

        if matches.is_empty() {
            Ok(None)
        } else {
            Ok(Some(matches.swap_remove(0)))
        }
    }

    /// Resolve the song an event played
    ///
    /// Events lacking a song title, artist or length resolve to `None`
    /// without querying the store.
    pub async fn resolve_event(&self, event: &LogEvent) -> Result<Option<SongRef>, sqlx::Error> {
        match (event.song.as_deref(), event.artist.as_deref(), event.length) {
            (Some(title), Some(artist), Some(length)) => self.resolve(title, artist, length).await,
            _ => Ok(None),
        }
    }
}
