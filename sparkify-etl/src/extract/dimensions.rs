//! Dimension extraction
//!
//! Song and artist rows come from song-metadata records; time and user rows
//! come from the song-play subset of the event log. Each extractor keeps the
//! first occurrence of a key and preserves input order otherwise, so a batch
//! never carries two rows for the same primary key.

use crate::db::{ArtistRow, SongRow, TimeRow, UserRow};
use crate::error::ParseError;
use crate::records::{LogEvent, SongRecord};
use std::collections::HashSet;
use std::hash::Hash;

/// Keep the first item for every key, preserving order
fn dedup_by_key<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Project song-metadata records onto `songs` columns
pub fn extract_songs(records: &[SongRecord]) -> Vec<SongRow> {
    let rows = records.iter().map(|r| SongRow {
        song_id: r.song_id.clone(),
        title: r.title.clone(),
        artist_id: r.artist_id.clone(),
        year: r.year,
        duration: r.duration,
    });
    dedup_by_key(rows, |row| row.song_id.clone())
}

/// Project song-metadata records onto `artists` columns
pub fn extract_artists(records: &[SongRecord]) -> Vec<ArtistRow> {
    let rows = records.iter().map(|r| ArtistRow {
        artist_id: r.artist_id.clone(),
        name: r.artist_name.clone(),
        location: r.artist_location.clone(),
        latitude: r.artist_latitude,
        longitude: r.artist_longitude,
    });
    dedup_by_key(rows, |row| row.artist_id.clone())
}

/// Decompose song-play timestamps into `time` rows
///
/// A timestamp that cannot be represented fails the whole extraction.
pub fn extract_time(events: &[LogEvent]) -> Result<Vec<TimeRow>, ParseError> {
    let rows = events
        .iter()
        .filter(|e| e.is_song_play())
        .map(|e| e.start_time().map(TimeRow::from_start_time))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dedup_by_key(rows, |row| row.start_time))
}

/// Project song plays by identified users onto `users` columns
///
/// The first occurrence of each user is kept. Its level may be stale; the
/// users upsert refreshes `level` on every load, so repeated runs converge on
/// the latest value.
pub fn extract_users(events: &[LogEvent]) -> Result<Vec<UserRow>, ParseError> {
    let mut rows = Vec::new();
    for event in events.iter().filter(|e| e.is_song_play()) {
        let Some(user_id) = event.numeric_user_id()? else {
            continue;
        };
        rows.push(UserRow {
            user_id,
            first_name: event.first_name.clone(),
            last_name: event.last_name.clone(),
            gender: event.gender.clone(),
            level: event.level.clone(),
        });
    }
    Ok(dedup_by_key(rows, |row| row.user_id))
}
