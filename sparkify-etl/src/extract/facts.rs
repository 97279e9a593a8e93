//! Songplay fact extraction

use crate::db::SongplayRow;
use crate::error::EtlResult;
use crate::records::LogEvent;
use crate::resolver::Resolver;

/// Build one songplay row per song play by an identified user
///
/// Rows keep input order. Foreign keys come from the resolver and stay `None`
/// for plays that match no loaded song. Must run after the song and artist
/// batches are committed.
pub async fn extract_songplays(
    resolver: &Resolver<'_>,
    events: &[LogEvent],
) -> EtlResult<Vec<SongplayRow>> {
    let mut rows = Vec::new();
    let mut unresolved = 0usize;

    for event in events.iter().filter(|e| e.is_song_play()) {
        let Some(user_id) = event.numeric_user_id()? else {
            continue;
        };
        let start_time = event.start_time()?;

        let song = resolver.resolve_event(event).await?;
        if song.is_none() {
            unresolved += 1;
        }
        let (song_id, artist_id) = match song {
            Some(s) => (Some(s.song_id), Some(s.artist_id)),
            None => (None, None),
        };

        rows.push(SongplayRow {
            start_time,
            user_id,
            level: event.level.clone(),
            song_id,
            artist_id,
            session_id: event.session_id,
            location: event.location.clone(),
            user_agent: event.user_agent.clone(),
        });
    }

    tracing::debug!(
        rows = rows.len(),
        unresolved,
        "Songplay extraction complete"
    );
    Ok(rows)
}
