//! Artist dimension rows

use crate::loader::Upsert;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// Row of the `artists` table
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Upsert for ArtistRow {
    const TABLE: &'static str = "artists";

    fn upsert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            r#"
            INSERT INTO artists (artist_id, name, location, latitude, longitude)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(artist_id) DO NOTHING
            "#,
        )
        .bind(&self.artist_id)
        .bind(&self.name)
        .bind(&self.location)
        .bind(self.latitude)
        .bind(self.longitude)
    }
}
