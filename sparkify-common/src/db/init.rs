//! Database initialization
//!
//! Opens (or creates) the warehouse file and makes sure the five star-schema
//! tables exist. Table creation is idempotent; existing tables and rows are
//! never altered.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Tables in the order they must be loaded
///
/// Dimensions first, the fact table last: fact rows are resolved against
/// committed song and artist rows.
pub const LOAD_ORDER: [&str; 5] = ["songs", "artists", "time", "users", "songplays"];

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all warehouse tables (safe to call multiple times)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_songs_table(pool).await?;
    create_artists_table(pool).await?;
    create_time_table(pool).await?;
    create_users_table(pool).await?;
    create_songplays_table(pool).await?;

    info!("Warehouse schema ready ({})", LOAD_ORDER.join(", "));
    Ok(())
}

async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            song_id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            artist_id TEXT NOT NULL,
            year INTEGER NOT NULL,
            duration REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Resolver lookups filter on title + duration
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_songs_title_duration ON songs(title, duration)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            artist_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            location TEXT,
            latitude REAL,
            longitude REAL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_artists_name ON artists(name)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_time_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time (
            start_time TEXT PRIMARY KEY,
            hour INTEGER NOT NULL,
            day INTEGER NOT NULL,
            week INTEGER NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            weekday INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            first_name TEXT,
            last_name TEXT,
            gender TEXT,
            level TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_songplays_table(pool: &SqlitePool) -> Result<()> {
    // song_id/artist_id stay NULL for plays whose song metadata was never loaded,
    // so no foreign keys are declared
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songplays (
            songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_time TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            level TEXT,
            song_id TEXT,
            artist_id TEXT,
            session_id INTEGER NOT NULL,
            location TEXT,
            user_agent TEXT,
            UNIQUE(start_time, user_id, session_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
