//! Test helpers shared by the integration tests
//!
//! Each test gets its own warehouse file and data folders inside a TempDir;
//! the TempDir must be kept alive for the duration of the test.

#![allow(dead_code)]

use serde_json::{json, Value};
use sparkify_etl::records::RawRecord;
use sqlx::SqlitePool;
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary warehouse with the schema applied
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pool = sparkify_common::db::init_database(&temp_dir.path().join("sparkify.db"))
        .await
        .expect("Failed to initialize test database");
    (temp_dir, pool)
}

/// Row count of a table
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("Count query failed")
}

/// Unwrap a JSON object into a raw record
pub fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be a JSON object, got {}", other),
    }
}

/// Song-metadata record in the corpus layout
pub fn song_json(song_id: &str, title: &str, artist_id: &str, artist_name: &str, duration: f64) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": 0
    })
}

/// Log event in the corpus layout
pub fn event_json(ts: i64, page: &str, user_id: &str, level: &str, song: Option<(&str, &str, f64)>) -> Value {
    let (title, artist, length) = match song {
        Some((t, a, l)) => (json!(t), json!(a), json!(l)),
        None => (Value::Null, Value::Null, Value::Null),
    };
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Jacqueline",
        "gender": "F",
        "itemInSession": 0,
        "lastName": "Lynch",
        "length": length,
        "level": level,
        "location": "Atlanta-Sandy Springs-Roswell, GA",
        "method": "PUT",
        "page": page,
        "registration": 1540223723796.0_f64,
        "sessionId": 389,
        "song": title,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_4)",
        "userId": user_id
    })
}

/// Write records as one JSON object per line
pub fn write_json_lines(path: &Path, records: &[Value]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture folder");
    }
    let body: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    std::fs::write(path, body.join("\n") + "\n").expect("Failed to write fixture");
}
