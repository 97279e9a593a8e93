//! End-to-end pipeline tests
//!
//! Covers idempotent re-runs, user level refresh, event filtering, empty
//! inputs, parse-error propagation and per-table failure isolation.

mod helpers;

use helpers::{count_rows, create_test_db, event_json, raw, song_json, write_json_lines};
use sparkify_etl::records::RawRecord;
use sparkify_etl::{run, run_from_paths, EtlError, ParseError};

const TS: i64 = 1_541_121_934_796;

fn song_records() -> Vec<RawRecord> {
    vec![
        raw(song_json("SOZCTXZ12AB0182364", "Setanta matins", "AR5KOSW1187FB35FF4", "Elena", 269.58)),
        raw(song_json("SOUDSGM12AC9618304", "Insatiable", "ARNTLGG11E2835DDB9", "Clueless Kids", 266.39)),
    ]
}

fn log_records() -> Vec<RawRecord> {
    vec![
        raw(event_json(TS, "NextSong", "80", "free", Some(("Setanta matins", "Elena", 269.58)))),
        raw(event_json(TS + 1_000, "NextSong", "80", "free", Some(("Unknown Song", "Nobody", 1.0)))),
        raw(event_json(TS + 2_000, "Home", "81", "paid", None)),
        raw(event_json(TS + 3_000, "NextSong", "", "free", Some(("Insatiable", "Clueless Kids", 266.39)))),
    ]
}

#[tokio::test]
async fn test_full_run_loads_star_schema() {
    let (_dir, pool) = create_test_db().await;

    let report = run(&pool, &song_records(), &log_records()).await.unwrap();

    assert!(report.is_success(), "failures: {:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(count_rows(&pool, "songs").await, 2);
    assert_eq!(count_rows(&pool, "artists").await, 2);
    // Every NextSong event yields a time row, including the anonymous play
    assert_eq!(count_rows(&pool, "time").await, 3);
    assert_eq!(count_rows(&pool, "users").await, 1);
    assert_eq!(count_rows(&pool, "songplays").await, 2);

    let resolved: Vec<(Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT song_id, artist_id FROM songplays ORDER BY start_time",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(
        resolved,
        vec![
            (
                Some("SOZCTXZ12AB0182364".to_string()),
                Some("AR5KOSW1187FB35FF4".to_string())
            ),
            (None, None),
        ]
    );

    let time_parts: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
        "SELECT hour, day, week, month, year, weekday FROM time ORDER BY start_time LIMIT 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(time_parts, (1, 2, 44, 11, 2018, 4));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let (_dir, pool) = create_test_db().await;

    run(&pool, &song_records(), &log_records()).await.unwrap();
    let second = run(&pool, &song_records(), &log_records()).await.unwrap();

    assert!(second.is_success());
    assert_eq!(second.written("songs"), Some(0));
    assert_eq!(second.written("artists"), Some(0));
    assert_eq!(second.written("time"), Some(0));
    assert_eq!(second.written("songplays"), Some(0));

    for (table, expected) in [("songs", 2), ("artists", 2), ("time", 3), ("users", 1), ("songplays", 2)] {
        assert_eq!(count_rows(&pool, table).await, expected, "table {}", table);
    }
}

#[tokio::test]
async fn test_user_level_follows_latest_run() {
    let (_dir, pool) = create_test_db().await;

    let free = vec![raw(event_json(TS, "NextSong", "15", "free", None))];
    run(&pool, &[], &free).await.unwrap();

    let mut upgraded = event_json(TS + 60_000, "NextSong", "15", "paid", None);
    upgraded["firstName"] = "Changed".into();
    upgraded["gender"] = "M".into();
    run(&pool, &[], &[raw(upgraded)]).await.unwrap();

    let (first_name, gender, level): (String, String, String) =
        sqlx::query_as("SELECT first_name, gender, level FROM users WHERE user_id = 15")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(first_name, "Jacqueline");
    assert_eq!(gender, "F");
    assert_eq!(level, "paid");
    assert_eq!(count_rows(&pool, "users").await, 1);
}

#[tokio::test]
async fn test_non_numeric_users_and_other_pages_are_filtered() {
    let (_dir, pool) = create_test_db().await;

    let logs = vec![
        raw(event_json(TS, "NextSong", "", "free", None)),
        raw(event_json(TS + 1, "NextSong", "anonymous", "free", None)),
        raw(event_json(TS + 2, "Logout", "42", "paid", None)),
        raw(event_json(TS + 3, "Home", "", "free", None)),
    ];
    let report = run(&pool, &[], &logs).await.unwrap();

    assert!(report.is_success());
    assert_eq!(count_rows(&pool, "users").await, 0);
    assert_eq!(count_rows(&pool, "songplays").await, 0);
    // Only the two NextSong events produce time rows
    assert_eq!(count_rows(&pool, "time").await, 2);
}

#[tokio::test]
async fn test_empty_inputs_load_nothing() {
    let (_dir, pool) = create_test_db().await;

    let report = run(&pool, &[], &[]).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.tables.len(), 5);
    for table in &report.tables {
        assert_eq!(table.extracted, 0);
        assert_eq!(table.outcome.as_ref().ok(), Some(&0));
    }
}

#[tokio::test]
async fn test_malformed_record_aborts_before_any_load() {
    let (_dir, pool) = create_test_db().await;

    let mut bad = event_json(TS, "NextSong", "80", "free", None);
    bad["ts"] = "yesterday".into();
    let logs = vec![raw(event_json(TS, "NextSong", "80", "free", None)), raw(bad)];

    let err = run(&pool, &song_records(), &logs).await.unwrap_err();

    assert!(matches!(err, EtlError::Parse(ParseError::Record { index: 1, .. })));
    assert_eq!(count_rows(&pool, "songs").await, 0, "no table is loaded after a parse error");
}

#[tokio::test]
async fn test_songplays_failure_keeps_dimensions_committed() {
    let (dir, pool) = create_test_db().await;

    sqlx::query(
        r#"
        CREATE TRIGGER reject_session BEFORE INSERT ON songplays
        WHEN NEW.session_id = 389
        BEGIN
            SELECT RAISE(ABORT, 'songplays unavailable');
        END
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let report = run(&pool, &song_records(), &log_records()).await.unwrap();

    assert!(!report.is_success());
    let failed: Vec<&str> = report.failures().map(|e| e.table).collect();
    assert_eq!(failed, vec!["songplays"]);
    let songplays = report.table("songplays").unwrap();
    assert_eq!(songplays.extracted, 2);

    // Independent re-query on a fresh connection
    let pool2 = sqlx::SqlitePool::connect(&format!(
        "sqlite://{}",
        dir.path().join("sparkify.db").display()
    ))
    .await
    .unwrap();
    assert_eq!(count_rows(&pool2, "songs").await, 2);
    assert_eq!(count_rows(&pool2, "artists").await, 2);
    assert_eq!(count_rows(&pool2, "time").await, 3);
    assert_eq!(count_rows(&pool2, "users").await, 1);
    assert_eq!(count_rows(&pool2, "songplays").await, 0);
}

#[tokio::test]
async fn test_resolver_failure_is_reported_against_songplays() {
    let (_dir, pool) = create_test_db().await;

    sqlx::query("DROP TABLE artists").execute(&pool).await.unwrap();

    let report = run(&pool, &song_records(), &log_records()).await.unwrap();

    assert!(!report.is_success());
    let failed: Vec<&str> = report.failures().map(|e| e.table).collect();
    assert_eq!(failed, vec!["artists", "songplays"]);
    assert_eq!(report.tables.len(), 5);

    let songplays = report.table("songplays").unwrap();
    assert_eq!(songplays.extracted, 0);
    assert!(songplays.outcome.is_err());

    // Batches ahead of the failed lookup stay committed
    assert_eq!(report.written("songs"), Some(2));
    assert_eq!(report.written("time"), Some(3));
    assert_eq!(report.written("users"), Some(1));
    assert_eq!(count_rows(&pool, "songs").await, 2);
    assert_eq!(count_rows(&pool, "users").await, 1);
    assert_eq!(count_rows(&pool, "songplays").await, 0);
}

#[tokio::test]
async fn test_run_from_paths_reads_nested_corpus() {
    let (dir, pool) = create_test_db().await;
    let song_root = dir.path().join("song_data");
    let log_root = dir.path().join("log_data");

    write_json_lines(
        &song_root.join("A/A/A/TRAAAAW128F429D538.json"),
        &[song_json("SOZCTXZ12AB0182364", "Setanta matins", "AR5KOSW1187FB35FF4", "Elena", 269.58)],
    );
    write_json_lines(
        &log_root.join("2018/11/2018-11-02-events.json"),
        &[
            event_json(TS, "NextSong", "80", "free", Some(("Setanta matins", "Elena", 269.58))),
            event_json(TS + 5, "Home", "80", "free", None),
        ],
    );

    let report = run_from_paths(&pool, &song_root, &log_root).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.written("songplays"), Some(1));
    let song_id: Option<String> = sqlx::query_scalar("SELECT song_id FROM songplays")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(song_id.as_deref(), Some("SOZCTXZ12AB0182364"));
}

#[tokio::test]
async fn test_run_from_missing_paths_is_empty_run() {
    let (dir, pool) = create_test_db().await;

    let report = run_from_paths(&pool, &dir.path().join("nope-songs"), &dir.path().join("nope-logs"))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(count_rows(&pool, "songplays").await, 0);
}
