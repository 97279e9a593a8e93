//! Time dimension rows
//!
//! A time row is a pure function of its timestamp, so re-deriving it always
//! produces the same row and re-inserting it is a no-op.

use crate::loader::Upsert;
use chrono::{DateTime, Datelike, Timelike, Utc};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// Row of the `time` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: DateTime<Utc>,
    pub hour: u32,
    pub day: u32,
    /// ISO 8601 week number (week 1 holds the year's first Thursday)
    pub week: u32,
    pub month: u32,
    /// Calendar year, which can differ from the ISO week-numbering year
    pub year: i32,
    /// Monday = 0 … Sunday = 6
    pub weekday: u32,
}

impl TimeRow {
    /// Decompose a UTC timestamp into calendar parts
    pub fn from_start_time(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            hour: start_time.hour(),
            day: start_time.day(),
            week: start_time.iso_week().week(),
            month: start_time.month(),
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_monday(),
        }
    }
}

impl Upsert for TimeRow {
    const TABLE: &'static str = "time";

    fn upsert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            r#"
            INSERT INTO time (start_time, hour, day, week, month, year, weekday)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(start_time) DO NOTHING
            "#,
        )
        .bind(self.start_time)
        .bind(self.hour)
        .bind(self.day)
        .bind(self.week)
        .bind(self.month)
        .bind(self.year)
        .bind(self.weekday)
    }
}
