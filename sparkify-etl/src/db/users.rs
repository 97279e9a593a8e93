//! User dimension rows

use crate::loader::Upsert;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};

/// Row of the `users` table
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl Upsert for UserRow {
    const TABLE: &'static str = "users";

    // Subscription level follows the latest load; identity fields are fixed
    // at first insert
    fn upsert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, first_name, last_name, gender, level)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                level = excluded.level
            "#,
        )
        .bind(self.user_id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.gender)
        .bind(&self.level)
    }
}
