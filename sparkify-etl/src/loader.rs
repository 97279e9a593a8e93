//! Batch loader
//!
//! Every table is loaded through [`load`]: one transaction per batch, one
//! parameterized upsert per row in input order, commit only when every row
//! succeeded. A failing row rolls back the whole batch and comes back as a
//! [`LoadError`]; the caller decides whether to carry on with other tables.

use crate::error::LoadError;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection};
use sqlx::{SqlitePool, Transaction};
use std::time::Instant;

/// A row that knows how to write itself idempotently
pub trait Upsert {
    /// Destination table
    const TABLE: &'static str;

    /// Parameterized insert carrying the table's conflict policy
    fn upsert_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>>;
}

/// Transaction scoped to one table batch
///
/// Logs acquisition and release timing. Dropping it without calling
/// [`commit`](Self::commit) rolls the batch back.
pub struct UnitOfWork<'c> {
    tx: Transaction<'c, Sqlite>,
    table: &'static str,
    acquired_at: Instant,
}

impl<'c> UnitOfWork<'c> {
    /// Begin a transaction for `table`
    pub async fn begin(pool: &'c SqlitePool, table: &'static str) -> Result<Self, LoadError> {
        let start = Instant::now();
        tracing::debug!(table, "Connection acquisition requested");

        let tx = pool
            .begin()
            .await
            .map_err(|e| LoadError::batch(table, e))?;

        tracing::debug!(
            table,
            wait = ?start.elapsed(),
            "Connection acquired"
        );

        Ok(Self {
            tx,
            table,
            acquired_at: Instant::now(),
        })
    }

    /// Connection to execute statements on
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut *self.tx
    }

    /// Commit the batch
    pub async fn commit(self) -> Result<(), LoadError> {
        let Self {
            tx,
            table,
            acquired_at,
        } = self;

        tx.commit().await.map_err(|e| LoadError::batch(table, e))?;

        tracing::debug!(
            table,
            held = ?acquired_at.elapsed(),
            "Connection released (commit)"
        );
        Ok(())
    }

    /// Roll the batch back
    ///
    /// A failed rollback is logged; the transaction is abandoned either way
    /// and SQLite discards it when the connection returns to the pool.
    pub async fn rollback(self) {
        let Self {
            tx,
            table,
            acquired_at,
        } = self;

        if let Err(e) = tx.rollback().await {
            tracing::warn!(table, error = %e, "Rollback failed");
            return;
        }

        tracing::debug!(
            table,
            held = ?acquired_at.elapsed(),
            "Connection released (rollback)"
        );
    }
}

/// Load one batch of rows into their table
///
/// Returns the number of rows the store reports as written. Rows skipped by a
/// DO NOTHING conflict policy count as zero; refreshed rows count as one.
/// An empty batch returns zero without touching the store.
pub async fn load<R: Upsert>(pool: &SqlitePool, rows: &[R]) -> Result<u64, LoadError> {
    let table = R::TABLE;
    if rows.is_empty() {
        tracing::debug!(table, "Empty batch, nothing to load");
        return Ok(0);
    }

    let mut uow = UnitOfWork::begin(pool, table).await?;
    let mut written = 0u64;

    for (index, row) in rows.iter().enumerate() {
        match row.upsert_query().execute(uow.connection()).await {
            Ok(result) => written += result.rows_affected(),
            Err(e) => {
                tracing::error!(table, row = index, error = %e, "Row failed, rolling back batch");
                uow.rollback().await;
                return Err(LoadError::at_row(table, index, e));
            }
        }
    }

    uow.commit().await?;

    tracing::info!(table, rows = rows.len(), written, "Batch committed");
    Ok(written)
}
