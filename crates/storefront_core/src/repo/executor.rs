//! Deadline-bounded statement execution.
//!
//! # Responsibility
//! - Prepare and run parameterized statements on a borrowed connection.
//! - Install a per-operation deadline through SQLite's progress handler and
//!   remove it afterwards.
//! - Classify driver failures into `RepoError`.
//!
//! # Invariants
//! - A deadline covers the whole operation, including every statement run
//!   inside `snapshot`.
//! - The progress handler never outlives the operation that installed it.

use super::{classify_sqlite_error, RepoError, RepoResult};
use crate::config::StoreConfig;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::cell::Cell;
use std::time::{Duration, Instant};

/// VM instructions between deadline checks.
const DEADLINE_CHECK_INTERVAL: i32 = 1_000;

/// Runs statements against one connection under a fixed deadline.
pub struct SqliteExecutor<'conn> {
    conn: &'conn Connection,
    timeout: Duration,
    active_deadline: Cell<Option<Instant>>,
}

impl<'conn> SqliteExecutor<'conn> {
    pub fn new(conn: &'conn Connection, config: &StoreConfig) -> Self {
        Self::with_timeout(conn, config.query_timeout())
    }

    pub fn with_timeout(conn: &'conn Connection, timeout: Duration) -> Self {
        Self {
            conn,
            timeout,
            active_deadline: Cell::new(None),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs a query and decodes every row. Fails on the first bad row.
    pub fn fetch_all<T, F>(&self, sql: &str, args: &[Value], mut decode: F) -> RepoResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.bounded(sql, |conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let mut rows = stmt.query(params_from_iter(args))?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                out.push(decode(row)?);
            }
            Ok(out)
        })
    }

    /// Runs a query expected to yield at most one row.
    pub fn fetch_optional<T, F>(
        &self,
        sql: &str,
        args: &[Value],
        mut decode: F,
    ) -> RepoResult<Option<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.bounded(sql, |conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let mut rows = stmt.query(params_from_iter(args))?;
            match rows.next()? {
                Some(row) => Ok(Some(decode(row)?)),
                None => Ok(None),
            }
        })
    }

    /// Executes a statement and returns the number of changed rows.
    pub fn execute(&self, sql: &str, args: &[Value]) -> RepoResult<usize> {
        self.bounded(sql, |conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            stmt.execute(params_from_iter(args))
        })
    }

    /// Runs `op` inside one transaction under one deadline.
    ///
    /// Reads inside `op` observe a single snapshot. When the connection is
    /// already inside a transaction, that transaction is reused.
    pub fn snapshot<T, F>(&self, op: F) -> RepoResult<T>
    where
        F: FnOnce() -> RepoResult<T>,
    {
        if !self.conn.is_autocommit() {
            return self.with_deadline(op);
        }

        // Begin and rollback/commit run outside the deadline so an expired
        // handler cannot interrupt them.
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|err| self.classify(err))?;
        let value = self.with_deadline(op)?;
        tx.commit().map_err(|err| self.classify(err))?;
        Ok(value)
    }

    fn bounded<T, F>(&self, sql: &str, op: F) -> RepoResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let started_at = Instant::now();
        let result = self.with_deadline(|| op(self.conn).map_err(|err| self.classify(err)));
        let duration_ms = started_at.elapsed().as_millis();

        match &result {
            Ok(_) => debug!(
                "event=db_query module=repo status=ok duration_ms={duration_ms} statement={}",
                statement_kind(sql)
            ),
            Err(RepoError::Timeout { .. }) => warn!(
                "event=db_query module=repo status=timeout duration_ms={duration_ms} statement={} timeout_ms={}",
                statement_kind(sql),
                self.timeout.as_millis()
            ),
            Err(_) => debug!(
                "event=db_query module=repo status=error duration_ms={duration_ms} statement={}",
                statement_kind(sql)
            ),
        }
        result
    }

    /// Installs a deadline unless an enclosing operation already did.
    fn with_deadline<T, F>(&self, op: F) -> RepoResult<T>
    where
        F: FnOnce() -> RepoResult<T>,
    {
        if self.active_deadline.get().is_some() {
            return op();
        }

        let deadline = Instant::now() + self.timeout;
        let _guard = DeadlineGuard::install(self, deadline);
        op()
    }

    fn classify(&self, err: rusqlite::Error) -> RepoError {
        let now = Instant::now();
        let deadline = self.active_deadline.get();
        let deadline_passed = deadline.is_some_and(|deadline| now >= deadline);
        let elapsed = deadline
            .and_then(|deadline| deadline.checked_sub(self.timeout))
            .map(|started_at| now.saturating_duration_since(started_at))
            .unwrap_or_default();
        classify_sqlite_error(err, deadline_passed, elapsed)
    }
}

/// Clears the progress handler when the operation ends, on every path.
struct DeadlineGuard<'a, 'conn> {
    executor: &'a SqliteExecutor<'conn>,
}

impl<'a, 'conn> DeadlineGuard<'a, 'conn> {
    fn install(executor: &'a SqliteExecutor<'conn>, deadline: Instant) -> Self {
        executor.active_deadline.set(Some(deadline));
        executor.conn.progress_handler(
            DEADLINE_CHECK_INTERVAL,
            Some(move || Instant::now() >= deadline),
        );
        Self { executor }
    }
}

impl Drop for DeadlineGuard<'_, '_> {
    fn drop(&mut self) {
        self.executor
            .conn
            .progress_handler(0, None::<fn() -> bool>);
        self.executor.active_deadline.set(None);
    }
}

/// Leading SQL keyword; statement text and bound values stay out of logs.
fn statement_kind(sql: &str) -> &str {
    sql.split_whitespace().next().unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::{statement_kind, SqliteExecutor};
    use crate::db::open_db_in_memory;
    use crate::repo::RepoError;
    use rusqlite::types::Value;
    use std::time::Duration;

    #[test]
    fn fetch_all_binds_positional_values() {
        let conn = open_db_in_memory().unwrap();
        let exec = SqliteExecutor::with_timeout(&conn, Duration::from_secs(3));
        exec.execute(
            "INSERT INTO categories (name) VALUES (?1), (?2)",
            &[Value::from("Books".to_string()), Value::from("Games".to_string())],
        )
        .unwrap();

        let names = exec
            .fetch_all(
                "SELECT name FROM categories WHERE name <> ?1 ORDER BY id",
                &[Value::from("Games".to_string())],
                |row| row.get::<_, String>(0),
            )
            .unwrap();
        assert_eq!(names, vec!["Books".to_string()]);
    }

    #[test]
    fn fetch_optional_returns_none_on_empty_result() {
        let conn = open_db_in_memory().unwrap();
        let exec = SqliteExecutor::with_timeout(&conn, Duration::from_secs(3));
        let row = exec
            .fetch_optional(
                "SELECT id FROM categories WHERE id = ?1",
                &[Value::Integer(7)],
                |row| row.get::<_, i64>(0),
            )
            .unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn zero_deadline_interrupts_long_statement() {
        let conn = open_db_in_memory().unwrap();
        let exec = SqliteExecutor::with_timeout(&conn, Duration::ZERO);
        let err = exec
            .fetch_all(
                "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 1000000) \
                 SELECT count(*) FROM n",
                &[],
                |row| row.get::<_, i64>(0),
            )
            .unwrap_err();
        assert!(matches!(err, RepoError::Timeout { .. }), "{err:?}");
    }

    #[test]
    fn handler_is_cleared_after_timeout() {
        let conn = open_db_in_memory().unwrap();
        let quick = SqliteExecutor::with_timeout(&conn, Duration::ZERO);
        let _ = quick.fetch_all(
            "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 1000000) \
             SELECT count(*) FROM n",
            &[],
            |row| row.get::<_, i64>(0),
        );

        let count: i64 = conn
            .query_row(
                "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 100000) \
                 SELECT count(*) FROM n",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 100_000);
    }

    #[test]
    fn snapshot_rolls_back_on_error() {
        let conn = open_db_in_memory().unwrap();
        let exec = SqliteExecutor::with_timeout(&conn, Duration::from_secs(3));
        let result: Result<(), RepoError> = exec.snapshot(|| {
            exec.execute(
                "INSERT INTO categories (name) VALUES (?1)",
                &[Value::from("Temp".to_string())],
            )?;
            Err(RepoError::InvalidData("abort".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = conn
            .query_row("SELECT count(*) FROM categories", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn statement_kind_is_first_keyword() {
        assert_eq!(statement_kind("  SELECT id FROM users"), "SELECT");
        assert_eq!(statement_kind(""), "unknown");
    }
}
