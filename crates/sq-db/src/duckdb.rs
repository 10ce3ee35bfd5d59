//! DuckDB connection wrapper and executor

use crate::error::{DbError, DbResult};
use crate::traits::Executor;
use duckdb::Connection;
use std::path::Path;

/// Owns the DuckDB connection that migrations run against.
///
/// Single-threaded: one migration run uses the connection sequentially, so
/// no `Mutex` is needed.
pub struct DuckDbBackend {
    conn: Connection,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Open (or create) a DuckDB database file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
    /// error.
    ///
    /// Everything `body` does through the borrowed connection commits or
    /// rolls back together. The outer error is a `BEGIN` or `COMMIT`
    /// failure; the inner result is whatever `body` returned.
    pub fn transaction<F, T, E>(&self, body: F) -> DbResult<Result<T, E>>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
    {
        self.begin()?;

        let result = body(&self.conn);

        match &result {
            Ok(_) => {
                if let Err(commit_err) = self.conn.execute_batch("COMMIT") {
                    self.rollback();
                    return Err(DbError::TransactionError(format!(
                        "COMMIT failed: {commit_err}"
                    )));
                }
            }
            Err(_) => self.rollback(),
        }
        Ok(result)
    }

    /// Execute `body` within a transaction that is always rolled back.
    ///
    /// Used for read-only inspection that may still need to create the
    /// ledger table to query it.
    pub fn rollback_after<F, T, E>(&self, body: F) -> DbResult<Result<T, E>>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
    {
        self.begin()?;
        let result = body(&self.conn);
        self.rollback();
        Ok(result)
    }

    fn begin(&self) -> DbResult<()> {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))
    }

    fn rollback(&self) {
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            log::warn!("ROLLBACK failed: {e}");
        }
    }
}

impl Executor for Connection {
    fn execute_script(&self, sql: &str) -> DbResult<()> {
        self.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
