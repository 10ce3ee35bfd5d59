//! Error types for sq-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Script or statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Transaction management error (D003)
    #[error("[D003] Transaction failed: {0}")]
    TransactionError(String),

    /// Duplicate ledger entry (D004)
    #[error("[D004] Migration '{0}' is already recorded in the ledger")]
    DuplicateEntry(String),

    /// Ledger row that cannot be turned into a migration (D005)
    #[error("[D005] Corrupt ledger row: {0}")]
    CorruptLedger(String),

    /// DuckDB driver error with preserved source chain (D006)
    #[error("[D006] DuckDB error")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::DuckDb(err)
    }
}

/// Whether a DuckDB error message reports a UNIQUE/PRIMARY KEY violation.
///
/// duckdb::Error does not expose structured constraint variants, so this
/// matches the message text.
pub(crate) fn is_unique_violation(err: &duckdb::Error) -> bool {
    let msg = err.to_string();
    msg.contains("Duplicate key")
        || (msg.contains("Constraint Error")
            && (msg.contains("unique") || msg.contains("primary key")))
}
