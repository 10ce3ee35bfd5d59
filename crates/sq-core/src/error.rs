//! Error types for sq-core

use std::fmt;
use thiserror::Error;

/// Core error type for Sequent
#[derive(Error, Debug)]
pub enum CoreError {
    /// S001: Configuration file not found
    #[error("[S001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// S002: Invalid configuration value
    #[error("[S002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// S003: Unknown named target
    #[error("[S003] Target '{name}' is not defined in config (available: {available})")]
    UnknownTarget { name: String, available: String },

    /// S004: Migration directory missing or not a directory
    #[error("[S004] Migration directory not found: {path}")]
    SourceDirNotFound { path: String },

    /// S005: Migration file name is not valid UTF-8
    #[error("[S005] Migration file name is not valid UTF-8: {path}")]
    InvalidFileName { path: String },

    /// S006: IO error with file path context
    #[error("[S006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// Classification of every way a reconciliation run can fail.
///
/// Shared by [`crate::ReconcileError`] and the applier's error type so
/// callers can branch on the failure class without matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The migration source could not be read.
    SourceLoadFailed,
    /// The ledger table could not be created.
    LedgerInitFailed,
    /// The ledger could not be queried.
    LedgerLoadFailed,
    /// The ledger records more migrations than the source defines.
    LedgerAheadOfSource,
    /// An applied migration's content differs from the source.
    DivergentHistory,
    /// A pending migration's script failed.
    ExecutionFailed,
    /// A migration ran but could not be recorded in the ledger.
    LedgerWriteFailed,
    /// The enclosing transaction could not begin or commit; nothing was kept.
    TransactionFailed,
}

impl ErrorKind {
    /// Whether re-running the whole migration can succeed without changing
    /// the script repository or the ledger.
    ///
    /// Only failures that leave nothing applied qualify.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::SourceLoadFailed
                | ErrorKind::LedgerInitFailed
                | ErrorKind::LedgerLoadFailed
                | ErrorKind::TransactionFailed
        )
    }

    /// Whether the failure is a structural mismatch between recorded and
    /// required history.
    pub fn is_history_inconsistency(self) -> bool {
        matches!(
            self,
            ErrorKind::LedgerAheadOfSource | ErrorKind::DivergentHistory
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::SourceLoadFailed => "source_load_failed",
            ErrorKind::LedgerInitFailed => "ledger_init_failed",
            ErrorKind::LedgerLoadFailed => "ledger_load_failed",
            ErrorKind::LedgerAheadOfSource => "ledger_ahead_of_source",
            ErrorKind::DivergentHistory => "divergent_history",
            ErrorKind::ExecutionFailed => "execution_failed",
            ErrorKind::LedgerWriteFailed => "ledger_write_failed",
            ErrorKind::TransactionFailed => "transaction_failed",
        };
        f.write_str(s)
    }
}
