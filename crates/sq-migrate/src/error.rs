//! Error types for the applier.

use sq_core::{CoreError, ErrorKind, MigrationName, ReconcileError};
use sq_db::DbError;
use thiserror::Error;

/// Why a migration run stopped.
///
/// Every variant aborts the run. Once any script has executed, the caller
/// must roll back the enclosing transaction.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// A001: The migration source could not be read.
    #[error("[A001] Failed to load migrations from {path}")]
    SourceLoadFailed {
        path: String,
        #[source]
        source: CoreError,
    },

    /// A002: The ledger table could not be created.
    #[error("[A002] Failed to initialize migration ledger")]
    LedgerInitFailed(#[source] DbError),

    /// A003: The ledger could not be read.
    #[error("[A003] Failed to load applied migrations from ledger")]
    LedgerLoadFailed(#[source] DbError),

    /// Recorded history does not match the source (A004).
    #[error("[A004] {0}")]
    Reconcile(#[from] ReconcileError),

    /// A005: A pending migration's script failed. Nothing after it ran.
    #[error("[A005] Migration {name} failed")]
    ExecutionFailed {
        name: MigrationName,
        #[source]
        source: DbError,
    },

    /// A006: The script ran but its ledger row could not be written.
    ///
    /// The schema change is in the open transaction but unrecorded; the
    /// transaction must be rolled back.
    #[error("[A006] Migration {name} ran but could not be recorded in the ledger; roll back the transaction")]
    LedgerWriteFailed {
        name: MigrationName,
        #[source]
        source: DbError,
    },

    /// A007: The caller's enclosing transaction could not begin or commit.
    ///
    /// Built explicitly by the transaction owner; there is deliberately no
    /// `From<DbError>` for this enum.
    #[error("[A007] Migration transaction failed")]
    Transaction(#[source] DbError),
}

impl ApplyError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplyError::SourceLoadFailed { .. } => ErrorKind::SourceLoadFailed,
            ApplyError::LedgerInitFailed(_) => ErrorKind::LedgerInitFailed,
            ApplyError::LedgerLoadFailed(_) => ErrorKind::LedgerLoadFailed,
            ApplyError::Reconcile(e) => e.kind(),
            ApplyError::ExecutionFailed { .. } => ErrorKind::ExecutionFailed,
            ApplyError::LedgerWriteFailed { .. } => ErrorKind::LedgerWriteFailed,
            ApplyError::Transaction(_) => ErrorKind::TransactionFailed,
        }
    }

    /// Name of the migration being applied when the run stopped, if any.
    pub fn migration_name(&self) -> Option<&MigrationName> {
        match self {
            ApplyError::ExecutionFailed { name, .. }
            | ApplyError::LedgerWriteFailed { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Result type alias for [`ApplyError`].
pub type ApplyResult<T> = Result<T, ApplyError>;
