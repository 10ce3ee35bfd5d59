//! Reconciliation of required and applied migration sequences.
//!
//! [`diff`] is pure: it performs no I/O and keeps no state. Both inputs must
//! already be sorted ascending by name; ordering is the loaders' contract
//! and is not re-checked here.

use crate::error::ErrorKind;
use crate::migration::{Migration, MigrationName};
use thiserror::Error;

/// The applied history cannot be reconciled with the required sequence.
///
/// Neither variant is retryable: a human has to fix the script repository
/// or the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// R001: The ledger has more entries than the source defines.
    #[error(
        "[R001] The database has more applied migrations than required: applied {applied} but required {required}"
    )]
    LedgerAheadOfSource { applied: usize, required: usize },

    /// R002: An applied migration's content differs from the script at the
    /// same position.
    #[error(
        "[R002] Required migration `{required_name}` differs from migration `{applied_name}` applied as number {index}. \
         Even a single character of difference is significant.\n\n\
         Required query:\n{required_content}\n\
         Applied query:\n{applied_content}"
    )]
    DivergentHistory {
        index: usize,
        required_name: MigrationName,
        applied_name: MigrationName,
        required_content: String,
        applied_content: String,
    },
}

impl ReconcileError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::LedgerAheadOfSource { .. } => ErrorKind::LedgerAheadOfSource,
            ReconcileError::DivergentHistory { .. } => ErrorKind::DivergentHistory,
        }
    }
}

/// Compute the migrations in `required` that still have to be applied.
///
/// `applied` must be a content-identical prefix of `required`, compared
/// position by position. Names are not compared: a migration renamed after
/// it was applied is accepted as long as its content is unchanged.
///
/// Returns the suffix `required[applied.len()..]` in its original order. An
/// empty suffix means the database is up to date.
pub fn diff<'a>(
    required: &'a [Migration],
    applied: &[Migration],
) -> Result<&'a [Migration], ReconcileError> {
    if required.len() < applied.len() {
        return Err(ReconcileError::LedgerAheadOfSource {
            applied: applied.len(),
            required: required.len(),
        });
    }

    if let Some((index, (req, app))) = required
        .iter()
        .zip(applied)
        .enumerate()
        .find(|(_, (req, app))| req.content() != app.content())
    {
        return Err(ReconcileError::DivergentHistory {
            index,
            required_name: req.name().clone(),
            applied_name: app.name().clone(),
            required_content: req.content().to_string(),
            applied_content: app.content().to_string(),
        });
    }

    Ok(&required[applied.len()..])
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
