//! Migration applier.
//!
//! [`migrate`] runs entirely inside the caller's transaction: it never
//! begins, commits, or rolls back. A failure at any step returns
//! immediately, and the caller rolls back so no partial progress is kept.
//!
//! Runs are not safe to execute concurrently from several processes against
//! the same database. Two runs could both see the same pending set and apply
//! it twice. Callers that may race must hold an external lock (or use an
//! isolation level that serialises the ledger table) for the whole call.

use crate::error::{ApplyError, ApplyResult};
use serde::Serialize;
use sq_core::{diff, Migration, MigrationName, MigrationSource};
use sq_db::{Executor, MigrationLedger};
use std::path::Path;

/// Outcome of a successful [`migrate`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Migrations applied by this run, in application order.
    pub applied: Vec<MigrationName>,
    /// Migrations that were already recorded before this run.
    pub already_applied: usize,
}

impl MigrationReport {
    /// True when nothing needed to be applied.
    pub fn is_up_to_date(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Applied and pending migrations, computed without executing anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    pub applied: Vec<Migration>,
    pub pending: Vec<Migration>,
}

/// Bring the database up to date with the migrations at `path`.
///
/// Ensures the ledger exists, loads both sequences, reconciles them, then
/// applies each pending migration in order: execute its script, then record
/// it in the ledger. The first failure stops the run.
pub fn migrate<E, L, S>(
    executor: &E,
    ledger: &L,
    source: &S,
    path: &Path,
) -> ApplyResult<MigrationReport>
where
    E: Executor + ?Sized,
    L: MigrationLedger + ?Sized,
    S: MigrationSource + ?Sized,
{
    log::debug!("Reconciling against {} database", executor.db_type());
    let (required, applied) = load_sequences(ledger, source, path)?;
    let pending = diff(&required, &applied).inspect_err(warn_inconsistent)?;

    if pending.is_empty() {
        log::info!(
            "Database is up to date ({} migration(s) applied)",
            applied.len()
        );
    }

    let mut report = MigrationReport {
        applied: Vec::with_capacity(pending.len()),
        already_applied: applied.len(),
    };
    for migration in pending {
        apply_one(executor, ledger, migration)?;
        report.applied.push(migration.name().clone());
    }
    Ok(report)
}

/// Report which migrations are applied and which are pending.
///
/// Runs the same bootstrap, load, and reconcile steps as [`migrate`] but
/// executes nothing and writes nothing beyond creating the ledger table.
pub fn plan<L, S>(ledger: &L, source: &S, path: &Path) -> ApplyResult<MigrationPlan>
where
    L: MigrationLedger + ?Sized,
    S: MigrationSource + ?Sized,
{
    let (required, applied) = load_sequences(ledger, source, path)?;
    let pending = diff(&required, &applied)
        .inspect_err(warn_inconsistent)?
        .to_vec();
    Ok(MigrationPlan { applied, pending })
}

fn load_sequences<L, S>(
    ledger: &L,
    source: &S,
    path: &Path,
) -> ApplyResult<(Vec<Migration>, Vec<Migration>)>
where
    L: MigrationLedger + ?Sized,
    S: MigrationSource + ?Sized,
{
    ledger.ensure_exists().map_err(ApplyError::LedgerInitFailed)?;

    let required = source
        .load(path)
        .map_err(|e| ApplyError::SourceLoadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
    let applied = ledger.load_all().map_err(ApplyError::LedgerLoadFailed)?;

    log::debug!(
        "{} required migration(s), {} applied",
        required.len(),
        applied.len()
    );
    Ok((required, applied))
}

fn apply_one<E, L>(executor: &E, ledger: &L, migration: &Migration) -> ApplyResult<()>
where
    E: Executor + ?Sized,
    L: MigrationLedger + ?Sized,
{
    log::info!("Applying migration {}", migration.name());

    executor
        .execute_script(migration.content())
        .map_err(|e| ApplyError::ExecutionFailed {
            name: migration.name().clone(),
            source: e,
        })?;

    ledger
        .append(migration)
        .map_err(|e| ApplyError::LedgerWriteFailed {
            name: migration.name().clone(),
            source: e,
        })
}

fn warn_inconsistent(err: &sq_core::ReconcileError) {
    log::warn!("Migration history is inconsistent ({})", err.kind());
}

#[cfg(test)]
#[path = "applier_test.rs"]
mod tests;
