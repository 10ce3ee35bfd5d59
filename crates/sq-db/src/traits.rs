//! Collaborator contracts consumed by the applier

use crate::error::DbResult;
use sq_core::Migration;

/// Runs change-scripts against the target database.
///
/// Implementations execute inside whatever transaction the caller has open;
/// they never begin, commit, or roll back on their own.
pub trait Executor {
    /// Execute `sql` (possibly several statements) as one unit.
    fn execute_script(&self, sql: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// Persistent record of applied migrations.
pub trait MigrationLedger {
    /// Create the ledger table if it does not exist. Idempotent.
    fn ensure_exists(&self) -> DbResult<()>;

    /// All recorded migrations, sorted ascending by name.
    fn load_all(&self) -> DbResult<Vec<Migration>>;

    /// Record `migration` as applied. Fails if its name is already present.
    fn append(&self, migration: &Migration) -> DbResult<()>;
}
