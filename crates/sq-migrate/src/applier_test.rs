//! Applier tests against in-memory collaborators.

use super::*;
use sq_core::{CoreError, CoreResult, ErrorKind, ReconcileError};
use sq_db::{DbError, DbResult};
use std::cell::{Cell, RefCell};

// ── Fakes ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingExecutor {
    calls: RefCell<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl Executor for RecordingExecutor {
    fn execute_script(&self, sql: &str) -> DbResult<()> {
        self.calls.borrow_mut().push(sql.to_string());
        if self.fail_on == Some(sql) {
            return Err(DbError::ExecutionError(format!("boom: {sql}")));
        }
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "fake"
    }
}

#[derive(Default)]
struct MemoryLedger {
    rows: RefCell<Vec<Migration>>,
    ensure_calls: Cell<usize>,
    fail_ensure: bool,
    fail_load: bool,
    fail_append: bool,
}

impl MemoryLedger {
    fn with_rows(rows: Vec<Migration>) -> Self {
        Self {
            rows: RefCell::new(rows),
            ..Self::default()
        }
    }

    fn names(&self) -> Vec<String> {
        self.rows
            .borrow()
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }
}

impl MigrationLedger for MemoryLedger {
    fn ensure_exists(&self) -> DbResult<()> {
        self.ensure_calls.set(self.ensure_calls.get() + 1);
        if self.fail_ensure {
            return Err(DbError::ExecutionError("cannot create".to_string()));
        }
        Ok(())
    }

    fn load_all(&self) -> DbResult<Vec<Migration>> {
        if self.fail_load {
            return Err(DbError::ExecutionError("cannot read".to_string()));
        }
        let mut rows = self.rows.borrow().clone();
        rows.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(rows)
    }

    fn append(&self, migration: &Migration) -> DbResult<()> {
        if self.fail_append {
            return Err(DbError::ExecutionError("cannot write".to_string()));
        }
        let mut rows = self.rows.borrow_mut();
        if rows.iter().any(|m| m.name() == migration.name()) {
            return Err(DbError::DuplicateEntry(migration.name().to_string()));
        }
        rows.push(migration.clone());
        Ok(())
    }
}

struct StaticSource(Vec<Migration>);

impl MigrationSource for StaticSource {
    fn load(&self, _path: &Path) -> CoreResult<Vec<Migration>> {
        Ok(self.0.clone())
    }
}

struct MissingSource;

impl MigrationSource for MissingSource {
    fn load(&self, path: &Path) -> CoreResult<Vec<Migration>> {
        Err(CoreError::SourceDirNotFound {
            path: path.display().to_string(),
        })
    }
}

fn mig(name: &str, content: &str) -> Migration {
    Migration::new(MigrationName::new(name), content)
}

fn required() -> Vec<Migration> {
    vec![
        mig("001_init.sql", "CREATE TABLE t(x int);"),
        mig("002_add.sql", "ALTER TABLE t ADD y int;"),
    ]
}

fn path() -> &'static Path {
    Path::new("migrations")
}

// ── Success paths ──────────────────────────────────────────────────────

#[test]
fn test_fresh_database_applies_everything_in_order() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger::default();
    let source = StaticSource(required());

    let report = migrate(&executor, &ledger, &source, path()).unwrap();

    assert_eq!(
        *executor.calls.borrow(),
        vec!["CREATE TABLE t(x int);", "ALTER TABLE t ADD y int;"]
    );
    assert_eq!(*ledger.rows.borrow(), required());
    assert_eq!(report.applied, vec!["001_init.sql", "002_add.sql"]);
    assert_eq!(report.already_applied, 0);
    assert_eq!(ledger.ensure_calls.get(), 1);
}

#[test]
fn test_partially_applied_runs_only_the_rest() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger::with_rows(vec![mig("001_init.sql", "CREATE TABLE t(x int);")]);
    let source = StaticSource(required());

    let report = migrate(&executor, &ledger, &source, path()).unwrap();

    assert_eq!(*executor.calls.borrow(), vec!["ALTER TABLE t ADD y int;"]);
    assert_eq!(ledger.names(), vec!["001_init.sql", "002_add.sql"]);
    assert_eq!(report.applied, vec!["002_add.sql"]);
    assert_eq!(report.already_applied, 1);
}

#[test]
fn test_second_run_is_a_no_op() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger::default();
    let source = StaticSource(required());

    migrate(&executor, &ledger, &source, path()).unwrap();
    let calls_after_first = executor.calls.borrow().len();
    let report = migrate(&executor, &ledger, &source, path()).unwrap();

    assert_eq!(executor.calls.borrow().len(), calls_after_first);
    assert!(report.is_up_to_date());
    assert_eq!(report.already_applied, 2);
}

#[test]
fn test_empty_source_and_ledger() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger::default();
    let report = migrate(&executor, &ledger, &StaticSource(vec![]), path()).unwrap();
    assert!(report.is_up_to_date());
    assert!(executor.calls.borrow().is_empty());
}

#[test]
fn test_renamed_applied_migration_is_accepted() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger::with_rows(vec![mig("001_old_name.sql", "CREATE TABLE t(x int);")]);
    let source = StaticSource(required());

    let report = migrate(&executor, &ledger, &source, path()).unwrap();
    assert_eq!(report.applied, vec!["002_add.sql"]);
}

// ── Reconciliation failures ────────────────────────────────────────────

#[test]
fn test_divergent_history_executes_nothing() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger::with_rows(vec![mig("001_init.sql", "CREATE TABLE t(x);")]);
    let source = StaticSource(required());

    let err = migrate(&executor, &ledger, &source, path()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DivergentHistory);
    match err {
        ApplyError::Reconcile(ReconcileError::DivergentHistory {
            index,
            required_content,
            applied_content,
            ..
        }) => {
            assert_eq!(index, 0);
            assert_eq!(required_content, "CREATE TABLE t(x int);");
            assert_eq!(applied_content, "CREATE TABLE t(x);");
        }
        other => panic!("expected DivergentHistory, got {other:?}"),
    }
    assert!(executor.calls.borrow().is_empty());
    assert_eq!(ledger.names(), vec!["001_init.sql"]);
}

#[test]
fn test_ledger_ahead_of_source() {
    let executor = RecordingExecutor::default();
    let mut rows = required();
    rows.push(mig("003_gone.sql", "DROP TABLE t;"));
    let ledger = MemoryLedger::with_rows(rows);

    let err = migrate(&executor, &ledger, &StaticSource(required()), path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LedgerAheadOfSource);
    assert!(executor.calls.borrow().is_empty());
}

// ── Load failures ──────────────────────────────────────────────────────

#[test]
fn test_source_failure() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger::default();
    let err = migrate(&executor, &ledger, &MissingSource, path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceLoadFailed);
    assert!(err.kind().is_retryable());
    assert!(matches!(
        err,
        ApplyError::SourceLoadFailed {
            source: CoreError::SourceDirNotFound { .. },
            ..
        }
    ));
}

#[test]
fn test_ledger_init_failure() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger {
        fail_ensure: true,
        ..MemoryLedger::default()
    };
    let err = migrate(&executor, &ledger, &StaticSource(required()), path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LedgerInitFailed);
    assert!(executor.calls.borrow().is_empty());
}

#[test]
fn test_ledger_load_failure() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger {
        fail_load: true,
        ..MemoryLedger::default()
    };
    let err = migrate(&executor, &ledger, &StaticSource(required()), path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LedgerLoadFailed);
    assert!(executor.calls.borrow().is_empty());
}

// ── Application failures ───────────────────────────────────────────────

#[test]
fn test_execution_failure_stops_immediately() {
    let executor = RecordingExecutor {
        fail_on: Some("CREATE TABLE t(x int);"),
        ..RecordingExecutor::default()
    };
    let ledger = MemoryLedger::default();

    let err = migrate(&executor, &ledger, &StaticSource(required()), path()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ExecutionFailed);
    assert_eq!(err.migration_name().unwrap(), "001_init.sql");
    assert_eq!(executor.calls.borrow().len(), 1);
    assert!(ledger.rows.borrow().is_empty());
}

#[test]
fn test_execution_failure_mid_run_keeps_earlier_ledger_rows_for_rollback() {
    let executor = RecordingExecutor {
        fail_on: Some("ALTER TABLE t ADD y int;"),
        ..RecordingExecutor::default()
    };
    let ledger = MemoryLedger::default();

    let err = migrate(&executor, &ledger, &StaticSource(required()), path()).unwrap_err();

    assert_eq!(err.migration_name().unwrap(), "002_add.sql");
    // The first migration was recorded inside the caller's transaction.
    assert_eq!(ledger.names(), vec!["001_init.sql"]);
}

#[test]
fn test_ledger_write_failure_is_distinguishable() {
    let executor = RecordingExecutor::default();
    let ledger = MemoryLedger {
        fail_append: true,
        ..MemoryLedger::default()
    };

    let err = migrate(&executor, &ledger, &StaticSource(required()), path()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LedgerWriteFailed);
    assert!(!err.kind().is_retryable());
    assert_eq!(err.migration_name().unwrap(), "001_init.sql");
    assert_eq!(*executor.calls.borrow(), vec!["CREATE TABLE t(x int);"]);
    assert!(err.to_string().contains("roll back"));
}

// ── Plan ───────────────────────────────────────────────────────────────

#[test]
fn test_plan_executes_nothing() {
    let ledger = MemoryLedger::with_rows(vec![mig("001_init.sql", "CREATE TABLE t(x int);")]);
    let plan = plan(&ledger, &StaticSource(required()), path()).unwrap();

    assert_eq!(plan.applied, vec![mig("001_init.sql", "CREATE TABLE t(x int);")]);
    assert_eq!(plan.pending, vec![mig("002_add.sql", "ALTER TABLE t ADD y int;")]);
    assert_eq!(ledger.names(), vec!["001_init.sql"]);
}

#[test]
fn test_plan_reports_divergence() {
    let ledger = MemoryLedger::with_rows(vec![mig("001_init.sql", "changed")]);
    let err = plan(&ledger, &StaticSource(required()), path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DivergentHistory);
}
