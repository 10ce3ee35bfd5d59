//! Migrate command implementation

use anyhow::Result;
use sq_db::DuckDbLedger;
use sq_migrate::ApplyError;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{report_apply_error, ProjectContext};

/// Apply every pending migration inside a single transaction.
///
/// Not safe to run concurrently against the same database from several
/// processes; serialise deployments externally.
pub fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let dir = ctx.migrations_dir(args.migrations_dir.as_deref());
    let source = ctx.source();
    let db = ctx.open_database(global)?;

    let result = db
        .transaction(|conn| {
            let ledger = DuckDbLedger::with_table(conn, ctx.config.ledger_table.as_str());
            sq_migrate::migrate(conn, &ledger, &source, &dir)
        })
        .map_err(ApplyError::Transaction);

    let report = match result {
        Ok(Ok(report)) => report,
        Ok(Err(err)) | Err(err) => return Err(report_apply_error(&err)),
    };

    if report.is_up_to_date() {
        println!(
            "Database is up to date ({} migration(s) applied).",
            report.already_applied
        );
        return Ok(());
    }

    for name in &report.applied {
        println!("  applied  {name}");
    }
    println!(
        "\nApplied {} migration(s); {} total.",
        report.applied.len(),
        report.already_applied + report.applied.len()
    );
    Ok(())
}
