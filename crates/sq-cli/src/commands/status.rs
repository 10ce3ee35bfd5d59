//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sq_db::{DuckDbLedger, LedgerEntry};
use sq_migrate::{ApplyError, MigrationPlan};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{report_apply_error, ProjectContext};

#[derive(Debug, Serialize)]
struct StatusReport {
    applied: Vec<AppliedRow>,
    pending: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AppliedRow {
    name: String,
    applied_at: Option<String>,
}

/// Show which migrations are applied and which are pending.
///
/// Runs inside a transaction that is always rolled back, so even the ledger
/// table bootstrap leaves no trace. A missing database file is not created.
pub fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let dir = ctx.migrations_dir(args.migrations_dir.as_deref());
    let source = ctx.source();
    let db = ctx.open_existing_database(global)?;

    let result = db
        .rollback_after(|conn| -> Result<_, ApplyError> {
            let ledger = DuckDbLedger::with_table(conn, ctx.config.ledger_table.as_str());
            let plan = sq_migrate::plan(&ledger, &source, &dir)?;
            let history = ledger.history().map_err(ApplyError::LedgerLoadFailed)?;
            Ok((plan, history))
        })
        .map_err(ApplyError::Transaction);

    let (plan, history) = match result {
        Ok(Ok(found)) => found,
        Ok(Err(err)) | Err(err) => return Err(report_apply_error(&err)),
    };
    let report = build_report(&plan, &history);

    match args.output {
        StatusOutput::Json => {
            let json =
                serde_json::to_string_pretty(&report).context("Failed to serialize status")?;
            println!("{json}");
        }
        StatusOutput::Table => print_table(&report),
    }
    Ok(())
}

fn build_report(plan: &MigrationPlan, history: &[LedgerEntry]) -> StatusReport {
    let applied = plan
        .applied
        .iter()
        .map(|m| AppliedRow {
            name: m.name().to_string(),
            applied_at: history
                .iter()
                .find(|h| &h.name == m.name())
                .map(|h| h.applied_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        })
        .collect();
    let pending = plan.pending.iter().map(|m| m.name().to_string()).collect();
    StatusReport { applied, pending }
}

fn print_table(report: &StatusReport) {
    let width = report
        .applied
        .iter()
        .map(|r| r.name.len())
        .chain(report.pending.iter().map(String::len))
        .max()
        .unwrap_or(0);

    for row in &report.applied {
        println!(
            "  applied  {:<width$}  {}",
            row.name,
            row.applied_at.as_deref().unwrap_or("-")
        );
    }
    for name in &report.pending {
        println!("  pending  {name}");
    }
    println!(
        "\n{} applied, {} pending.",
        report.applied.len(),
        report.pending.len()
    );
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
