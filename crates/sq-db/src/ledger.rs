//! DuckDB-backed migration ledger.
//!
//! The ledger is a table with one row per applied migration:
//!
//! | column       | type      | notes                              |
//! |--------------|-----------|------------------------------------|
//! | `file_name`  | VARCHAR   | unique, not null                   |
//! | `query`      | TEXT      | full script content                |
//! | `applied_at` | TIMESTAMP | defaults to time of insertion      |

use crate::error::{is_unique_violation, DbError, DbResult};
use crate::traits::MigrationLedger;
use chrono::NaiveDateTime;
use duckdb::Connection;
use sq_core::sql_utils::{quote_ident, quote_qualified, split_schema};
use sq_core::{Migration, MigrationName};

/// Default ledger table name.
pub const DEFAULT_LEDGER_TABLE: &str = "migrations";

/// A ledger row as shown by status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub name: MigrationName,
    pub applied_at: NaiveDateTime,
}

/// Ledger stored in a DuckDB table on a borrowed connection.
///
/// Borrowing (rather than owning) the connection means the ledger writes
/// through the same transaction as the executor.
pub struct DuckDbLedger<'conn> {
    conn: &'conn Connection,
    table: String,
}

impl<'conn> DuckDbLedger<'conn> {
    /// Ledger in the default `migrations` table.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_table(conn, DEFAULT_LEDGER_TABLE)
    }

    /// Ledger in a custom table, optionally schema-qualified.
    ///
    /// The name is quoted in every statement; validate it with
    /// [`sq_core::Config::validate`] before use.
    pub fn with_table(conn: &'conn Connection, table: impl Into<String>) -> Self {
        Self {
            conn,
            table: table.into(),
        }
    }

    /// The unquoted table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Recorded names with their application time, ordered by name.
    pub fn history(&self) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT file_name, applied_at FROM {} ORDER BY file_name",
            quote_qualified(&self.table)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, NaiveDateTime>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (name, applied_at) = row?;
            entries.push(LedgerEntry {
                name: parse_name(name)?,
                applied_at,
            });
        }
        Ok(entries)
    }
}

fn parse_name(raw: String) -> DbResult<MigrationName> {
    MigrationName::try_new(raw)
        .ok_or_else(|| DbError::CorruptLedger("empty file_name".to_string()))
}

impl MigrationLedger for DuckDbLedger<'_> {
    fn ensure_exists(&self) -> DbResult<()> {
        let mut ddl = String::new();
        if let (Some(schema), _) = split_schema(&self.table) {
            ddl.push_str(&format!(
                "CREATE SCHEMA IF NOT EXISTS {};\n",
                quote_ident(schema)
            ));
        }
        ddl.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                 file_name  VARCHAR NOT NULL UNIQUE,
                 query      TEXT,
                 applied_at TIMESTAMP NOT NULL DEFAULT current_timestamp
             );",
            quote_qualified(&self.table)
        ));
        self.conn.execute_batch(&ddl)?;
        Ok(())
    }

    fn load_all(&self) -> DbResult<Vec<Migration>> {
        let sql = format!(
            "SELECT file_name, query FROM {} ORDER BY file_name",
            quote_qualified(&self.table)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?;

        let mut migrations = Vec::new();
        for row in rows {
            let (name, query) = row?;
            let Some(query) = query else {
                return Err(DbError::CorruptLedger(format!(
                    "migration '{name}' has NULL query"
                )));
            };
            migrations.push(Migration::new(parse_name(name)?, query));
        }
        log::debug!(
            "Loaded {} applied migration(s) from {}",
            migrations.len(),
            self.table
        );
        Ok(migrations)
    }

    fn append(&self, migration: &Migration) -> DbResult<()> {
        let sql = format!(
            "INSERT INTO {} (file_name, query) VALUES (?, ?)",
            quote_qualified(&self.table)
        );
        self.conn
            .execute(
                &sql,
                duckdb::params![migration.name().as_str(), migration.content()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::DuplicateEntry(migration.name().to_string())
                } else {
                    DbError::from(e)
                }
            })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
