//! sq-db - Database layer for Sequent
//!
//! This crate provides the [`Executor`] and [`MigrationLedger`] traits the
//! applier consumes, and DuckDB implementations of both that share a single
//! connection (and therefore a single transaction).

pub mod duckdb;
pub mod error;
pub mod ledger;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use ledger::{DuckDbLedger, LedgerEntry, DEFAULT_LEDGER_TABLE};
pub use traits::{Executor, MigrationLedger};
