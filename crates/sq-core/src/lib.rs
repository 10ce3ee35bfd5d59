//! sq-core - Core library for Sequent
//!
//! This crate provides the migration data model, the pure reconciliation
//! algorithm that decides which migrations are still pending, the contract
//! for loading migrations from a source, and project configuration.

pub mod config;
pub mod error;
pub mod migration;
pub mod reconcile;
pub mod source;
pub mod sql_utils;

pub use config::{Config, DatabaseConfig, TargetConfig};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use migration::{Migration, MigrationName};
pub use reconcile::{diff, ReconcileError};
pub use source::{DirectorySource, MigrationSource};
