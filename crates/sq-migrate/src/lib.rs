//! sq-migrate - Migration applier for Sequent
//!
//! Bootstraps the ledger, loads the required and applied sequences,
//! reconciles them, and applies whatever is pending through the caller's
//! executor. The caller owns the transaction.

pub mod applier;
pub mod error;

pub use applier::{migrate, plan, MigrationPlan, MigrationReport};
pub use error::{ApplyError, ApplyResult};
