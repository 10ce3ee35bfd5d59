//! Command implementations

pub mod common;
pub mod migrate;
pub mod new;
pub mod status;
