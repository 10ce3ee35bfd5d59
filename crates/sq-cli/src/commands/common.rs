//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sq_core::{Config, DirectorySource, ErrorKind};
use sq_db::DuckDbBackend;
use sq_migrate::ApplyError;
use std::error::Error as _;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and the database closes cleanly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command has already printed its error.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Loaded project configuration plus the directory it was resolved against.
pub(crate) struct ProjectContext {
    pub project_dir: PathBuf,
    pub config: Config,
}

impl ProjectContext {
    /// Load config from `--config`, or from the project directory.
    pub(crate) fn load(global: &GlobalArgs) -> Result<Self> {
        let project_dir = PathBuf::from(&global.project_dir);
        let config = match &global.config {
            Some(path) => Config::load(&PathBuf::from(path))
                .with_context(|| format!("Failed to load configuration file {path}"))?,
            None => Config::load_from_dir(&project_dir)
                .context("Failed to load project configuration")?,
        };
        Ok(Self {
            project_dir,
            config,
        })
    }

    /// Migration directory, honouring a per-command override.
    pub(crate) fn migrations_dir(&self, override_dir: Option<&str>) -> PathBuf {
        match override_dir {
            Some(dir) => PathBuf::from(dir),
            None => self.config.migrations_dir(&self.project_dir),
        }
    }

    /// The directory-backed migration source for this project.
    pub(crate) fn source(&self) -> DirectorySource {
        DirectorySource::new(self.config.extension.clone())
    }

    /// Resolve the database path: `--database` > `--target` > config.
    ///
    /// Relative file paths are resolved against the project directory.
    pub(crate) fn database_path(&self, global: &GlobalArgs) -> Result<String> {
        if let Some(path) = &global.database {
            return Ok(path.clone());
        }
        let path = self
            .config
            .database_path(global.target.as_deref())
            .context("Failed to resolve database target")?;
        if path == ":memory:" || PathBuf::from(&path).is_absolute() {
            return Ok(path);
        }
        Ok(self.project_dir.join(path).display().to_string())
    }

    /// Open the target database.
    pub(crate) fn open_database(&self, global: &GlobalArgs) -> Result<DuckDbBackend> {
        let path = self.database_path(global)?;
        log::debug!("Opening database {path}");
        DuckDbBackend::new(&path).with_context(|| format!("Failed to connect to database {path}"))
    }

    /// Open the target database for inspection without creating it.
    ///
    /// A database file that does not exist yet has no ledger, so an empty
    /// in-memory database stands in for it.
    pub(crate) fn open_existing_database(&self, global: &GlobalArgs) -> Result<DuckDbBackend> {
        let path = self.database_path(global)?;
        if path != ":memory:" && !Path::new(&path).exists() {
            log::debug!("Database {path} does not exist; inspecting an empty database");
            return DuckDbBackend::in_memory().context("Failed to open in-memory database");
        }
        self.open_database(global)
    }
}

/// Process exit code for each failure class.
///
/// 2: environment/load problems, safe to retry.
/// 3: recorded history disagrees with the scripts.
/// 4: a migration failed while being applied.
pub(crate) fn exit_code_for(kind: ErrorKind) -> u8 {
    if kind.is_history_inconsistency() {
        3
    } else if kind.is_retryable() {
        2
    } else {
        4
    }
}

/// Print an apply error with its cause chain and convert it to an exit code.
pub(crate) fn report_apply_error(err: &ApplyError) -> anyhow::Error {
    eprintln!("Error: {err}");
    let mut cause = err.source();
    while let Some(inner) = cause {
        eprintln!("  caused by: {inner}");
        cause = inner.source();
    }
    if err.kind().is_retryable() {
        eprintln!("Nothing was applied; the command can be retried.");
    }
    ExitCode(exit_code_for(err.kind())).into()
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
