//! Loading the authoritative migration sequence.

use crate::error::{CoreError, CoreResult};
use crate::migration::{Migration, MigrationName};
use std::path::Path;

/// Default file extension recognised as a migration script.
pub const DEFAULT_EXTENSION: &str = "sql";

/// A repository of change-scripts.
///
/// Implementations must return migrations sorted ascending by name; the
/// reconciler relies on that order and does not re-sort.
pub trait MigrationSource {
    /// Load every migration found at `path`.
    fn load(&self, path: &Path) -> CoreResult<Vec<Migration>>;
}

/// Reads one migration per file from a single directory.
///
/// Only regular files directly inside the directory whose name ends in
/// `.{extension}` are loaded, including a file named just `.sql`.
/// Subdirectories are not searched.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    extension: String,
}

impl DirectorySource {
    /// Create a source that loads files with the given extension (without
    /// the leading dot).
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// The extension this source filters on.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn is_migration_file(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name() else {
            return false;
        };
        let file_name = file_name.to_string_lossy();
        path.is_file()
            && file_name
                .strip_suffix(self.extension.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
    }
}

impl Default for DirectorySource {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl MigrationSource for DirectorySource {
    fn load(&self, path: &Path) -> CoreResult<Vec<Migration>> {
        if !path.is_dir() {
            return Err(CoreError::SourceDirNotFound {
                path: path.display().to_string(),
            });
        }

        let entries = std::fs::read_dir(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut migrations = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CoreError::IoWithPath {
                path: path.display().to_string(),
                source: e,
            })?;
            let file_path = entry.path();
            if !self.is_migration_file(&file_path) {
                continue;
            }

            let file_name = entry
                .file_name()
                .into_string()
                .map_err(|_| CoreError::InvalidFileName {
                    path: file_path.display().to_string(),
                })?;
            let content =
                std::fs::read_to_string(&file_path).map_err(|e| CoreError::IoWithPath {
                    path: file_path.display().to_string(),
                    source: e,
                })?;

            // read_dir never yields an empty file name
            let name = MigrationName::try_new(file_name).ok_or_else(|| {
                CoreError::InvalidFileName {
                    path: file_path.display().to_string(),
                }
            })?;
            migrations.push(Migration::new(name, content));
        }

        migrations.sort_by(|a, b| a.name().cmp(b.name()));
        log::debug!(
            "Loaded {} migration(s) from {}",
            migrations.len(),
            path.display()
        );
        Ok(migrations)
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
