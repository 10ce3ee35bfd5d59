//! Configuration types and parsing for sequent.yml

use crate::error::{CoreError, CoreResult};
use crate::source::DEFAULT_EXTENSION;
use crate::sql_utils::is_plain_ident;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Project configuration from sequent.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory containing migration scripts, relative to the project directory
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// File extension of migration scripts (without the dot)
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Table recording applied migrations, optionally schema-qualified
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Named target configurations (e.g., dev, staging, prod)
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            migrations_path: default_migrations_path(),
            extension: default_extension(),
            ledger_table: default_ledger_table(),
            database: DatabaseConfig::default(),
            targets: BTreeMap::new(),
        }
    }
}

/// Config file names searched in a project directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["sequent.yml", "sequent.yaml"];

const DEFAULT_DB_PATH: &str = ":memory:";

fn default_migrations_path() -> String {
    "migrations".to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_ledger_table() -> String {
    "migrations".to_string()
}

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory.
    ///
    /// Looks for sequent.yml or sequent.yaml; falls back to defaults when
    /// neither exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for file_name in CONFIG_FILE_NAMES {
            let candidate = dir.join(file_name);
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }
        log::debug!(
            "No config file in {}, using defaults",
            dir.display()
        );
        Ok(Self::default())
    }

    /// Validate field values that serde cannot check.
    pub fn validate(&self) -> CoreResult<()> {
        if self.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path must not be empty".to_string(),
            });
        }

        if self.extension.is_empty()
            || self.extension.contains(['.', '/', '\\'])
        {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "extension '{}' must be a bare extension such as 'sql'",
                    self.extension
                ),
            });
        }

        let parts: Vec<&str> = self.ledger_table.split('.').collect();
        if parts.len() > 2 || !parts.iter().all(|p| is_plain_ident(p)) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "ledger_table '{}' must be `table` or `schema.table` using plain identifiers",
                    self.ledger_table
                ),
            });
        }

        Ok(())
    }

    /// Absolute-or-relative migration directory resolved against `project_dir`.
    pub fn migrations_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.migrations_path)
    }

    /// Resolve the database path, applying a named target's override.
    pub fn database_path(&self, target: Option<&str>) -> CoreResult<String> {
        let Some(name) = target else {
            return Ok(self.database.path.clone());
        };

        let Some(target_config) = self.targets.get(name) else {
            return Err(CoreError::UnknownTarget {
                name: name.to_string(),
                available: self.available_targets(),
            });
        };

        Ok(target_config
            .database
            .as_ref()
            .map_or_else(|| self.database.path.clone(), |db| db.path.clone()))
    }

    fn available_targets(&self) -> String {
        if self.targets.is_empty() {
            "none".to_string()
        } else {
            self.targets.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
