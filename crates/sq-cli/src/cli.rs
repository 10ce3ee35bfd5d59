//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sequent - apply ordered SQL migrations and verify their history
#[derive(Parser, Debug)]
#[command(name = "sq")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Named target from the config file
    #[arg(short, long, global = true)]
    pub target: Option<String>,

    /// Database path, overriding config and target
    #[arg(short, long, global = true, env = "SQ_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply all pending migrations in one transaction
    Migrate(MigrateArgs),

    /// Show applied and pending migrations without applying anything
    Status(StatusArgs),

    /// Create the next numbered migration file
    New(NewArgs),
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Override the migrations directory
    #[arg(short, long)]
    pub migrations_dir: Option<String>,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Override the migrations directory
    #[arg(short, long)]
    pub migrations_dir: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Short description used in the file name
    pub description: String,

    /// Override the migrations directory
    #[arg(short, long)]
    pub migrations_dir: Option<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
