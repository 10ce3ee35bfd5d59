//! New command implementation

use anyhow::{Context, Result};
use sq_core::{MigrationName, MigrationSource};
use std::fs::OpenOptions;
use std::io::Write;

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::ProjectContext;

/// Minimum digits in a generated sequence prefix.
const MIN_PREFIX_WIDTH: usize = 3;

/// Create `<NNN>_<slug>.<ext>` after the highest existing sequence number.
pub fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let dir = ctx.migrations_dir(args.migrations_dir.as_deref());
    let source = ctx.source();

    let slug = slugify(&args.description);
    if slug.is_empty() {
        anyhow::bail!(
            "Description '{}' contains no letters or digits",
            args.description
        );
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let existing: Vec<MigrationName> = source
        .load(&dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .into_iter()
        .map(|m| m.into_parts().0)
        .collect();

    let file_name = format!(
        "{}_{}.{}",
        next_sequence(&existing)?,
        slug,
        source.extension()
    );
    let path = dir.join(&file_name);

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("Refusing to overwrite {}", path.display()))?;
    writeln!(file, "-- {}", args.description.trim())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {}", path.display());
    Ok(())
}

/// Lowercase ASCII alphanumerics; every other run collapses to one `_`.
pub(crate) fn slugify(description: &str) -> String {
    let mut slug = String::with_capacity(description.len());
    for c in description.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// One past the highest numeric prefix among `existing`, zero-padded to the
/// widest existing prefix (at least three digits).
///
/// Fails once the next number no longer fits that width: a wider prefix
/// would sort before the existing files and change the application order.
pub(crate) fn next_sequence(existing: &[MigrationName]) -> Result<String> {
    let prefixes: Vec<&str> = existing
        .iter()
        .filter_map(MigrationName::sequence_prefix)
        .collect();

    let width = prefixes
        .iter()
        .map(|p| p.len())
        .max()
        .unwrap_or(0)
        .max(MIN_PREFIX_WIDTH);
    let next = prefixes
        .iter()
        .filter_map(|p| p.parse::<u128>().ok())
        .max()
        .map_or(1, |n| n.saturating_add(1));

    let next = next.to_string();
    if next.len() > width {
        anyhow::bail!(
            "Sequence prefixes are {width} digits wide and {next} does not fit; \
             rename the existing migrations with wider prefixes first"
        );
    }
    Ok(format!("{next:0>width$}"))
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
