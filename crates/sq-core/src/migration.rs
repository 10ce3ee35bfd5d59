//! Migration data model.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Strongly-typed wrapper for migration names.
///
/// A migration name is the file name of its change-script (e.g.
/// `001_init.sql`). Names sort lexicographically, and that order is the
/// intended application order. The name is also the ledger's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MigrationName(String);

impl MigrationName {
    /// Create a new `MigrationName`, panicking if the name is empty.
    ///
    /// Prefer [`try_new`](Self::try_new) when handling untrusted input.
    pub fn new(name: impl Into<String>) -> Self {
        let s = name.into();
        assert!(!s.is_empty(), "MigrationName must not be empty");
        Self(s)
    }

    /// Try to create a new `MigrationName`, returning `None` if the name is empty.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading run of ASCII digits, e.g. `"007"` for `007_add_index.sql`.
    pub fn sequence_prefix(&self) -> Option<&str> {
        let end = self
            .0
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.0.len());
        if end == 0 {
            None
        } else {
            Some(&self.0[..end])
        }
    }
}

impl fmt::Display for MigrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for MigrationName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MigrationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MigrationName {
    type Error = &'static str;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or("MigrationName must not be empty")
    }
}

impl TryFrom<&str> for MigrationName {
    type Error = &'static str;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or("MigrationName must not be empty")
    }
}

impl From<MigrationName> for String {
    fn from(name: MigrationName) -> Self {
        name.0
    }
}

impl PartialEq<str> for MigrationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A named, immutable unit of schema change.
///
/// `content` is the full text of the change-script. It is never parsed;
/// it is only executed and compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    name: MigrationName,
    content: String,
}

impl Migration {
    /// Create a migration from a name and its script content.
    pub fn new(name: MigrationName, content: impl Into<String>) -> Self {
        Self {
            name,
            content: content.into(),
        }
    }

    /// The migration's name (sort key and ledger key).
    pub fn name(&self) -> &MigrationName {
        &self.name
    }

    /// The full change-script text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Split into `(name, content)`.
    pub fn into_parts(self) -> (MigrationName, String) {
        (self.name, self.content)
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
