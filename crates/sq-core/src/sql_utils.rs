//! SQL identifier quoting utilities
//!
//! The ledger table name comes from configuration, so every statement that
//! mentions it goes through these helpers.

/// Quote a SQL identifier to prevent injection.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use sq_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("migrations"), r#""migrations""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified name (e.g. `ops.migrations`).
///
/// Splits on `.` and individually quotes each component.
///
/// # Examples
/// ```
/// use sq_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("migrations"), r#""migrations""#);
/// assert_eq!(quote_qualified("ops.migrations"), r#""ops"."migrations""#);
/// ```
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Split an optionally schema-qualified name into `(schema, table)`.
///
/// Returns `None` for the schema when the name is unqualified.
///
/// # Examples
/// ```
/// use sq_core::sql_utils::split_schema;
/// assert_eq!(split_schema("migrations"), (None, "migrations"));
/// assert_eq!(split_schema("ops.migrations"), (Some("ops"), "migrations"));
/// ```
pub fn split_schema(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once('.') {
        Some((schema, table)) => (Some(schema), table),
        None => (None, name),
    }
}

/// Whether `name` is a plain SQL identifier: ASCII letter or underscore
/// followed by ASCII alphanumerics or underscores.
pub fn is_plain_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "sql_utils_test.rs"]
mod tests;
