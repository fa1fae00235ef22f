//! Table and alias matching.
//!
//! Names are compared case-insensitively after removing one pair of
//! surrounding quotes (`"x"`, `` `x` `` or `[x]`) from either side.

use sqlparser::ast::{Ident, ObjectName, TableAlias};
use std::fmt;

const QUOTE_PAIRS: [(char, char); 3] = [('"', '"'), ('`', '`'), ('[', ']')];

/// Remove one pair of surrounding quote characters.
pub fn strip_quotes(name: &str) -> &str {
    let trimmed = name.trim();
    quote_pair(trimmed)
        .map(|_| &trimmed[1..trimmed.len() - 1])
        .unwrap_or(trimmed)
}

fn quote_pair(name: &str) -> Option<char> {
    QUOTE_PAIRS
        .iter()
        .find(|(open, close)| name.len() >= 2 && name.starts_with(*open) && name.ends_with(*close))
        .map(|(open, _)| *open)
}

/// Case-insensitive, quote-insensitive name equality.
pub fn names_equal(left: &str, right: &str) -> bool {
    strip_quotes(left).to_lowercase() == strip_quotes(right).to_lowercase()
}

/// Split a possibly qualified name on dots that are not inside quotes.
pub fn split_qualified(name: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut closing: Option<char> = None;
    for (index, ch) in name.char_indices() {
        match closing {
            Some(close) if ch == close => closing = None,
            Some(_) => {}
            None if ch == '.' => {
                parts.push(&name[start..index]);
                start = index + 1;
            }
            None => {
                closing = QUOTE_PAIRS
                    .iter()
                    .find(|(open, _)| *open == ch)
                    .map(|(_, close)| *close);
            }
        }
    }
    parts.push(&name[start..]);
    parts
}

/// Build an identifier from a configured name, keeping its quote style.
pub fn ident_from_name(name: &str) -> Ident {
    let trimmed = name.trim();
    match quote_pair(trimmed) {
        Some(quote) => Ident::with_quote(quote, strip_quotes(trimmed)),
        None => Ident::new(trimmed),
    }
}

/// A table a rule is looking for, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    raw: String,
    parts: Vec<String>,
}

impl TableTarget {
    pub fn new(name: impl Into<String>) -> Self {
        let raw = name.into();
        let parts = split_qualified(&raw)
            .into_iter()
            .map(|part| strip_quotes(part).to_string())
            .collect();
        Self { raw, parts }
    }

    /// Name as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Does `name` (or its alias) refer to this table?
    ///
    /// An unqualified target matches the last part of the table name or the
    /// alias. A qualified target must match the trailing parts of the name.
    pub fn matches(&self, name: &ObjectName, alias: Option<&Ident>) -> bool {
        let mut declared = Vec::with_capacity(name.0.len());
        for part in &name.0 {
            match part.as_ident() {
                Some(ident) => declared.push(ident.value.as_str()),
                None => return false,
            }
        }

        if self.parts.len() == 1
            && let Some(alias) = alias
            && names_equal(&self.parts[0], &alias.value)
        {
            return true;
        }

        if declared.len() < self.parts.len() {
            return false;
        }
        declared[declared.len() - self.parts.len()..]
            .iter()
            .zip(&self.parts)
            .all(|(declared, wanted)| names_equal(declared, wanted))
    }
}

impl fmt::Display for TableTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Identifier that refers to a table reference inside its query: the alias
/// when present, otherwise the last part of the table name.
pub fn qualifier(name: &ObjectName, alias: Option<&TableAlias>) -> Option<Ident> {
    match alias {
        Some(alias) => Some(alias.name.clone()),
        None => name.0.last().and_then(|part| part.as_ident()).cloned(),
    }
}
