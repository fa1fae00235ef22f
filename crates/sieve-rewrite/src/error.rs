//! Error types for the rewrite crate.

use thiserror::Error;

/// Errors that can occur while parsing or rewriting a statement.
///
/// `RewriteEngine::run` never surfaces these; they are visible through
/// `RewriteEngine::rewrite` and the log output.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// SQL text was empty after whitespace normalization.
    #[error("SQL is blank")]
    BlankInput,

    /// SQL parsing failed.
    #[error("failed to parse SQL `{sql}`: {message}")]
    Parse { sql: String, message: String },

    /// The parser produced no statement.
    #[error("SQL contains no statement")]
    EmptyStatement,

    /// Only single statements are rewritten.
    #[error("expected a single statement, found {count}")]
    MultipleStatements { count: usize },

    /// INSERT without a VALUES list (e.g. `DEFAULT VALUES`).
    #[error("insert into {table} has no VALUES list")]
    MissingInsertSource { table: String },

    /// INSERT fed by a query or another non-VALUES source.
    #[error("insert into {table} uses an unsupported source: {source_kind}")]
    UnsupportedInsertSource { table: String, source_kind: String },

    /// VALUES list whose shape cannot take an extra value.
    #[error("cannot add a value to insert into {table}: {reason}")]
    UnsupportedValuesShape { table: String, reason: String },

    /// Target table on the right of an outer USING/NATURAL join or an APPLY.
    #[error("cannot scope {table} joined with {operator}")]
    UnsupportedJoin { table: String, operator: String },

    /// A rule panicked while applying.
    #[error("rule {rule} panicked: {message}")]
    RulePanicked { rule: String, message: String },

    /// Failure raised by a rule implementation.
    #[error("rule failed: {0}")]
    Rule(#[from] anyhow::Error),
}
