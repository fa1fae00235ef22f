//! Rewrite engine.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::Serialize;
use sqlparser::ast::Statement;

use crate::error::RewriteError;
use crate::parser::SqlParser;
use crate::rule::Rule;

/// Applies a fixed, priority-ordered list of rules to SQL statements.
///
/// The engine holds no per-call state and can be shared across threads.
#[derive(Debug)]
pub struct RewriteEngine {
    parser: SqlParser,
    rules: Vec<Box<dyn Rule>>,
}

impl RewriteEngine {
    /// Create an engine parsing PostgreSQL.
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self::with_parser(SqlParser::default(), rules)
    }

    /// Create an engine with an explicit parser.
    ///
    /// Rules are sorted by ascending priority; rules with equal priority
    /// keep the order they were given in.
    pub fn with_parser(parser: SqlParser, mut rules: Vec<Box<dyn Rule>>) -> Self {
        rules.sort_by_key(|rule| rule.priority());

        tracing::debug!(
            rules = rules.len(),
            dialect = %parser.dialect(),
            "Rewrite engine created"
        );
        for rule in &rules {
            tracing::debug!(rule = rule.name(), priority = rule.priority(), "Registered rule");
        }

        Self { parser, rules }
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn parser(&self) -> &SqlParser {
        &self.parser
    }

    /// Rewrite `sql`, falling back to the input on any failure.
    ///
    /// The input is returned unchanged when there are no rules (without
    /// parsing), when it cannot be parsed, when any rule fails, and when the
    /// rules leave the statement as it was.
    pub fn run(&self, sql: &str) -> String {
        if self.rules.is_empty() {
            tracing::trace!("No rewrite rules configured");
            return sql.to_string();
        }

        match self.rewrite(sql) {
            Ok(report) => report.rewritten_sql,
            Err(_) => sql.to_string(),
        }
    }

    /// Rewrite `sql` and report what happened.
    ///
    /// Unlike [`RewriteEngine::run`] this always parses and returns failures.
    pub fn rewrite(&self, sql: &str) -> Result<RewriteReport, RewriteError> {
        let started = Instant::now();

        let mut statement = match self.parser.parse_statement(sql) {
            Ok(statement) => statement,
            Err(err) => {
                tracing::warn!(error = %err, "Cannot parse SQL, leaving it unchanged");
                return Err(err);
            }
        };

        let before = statement.to_string();
        let rules_applied = match self.apply_rules(&mut statement) {
            Ok(applied) => applied,
            Err(err) => {
                tracing::error!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "Rewrite failed, returning original SQL"
                );
                return Err(err);
            }
        };
        let after = statement.to_string();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if after == before {
            tracing::debug!(elapsed_ms, "Rules left SQL unchanged");
            return Ok(RewriteReport {
                original_sql: sql.to_string(),
                rewritten_sql: sql.to_string(),
                changed: false,
                rules_applied,
            });
        }

        tracing::debug!(
            elapsed_ms,
            rules_applied = rules_applied.len(),
            rewritten = %after,
            "Rewrote SQL"
        );
        Ok(RewriteReport {
            original_sql: sql.to_string(),
            rewritten_sql: after,
            changed: true,
            rules_applied,
        })
    }

    fn apply_rules(&self, statement: &mut Statement) -> Result<Vec<String>, RewriteError> {
        let mut applied = Vec::new();
        for rule in &self.rules {
            if !rule.matches(statement) {
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| rule.apply(statement))) {
                Ok(Ok(())) => applied.push(rule.name().to_string()),
                Ok(Err(err)) => {
                    tracing::error!(rule = rule.name(), error = %err, "Rule failed");
                    return Err(err);
                }
                Err(payload) => {
                    return Err(RewriteError::RulePanicked {
                        rule: rule.name().to_string(),
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
        }
        Ok(applied)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Result of one rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    /// The SQL as given.
    pub original_sql: String,
    /// The rewritten SQL, or the original when nothing changed.
    pub rewritten_sql: String,
    /// Whether any rule changed the statement.
    pub changed: bool,
    /// Names of the rules that ran, in order.
    pub rules_applied: Vec<String>,
}
