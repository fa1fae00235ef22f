//! SQL parsing and statement classification.

use sieve_core::DialectKind;
use sqlparser::ast::Statement;
use sqlparser::dialect::{
    AnsiDialect, Dialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
    SQLiteDialect,
};
use sqlparser::parser::Parser;

use crate::error::RewriteError;

/// Parses SQL text into a single statement for one dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlParser {
    dialect: DialectKind,
}

impl SqlParser {
    /// Create a parser for the given dialect.
    pub fn new(dialect: DialectKind) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> DialectKind {
        self.dialect
    }

    /// Parse a SQL string into statements.
    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, RewriteError> {
        let dialect: Box<dyn Dialect> = match self.dialect {
            DialectKind::Generic => Box::new(GenericDialect {}),
            DialectKind::Postgres => Box::new(PostgreSqlDialect {}),
            DialectKind::MySql => Box::new(MySqlDialect {}),
            DialectKind::SQLite => Box::new(SQLiteDialect {}),
            DialectKind::MsSql => Box::new(MsSqlDialect {}),
            DialectKind::Ansi => Box::new(AnsiDialect {}),
        };
        Parser::parse_sql(dialect.as_ref(), sql).map_err(|e| RewriteError::Parse {
            sql: sql.to_string(),
            message: e.to_string(),
        })
    }

    /// Normalize whitespace and parse exactly one statement.
    pub fn parse_statement(&self, sql: &str) -> Result<Statement, RewriteError> {
        let normalized = normalize(sql);
        if normalized.is_empty() {
            return Err(RewriteError::BlankInput);
        }

        let mut statements = self.parse(&normalized)?;
        match statements.len() {
            0 => Err(RewriteError::EmptyStatement),
            1 => Ok(statements.remove(0)),
            count => Err(RewriteError::MultipleStatements { count }),
        }
    }
}

/// Collapse runs of spaces, tabs and line breaks into single spaces and trim.
///
/// Whitespace inside quoted literals is collapsed as well.
pub fn normalize(sql: &str) -> String {
    sql.split([' ', '\t', '\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Kind of statement a typed rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl StatementKind {
    /// Classify a parsed statement.
    pub fn of(statement: &Statement) -> Self {
        match statement {
            Statement::Query(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
            _ => StatementKind::Other,
        }
    }
}
