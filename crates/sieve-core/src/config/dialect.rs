//! SQL dialect selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SQL dialect used when parsing statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    Generic,
    #[default]
    Postgres,
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "sqlite")]
    SQLite,
    #[serde(rename = "mssql")]
    MsSql,
    Ansi,
}

impl DialectKind {
    /// Every supported dialect, in display order.
    pub const ALL: [DialectKind; 6] = [
        DialectKind::Generic,
        DialectKind::Postgres,
        DialectKind::MySql,
        DialectKind::SQLite,
        DialectKind::MsSql,
        DialectKind::Ansi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DialectKind::Generic => "generic",
            DialectKind::Postgres => "postgres",
            DialectKind::MySql => "mysql",
            DialectKind::SQLite => "sqlite",
            DialectKind::MsSql => "mssql",
            DialectKind::Ansi => "ansi",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "postgresql" | "pg" => return Ok(DialectKind::Postgres),
            "sqlserver" => return Ok(DialectKind::MsSql),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|d| d.as_str()).collect();
                format!("unknown dialect '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}
