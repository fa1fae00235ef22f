//! `sieve rewrite` command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sieve_core::{DialectKind, RewriteConfig};
use sieve_rewrite::{RewriteEngine, RewriteReport};
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// Path to the rules file (YAML)
    #[arg(long, short = 'c', env = "SIEVE_CONFIG")]
    pub config: PathBuf,

    /// Parse with this dialect instead of the one in the rules file
    #[arg(long)]
    pub dialect: Option<DialectKind>,

    /// Print a JSON report instead of the rewritten SQL
    #[arg(long, default_value_t = false)]
    pub explain: bool,

    /// SQL statement to rewrite. Read from stdin when omitted.
    pub sql: Option<String>,
}

/// JSON output of `--explain`.
#[derive(Debug, Serialize)]
struct Explanation {
    dialect: DialectKind,
    #[serde(flatten)]
    report: RewriteReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(config: &RewriteConfig, args: RewriteArgs) -> Result<()> {
    let sql = match args.sql {
        Some(sql) => sql,
        None => read_stdin()?,
    };

    let engine = build_engine(config, args.dialect)?;
    println!("{}", render(&engine, &sql, args.explain)?);
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut sql = String::new();
    std::io::stdin()
        .read_to_string(&mut sql)
        .context("Failed to read SQL from stdin")?;
    Ok(sql.trim_end_matches(['\r', '\n']).to_string())
}

fn build_engine(config: &RewriteConfig, dialect: Option<DialectKind>) -> Result<RewriteEngine> {
    let mut config = config.clone();
    if let Some(dialect) = dialect {
        config.dialect = dialect;
    }
    tracing::debug!(
        dialect = %config.dialect,
        rules = config.leaf_rule_count(),
        "Building rewrite engine"
    );
    RewriteEngine::from_config(&config).context("Failed to build rules")
}

/// Rewritten SQL, or the JSON explanation when `explain` is set.
fn render(engine: &RewriteEngine, sql: &str, explain: bool) -> Result<String> {
    if !explain {
        return Ok(engine.run(sql));
    }

    let dialect = engine.parser().dialect();
    let explanation = match engine.rewrite(sql) {
        Ok(report) => Explanation {
            dialect,
            report,
            error: None,
        },
        Err(err) => Explanation {
            dialect,
            report: RewriteReport {
                original_sql: sql.to_string(),
                rewritten_sql: sql.to_string(),
                changed: false,
                rules_applied: Vec::new(),
            },
            error: Some(err.to_string()),
        },
    };
    serde_json::to_string_pretty(&explanation).context("Failed to serialize report")
}
