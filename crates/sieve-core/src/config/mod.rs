//! Configuration types for the sieve rewrite engine.
//!
//! A rules file is a single YAML document describing the SQL dialect, the
//! logging defaults and the ordered list of rewrite rules:
//!
//! ```yaml
//! dialect: postgres
//! logging:
//!   level: info
//! rules:
//!   - kind: add_condition
//!     table: tenant
//!     column: tenant_id
//!     value: TENANT_1
//! ```

pub mod dialect;
pub mod rules;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use dialect::DialectKind;
pub use rules::{
    ColumnRuleDefinition, CombinedRuleDefinition, ConditionRuleDefinition, RuleDefinition,
    RuleValue, StatementTarget,
};

/// Complete rewrite configuration loaded from a rules file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteConfig {
    /// SQL dialect used to parse incoming statements.
    #[serde(default)]
    pub dialect: DialectKind,

    /// Logging defaults for binaries embedding the engine.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rewrite rules, in declaration order.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive (e.g. `info`, `sieve_rewrite=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RewriteConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load a configuration file and reject semantically invalid rules.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check rule definitions for problems serde cannot express.
    ///
    /// Returns the first problem found; `problems()` lists all of them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(ConfigError::Config(problem)),
            None => Ok(()),
        }
    }

    /// All semantic problems in the rule list, each prefixed with its location.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            let location = format!("rules[{}]", index);
            match rule {
                RuleDefinition::Combined(combined) => {
                    if combined.rules.is_empty() {
                        problems.push(format!("{}: combined rule has no sub-rules", location));
                    }
                    for (sub_index, sub_rule) in combined.rules.iter().enumerate() {
                        let sub_location = format!("{}.rules[{}]", location, sub_index);
                        if matches!(sub_rule, RuleDefinition::Combined(_)) {
                            problems.push(format!(
                                "{}: combined rules cannot be nested",
                                sub_location
                            ));
                        } else {
                            sub_rule.collect_problems(&sub_location, &mut problems);
                        }
                    }
                }
                other => other.collect_problems(&location, &mut problems),
            }
        }
        problems
    }

    /// Number of leaf rules, counting each sub-rule of a combined rule.
    pub fn leaf_rule_count(&self) -> usize {
        self.rules
            .iter()
            .map(|rule| match rule {
                RuleDefinition::Combined(combined) => combined.rules.len(),
                _ => 1,
            })
            .sum()
    }
}
