//! `sieve check` command implementation.
//!
//! Validates a rules file:
//! - JSON Schema validation against the embedded `RewriteConfig` schema
//! - Semantic checks the schema cannot express (nesting, empty names)
//! - Warnings for rules that load but are unlikely to do what was meant

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use sieve_core::{RewriteConfig, RuleDefinition, RuleValue, REWRITE_CONFIG_SCHEMA};

// ============================================================================
// Check Result Types
// ============================================================================

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Check that produced this finding.
    pub category: String,
    pub message: String,
    pub file: Option<PathBuf>,
    /// Location within the file (e.g., "rules[2].table").
    pub location: Option<String>,
}

impl CheckFinding {
    fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            file: None,
            location: None,
        }
    }

    fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Results from running all checks.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn add(&mut self, finding: CheckFinding) {
        self.findings.push(finding);
    }

    fn extend(&mut self, findings: impl IntoIterator<Item = CheckFinding>) {
        self.findings.extend(findings);
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Print human-readable summary.
    pub fn print_summary(&self) {
        let mut sorted: Vec<_> = self.findings.iter().collect();
        sorted.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.category.cmp(&b.category))
        });

        let errors = self.error_count();
        let warnings = self.warning_count();

        for (severity, heading) in [
            (Severity::Error, "❌ Errors"),
            (Severity::Warning, "⚠️  Warnings"),
            (Severity::Info, "ℹ️  Info"),
        ] {
            let group: Vec<_> = sorted.iter().filter(|f| f.severity == severity).collect();
            if group.is_empty() {
                continue;
            }
            println!("\n{} ({}):", heading, group.len());
            println!("{}", "─".repeat(60));
            for finding in group {
                print_finding(finding);
            }
        }

        println!();
        println!("{}", "═".repeat(60));
        if errors == 0 && warnings == 0 {
            println!("✅ All checks passed!");
        } else {
            println!("Summary: {} error(s), {} warning(s)", errors, warnings);
            if errors > 0 {
                println!("\n❌ Rules file has errors that must be fixed.");
            }
        }
    }
}

fn print_finding(finding: &CheckFinding) {
    let icon = match finding.severity {
        Severity::Error => "✗",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
    };

    let location = match (&finding.file, &finding.location) {
        (Some(f), Some(l)) => format!(" [{}:{}]", f.display(), l),
        (Some(f), None) => format!(" [{}]", f.display()),
        (None, Some(l)) => format!(" [{}]", l),
        (None, None) => String::new(),
    };

    println!(
        "  {} [{}]{}: {}",
        icon, finding.category, location, finding.message
    );
}

// ============================================================================
// Check Runner
// ============================================================================

/// Run every check without printing anything.
pub fn run_quiet(config_path: &Path) -> Result<CheckResults> {
    let mut results = CheckResults::default();

    // 1. JSON Schema validation
    let schema: JsonValue = serde_json::from_str(REWRITE_CONFIG_SCHEMA)
        .context("Failed to parse embedded rules schema")?;
    results.extend(validate_yaml_against_schema(config_path, &schema)?);

    // 2. Load the typed configuration; later checks need it
    let config = match RewriteConfig::from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            results.add(
                CheckFinding::error("load", e.to_string()).with_file(config_path),
            );
            return Ok(results);
        }
    };

    // 3. Semantic problems
    results.extend(check_semantics(&config, config_path));

    // 4. Suspicious but valid rules
    results.extend(check_empty_rules(&config, config_path));
    results.extend(check_null_values(&config, config_path));
    results.extend(check_duplicates(&config, config_path));

    if !results.has_errors() {
        results.add(CheckFinding::info(
            "summary",
            format!(
                "{} rule(s) for dialect '{}'",
                config.leaf_rule_count(),
                config.dialect
            ),
        ));
    }

    Ok(results)
}

/// Run all checks and print the results.
pub fn run(config_path: &Path) -> Result<()> {
    println!("🔍 Checking rules file {}...", config_path.display());

    let results = run_quiet(config_path)?;
    results.print_summary();

    if results.has_errors() {
        anyhow::bail!(
            "Rules check failed with {} error(s)",
            results.error_count()
        );
    }

    Ok(())
}

// ============================================================================
// Check 1: JSON Schema Validation
// ============================================================================

fn validate_yaml_against_schema(yaml_path: &Path, schema: &JsonValue) -> Result<Vec<CheckFinding>> {
    let mut findings = Vec::new();

    let content = match fs::read_to_string(yaml_path) {
        Ok(c) => c,
        Err(e) => {
            findings.push(
                CheckFinding::error("json-schema", format!("Failed to read file: {}", e))
                    .with_file(yaml_path),
            );
            return Ok(findings);
        }
    };

    let yaml_value: JsonValue = match serde_yaml::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            findings.push(
                CheckFinding::error("json-schema", format!("Failed to parse YAML: {}", e))
                    .with_file(yaml_path),
            );
            return Ok(findings);
        }
    };

    let compiled = match jsonschema::validator_for(schema) {
        Ok(c) => c,
        Err(e) => {
            findings.push(CheckFinding::error(
                "json-schema",
                format!("Failed to compile JSON schema: {}", e),
            ));
            return Ok(findings);
        }
    };

    for error in compiled.iter_errors(&yaml_value) {
        let path_str = error.instance_path().to_string();
        let location = if path_str.is_empty() {
            "(root)".to_string()
        } else {
            path_str
        };

        findings.push(
            CheckFinding::error("json-schema", format!("{}", error))
                .with_file(yaml_path)
                .with_location(location),
        );
    }

    Ok(findings)
}

// ============================================================================
// Check 2: Semantic Problems
// ============================================================================

fn check_semantics(config: &RewriteConfig, file: &Path) -> Vec<CheckFinding> {
    config
        .problems()
        .into_iter()
        .map(|problem| {
            let finding = match problem.split_once(": ") {
                Some((location, message)) => {
                    CheckFinding::error("rules", message).with_location(location)
                }
                None => CheckFinding::error("rules", problem.as_str()),
            };
            finding.with_file(file)
        })
        .collect()
}

// ============================================================================
// Check 3: Warnings
// ============================================================================

fn check_empty_rules(config: &RewriteConfig, file: &Path) -> Vec<CheckFinding> {
    if config.rules.is_empty() {
        vec![CheckFinding::warning(
            "rules",
            "No rules defined; every statement will pass through unchanged",
        )
        .with_file(file)]
    } else {
        Vec::new()
    }
}

/// `column = NULL` never holds, so a null condition filters out every row.
fn check_null_values(config: &RewriteConfig, file: &Path) -> Vec<CheckFinding> {
    leaf_rules(config)
        .into_iter()
        .filter_map(|(location, rule)| match rule {
            RuleDefinition::AddCondition(condition) if condition.value == RuleValue::Null => Some(
                CheckFinding::warning(
                    "null-condition",
                    format!(
                        "Condition on '{}.{}' compares with NULL and will match no rows",
                        condition.table, condition.column
                    ),
                )
                .with_file(file)
                .with_location(location),
            ),
            _ => None,
        })
        .collect()
}

fn check_duplicates(config: &RewriteConfig, file: &Path) -> Vec<CheckFinding> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut findings = Vec::new();

    for (location, rule) in leaf_rules(config) {
        let Some(key) = rule_key(rule) else {
            continue;
        };
        match seen.get(&key) {
            Some(first) => findings.push(
                CheckFinding::warning(
                    "duplicate-rule",
                    format!("Same rule as {} ({})", first, key),
                )
                .with_file(file)
                .with_location(location),
            ),
            None => {
                seen.insert(key, location);
            }
        }
    }

    findings
}

fn rule_key(rule: &RuleDefinition) -> Option<String> {
    match rule {
        RuleDefinition::AddCondition(condition) => Some(format!(
            "add_condition {} {}.{}",
            condition.statement,
            condition.table.to_lowercase(),
            condition.column.to_lowercase()
        )),
        RuleDefinition::AddColumn(column) => Some(format!(
            "add_column {}.{}",
            column.table.to_lowercase(),
            column.column.to_lowercase()
        )),
        RuleDefinition::Combined(_) => None,
    }
}

/// Every non-combined rule with its location, flattening combined rules.
fn leaf_rules(config: &RewriteConfig) -> Vec<(String, &RuleDefinition)> {
    let mut leaves = Vec::new();
    for (index, rule) in config.rules.iter().enumerate() {
        let location = format!("rules[{}]", index);
        match rule {
            RuleDefinition::Combined(combined) => {
                for (sub_index, sub_rule) in combined.rules.iter().enumerate() {
                    leaves.push((format!("{}.rules[{}]", location, sub_index), sub_rule));
                }
            }
            other => leaves.push((location, other)),
        }
    }
    leaves
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn check(yaml: &str) -> CheckResults {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        run_quiet(file.path()).unwrap()
    }

    fn categories(results: &CheckResults, severity: Severity) -> Vec<String> {
        results
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .map(|f| f.category.clone())
            .collect()
    }

    #[test]
    fn test_valid_rules_pass() {
        let results = check(
            r#"
dialect: postgres
rules:
  - kind: add_condition
    table: tenant
    column: tenant_id
    value: T1
  - kind: add_column
    table: tenant
    column: tenant_id
    value: T1
"#,
        );
        assert!(!results.has_errors());
        assert_eq!(results.warning_count(), 0);
        assert_eq!(categories(&results, Severity::Info), vec!["summary"]);
    }

    #[test]
    fn test_unknown_kind_is_a_schema_error() {
        let results = check("rules:\n  - kind: drop_table\n    table: tenant\n");
        assert!(results.has_errors());
        let found = categories(&results, Severity::Error);
        assert!(found.contains(&"json-schema".to_string()));
        assert!(found.contains(&"load".to_string()));
    }

    #[test]
    fn test_nested_combined_reported_with_location() {
        let results = check(
            r#"
rules:
  - kind: combined
    rules:
      - kind: combined
        rules: []
"#,
        );
        let semantic: Vec<_> = results
            .findings
            .iter()
            .filter(|f| f.category == "rules")
            .collect();
        assert_eq!(semantic.len(), 1);
        assert_eq!(semantic[0].location.as_deref(), Some("rules[0].rules[0]"));
        assert_eq!(semantic[0].message, "combined rules cannot be nested");
    }

    #[test]
    fn test_warnings_for_duplicates_and_nulls() {
        let results = check(
            r#"
rules:
  - kind: add_condition
    table: tenant
    column: tenant_id
    value: T1
  - kind: combined
    rules:
      - kind: add_condition
        table: TENANT
        column: tenant_id
        value: T2
  - kind: add_condition
    statement: delete
    table: tenant
    column: deleted_at
    value: null
"#,
        );
        assert!(!results.has_errors());
        let mut warnings = categories(&results, Severity::Warning);
        warnings.sort();
        assert_eq!(warnings, vec!["duplicate-rule", "null-condition"]);

        let duplicate = results
            .findings
            .iter()
            .find(|f| f.category == "duplicate-rule")
            .unwrap();
        assert_eq!(duplicate.location.as_deref(), Some("rules[1].rules[0]"));
    }

    #[test]
    fn test_empty_rules_warn() {
        let results = check("dialect: sqlite\n");
        assert!(!results.has_errors());
        assert_eq!(categories(&results, Severity::Warning), vec!["rules"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let results = run_quiet(Path::new("/nonexistent/sieve-rules.yaml")).unwrap();
        assert!(results.has_errors());
    }
}
