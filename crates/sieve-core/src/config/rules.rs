//! Rule definitions as they appear in a rules file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single entry of the `rules` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDefinition {
    /// Inject `table.column = value` wherever `table` is referenced.
    AddCondition(ConditionRuleDefinition),

    /// Add `column` with `value` to inserts into `table`.
    AddColumn(ColumnRuleDefinition),

    /// Group of rules matched and applied as one unit.
    Combined(CombinedRuleDefinition),
}

impl RuleDefinition {
    /// Explicit priority, if the entry sets one.
    pub fn priority(&self) -> Option<i32> {
        match self {
            RuleDefinition::AddCondition(rule) => rule.priority,
            RuleDefinition::AddColumn(rule) => rule.priority,
            RuleDefinition::Combined(rule) => rule.priority,
        }
    }

    pub(crate) fn collect_problems(&self, location: &str, problems: &mut Vec<String>) {
        let (table, column, value) = match self {
            RuleDefinition::AddCondition(rule) => (&rule.table, &rule.column, &rule.value),
            RuleDefinition::AddColumn(rule) => (&rule.table, &rule.column, &rule.value),
            RuleDefinition::Combined(_) => return,
        };
        if table.trim().is_empty() {
            problems.push(format!("{}: table must not be empty", location));
        }
        if column.trim().is_empty() {
            problems.push(format!("{}: column must not be empty", location));
        }
        if let RuleValue::Float(number) = value
            && !number.is_finite()
        {
            problems.push(format!(
                "{}: value {} has no SQL literal form",
                location, number
            ));
        }
    }
}

/// Condition injection rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRuleDefinition {
    /// Statement kind the condition applies to.
    #[serde(default)]
    pub statement: StatementTarget,

    /// Target table, optionally schema-qualified.
    pub table: String,

    pub column: String,

    #[serde(default)]
    pub value: RuleValue,

    #[serde(default)]
    pub priority: Option<i32>,
}

/// Insert column rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRuleDefinition {
    pub table: String,

    pub column: String,

    #[serde(default)]
    pub value: RuleValue,

    #[serde(default)]
    pub priority: Option<i32>,
}

/// Composite rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRuleDefinition {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,

    #[serde(default)]
    pub priority: Option<i32>,
}

/// Statement kinds a condition rule can target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementTarget {
    #[default]
    Select,
    Update,
    Delete,
}

impl fmt::Display for StatementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementTarget::Select => write!(f, "select"),
            StatementTarget::Update => write!(f, "update"),
            StatementTarget::Delete => write!(f, "delete"),
        }
    }
}

/// Scalar written in a rules file.
///
/// YAML scalars keep their natural type: `1` is an integer, `"1"` a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}
