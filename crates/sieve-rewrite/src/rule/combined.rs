//! Composite rule.

use sqlparser::ast::Statement;

use crate::error::RewriteError;
use crate::rule::{priority, Rule, TypedRule};

/// Runs a group of typed rules as one rule.
///
/// Sub-rules are sorted by priority when the group is built (ties keep their
/// order). The group matches when any sub-rule matches, and applying it
/// applies every sub-rule; sub-rules of another statement kind do nothing.
#[derive(Debug)]
pub struct CombinedRule {
    rules: Vec<Box<dyn TypedRule>>,
    priority: Option<i32>,
}

impl CombinedRule {
    pub fn new(mut rules: Vec<Box<dyn TypedRule>>) -> Self {
        rules.sort_by_key(|rule| rule.priority());
        Self {
            rules,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sub-rules in application order.
    pub fn rules(&self) -> &[Box<dyn TypedRule>] {
        &self.rules
    }
}

impl Rule for CombinedRule {
    fn priority(&self) -> i32 {
        self.priority.unwrap_or(priority::DEFAULT)
    }

    fn matches(&self, statement: &Statement) -> bool {
        self.rules.iter().any(|rule| rule.matches(statement))
    }

    fn apply(&self, statement: &mut Statement) -> Result<(), RewriteError> {
        for rule in &self.rules {
            rule.apply(statement)?;
        }
        Ok(())
    }
}
