//! Built-in rules: condition injection and insert column injection.

use sieve_core::StatementTarget;
use sqlparser::ast::{Ident, Statement};

use crate::condition::ConditionExpression;
use crate::error::RewriteError;
use crate::inject::{ColumnInjector, ConditionInjector};
use crate::matcher::{ident_from_name, split_qualified, TableTarget};
use crate::parser::StatementKind;
use crate::rule::TypedRule;
use crate::value::LiteralValue;

/// Adds `table.column = value` wherever `table` is referenced by a SELECT,
/// UPDATE or DELETE.
#[derive(Debug, Clone)]
pub struct AddConditionRule {
    statement: StatementTarget,
    target: TableTarget,
    condition: ConditionExpression,
    priority: Option<i32>,
}

impl AddConditionRule {
    pub fn new(
        statement: StatementTarget,
        table: &str,
        column: &str,
        value: impl Into<LiteralValue>,
    ) -> Self {
        let target = TableTarget::new(table);
        let unqualified = split_qualified(table).last().copied().unwrap_or(table);
        Self {
            statement,
            condition: ConditionExpression::new(unqualified, column, value),
            target,
            priority: None,
        }
    }

    /// Condition rule for SELECT statements.
    pub fn select(table: &str, column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::new(StatementTarget::Select, table, column, value)
    }

    pub fn update(table: &str, column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::new(StatementTarget::Update, table, column, value)
    }

    pub fn delete(table: &str, column: &str, value: impl Into<LiteralValue>) -> Self {
        Self::new(StatementTarget::Delete, table, column, value)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn condition(&self) -> &ConditionExpression {
        &self.condition
    }
}

impl TypedRule for AddConditionRule {
    fn kind(&self) -> StatementKind {
        match self.statement {
            StatementTarget::Select => StatementKind::Select,
            StatementTarget::Update => StatementKind::Update,
            StatementTarget::Delete => StatementKind::Delete,
        }
    }

    fn target_table(&self) -> Option<&str> {
        Some(self.target.as_str())
    }

    fn priority_override(&self) -> Option<i32> {
        self.priority
    }

    fn apply_typed(&self, statement: &mut Statement) -> Result<(), RewriteError> {
        let mut injector = ConditionInjector::new(&self.target, &self.condition);
        match statement {
            Statement::Query(query) => injector.inject_query(query)?,
            Statement::Update(update) => injector.inject_update(update)?,
            Statement::Delete(delete) => injector.inject_delete(delete)?,
            _ => return Ok(()),
        }

        if injector.injected() > 0 {
            tracing::debug!(
                table = %self.target,
                column = %self.condition.column(),
                sites = injector.injected(),
                "Injected condition"
            );
        }
        Ok(())
    }

    fn rule_name(&self) -> &'static str {
        match self.statement {
            StatementTarget::Select => "AddConditionSelectRule",
            StatementTarget::Update => "AddConditionUpdateRule",
            StatementTarget::Delete => "AddConditionDeleteRule",
        }
    }
}

/// Adds `column` with `value` to every INSERT into `table`.
#[derive(Debug, Clone)]
pub struct AddColumnRule {
    target: TableTarget,
    column: Ident,
    value: LiteralValue,
    priority: Option<i32>,
}

impl AddColumnRule {
    pub fn new(table: &str, column: &str, value: impl Into<LiteralValue>) -> Self {
        Self {
            target: TableTarget::new(table),
            column: ident_from_name(column),
            value: value.into(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

impl TypedRule for AddColumnRule {
    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn target_table(&self) -> Option<&str> {
        Some(self.target.as_str())
    }

    fn priority_override(&self) -> Option<i32> {
        self.priority
    }

    fn apply_typed(&self, statement: &mut Statement) -> Result<(), RewriteError> {
        let Statement::Insert(insert) = statement else {
            return Ok(());
        };
        let injector = ColumnInjector::new(&self.target, &self.column, &self.value);
        if injector.inject(insert)? {
            tracing::debug!(
                table = %self.target,
                column = %self.column,
                "Injected insert column"
            );
        }
        Ok(())
    }

    fn rule_name(&self) -> &'static str {
        "AddColumnInsertRule"
    }
}
