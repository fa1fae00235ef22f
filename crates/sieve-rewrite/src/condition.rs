//! Equality conditions and predicate merging.

use sqlparser::ast::{BinaryOperator, Expr, Ident};

use crate::matcher::ident_from_name;
use crate::value::LiteralValue;

/// `table.column = value`, bound to one table reference.
///
/// Instances are immutable: injecting the same condition at several sites
/// goes through [`ConditionExpression::reconstruct_with_alias`], which
/// returns a new value each time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionExpression {
    table: Ident,
    column: Ident,
    value: LiteralValue,
}

impl ConditionExpression {
    pub fn new(table: &str, column: &str, value: impl Into<LiteralValue>) -> Self {
        Self {
            table: ident_from_name(table),
            column: ident_from_name(column),
            value: value.into(),
        }
    }

    /// Same column and value, qualified by `alias` instead.
    pub fn reconstruct_with_alias(&self, alias: Ident) -> Self {
        Self {
            table: alias,
            column: self.column.clone(),
            value: self.value.clone(),
        }
    }

    pub fn table(&self) -> &Ident {
        &self.table
    }

    pub fn column(&self) -> &Ident {
        &self.column
    }

    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    /// Render as an AST predicate.
    pub fn to_expr(&self) -> Expr {
        Expr::BinaryOp {
            left: Box::new(Expr::CompoundIdentifier(vec![
                self.table.clone(),
                self.column.clone(),
            ])),
            op: BinaryOperator::Eq,
            right: Box::new(self.value.to_expr()),
        }
    }
}

/// Combine an optional existing predicate with a new one.
///
/// The existing predicate is parenthesized and placed on the left so an
/// `OR` inside it cannot bind to the new term.
pub fn conjoin(existing: Option<Expr>, predicate: Expr) -> Expr {
    match existing {
        None => predicate,
        Some(existing) => Expr::BinaryOp {
            left: Box::new(Expr::Nested(Box::new(existing))),
            op: BinaryOperator::And,
            right: Box::new(predicate),
        },
    }
}

/// Merge `predicate` into a WHERE-style slot in place.
pub fn merge_predicate(slot: &mut Option<Expr>, predicate: Expr) {
    let existing = slot.take();
    *slot = Some(conjoin(existing, predicate));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_condition() {
        let condition = ConditionExpression::new("tenant", "tenant_id", "TENANT_1");
        assert_eq!(condition.to_expr().to_string(), "tenant.tenant_id = 'TENANT_1'");
    }

    #[test]
    fn test_reconstruct_leaves_template_untouched() {
        let template = ConditionExpression::new("tenant", "tenant_id", 1i64);
        let bound = template.reconstruct_with_alias(Ident::new("t"));

        assert_eq!(bound.to_expr().to_string(), "t.tenant_id = 1");
        assert_eq!(template.table().value, "tenant");
        assert_eq!(template.to_expr().to_string(), "tenant.tenant_id = 1");
    }

    #[test]
    fn test_quoted_names_render_quoted() {
        let condition = ConditionExpression::new("\"Tenant\"", "\"TenantId\"", "A");
        assert_eq!(condition.to_expr().to_string(), "\"Tenant\".\"TenantId\" = 'A'");
    }

    #[test]
    fn test_merge_into_empty_slot() {
        let mut slot = None;
        merge_predicate(&mut slot, ConditionExpression::new("t", "c", 1i64).to_expr());
        assert_eq!(slot.unwrap().to_string(), "t.c = 1");
    }

    #[test]
    fn test_merge_parenthesizes_existing_predicate() {
        let mut slot = Some(ConditionExpression::new("t", "a", 1i64).to_expr());
        merge_predicate(&mut slot, ConditionExpression::new("t", "b", 2i64).to_expr());
        merge_predicate(&mut slot, ConditionExpression::new("t", "c", 3i64).to_expr());
        assert_eq!(
            slot.unwrap().to_string(),
            "((t.a = 1) AND t.b = 2) AND t.c = 3"
        );
    }
}
