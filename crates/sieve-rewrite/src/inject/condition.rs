//! Condition injection into WHERE and JOIN ... ON clauses.
//!
//! The injector walks a statement depth-first and binds the condition to
//! every reference of the target table:
//!
//! - a table in a FROM list gets the condition in the enclosing WHERE,
//!   including the extra tables of `UPDATE ... FROM` and `DELETE ... USING`;
//! - a table on the right of a join with an ON slot gets it in that ON;
//! - a table on the right of an inner join without ON (CROSS, USING,
//!   NATURAL) gets it in the enclosing WHERE;
//! - derived tables, set operations and CTE bodies are entered as queries;
//! - a parenthesized join group hands its leading table's condition to the
//!   slot that owns the group (WHERE for a FROM item, ON for a join);
//! - subqueries inside WHERE are rewritten as queries of their own.
//!
//! Outer joins written with USING or NATURAL, and APPLY, have no place the
//! condition can go without changing the join, so they are rejected.
//!
//! Projection lists are not searched, so a subquery that only appears in
//! the select list keeps its original form.

use std::ops::ControlFlow;

use sqlparser::ast::{
    Delete, Expr, FromTable, Ident, Join, JoinConstraint, JoinOperator, Query, Select, SetExpr,
    TableFactor, TableWithJoins, Update, UpdateTableFromKind, VisitMut, VisitorMut,
};

use crate::condition::{conjoin, merge_predicate, ConditionExpression};
use crate::error::RewriteError;
use crate::matcher::{qualifier, TableTarget};

/// Binds one condition to every reference of one table.
pub struct ConditionInjector<'a> {
    target: &'a TableTarget,
    condition: &'a ConditionExpression,
    injected: usize,
}

impl<'a> ConditionInjector<'a> {
    pub fn new(target: &'a TableTarget, condition: &'a ConditionExpression) -> Self {
        Self {
            target,
            condition,
            injected: 0,
        }
    }

    /// Number of predicates merged so far.
    pub fn injected(&self) -> usize {
        self.injected
    }

    pub fn inject_query(&mut self, query: &mut Query) -> Result<(), RewriteError> {
        if let Some(with) = query.with.as_mut() {
            for cte in &mut with.cte_tables {
                self.inject_query(&mut cte.query)?;
            }
        }
        self.inject_set_expr(&mut query.body)
    }

    fn inject_set_expr(&mut self, body: &mut SetExpr) -> Result<(), RewriteError> {
        match body {
            SetExpr::Select(select) => self.inject_select(select),
            SetExpr::Query(query) => self.inject_query(query),
            SetExpr::SetOperation { left, right, .. } => {
                self.inject_set_expr(left)?;
                self.inject_set_expr(right)
            }
            _ => Ok(()),
        }
    }

    pub fn inject_select(&mut self, select: &mut Select) -> Result<(), RewriteError> {
        for from in &mut select.from {
            for alias in self.inject_table_with_joins(from)? {
                let predicate = self.bind(alias);
                merge_predicate(&mut select.selection, predicate);
            }
        }
        self.inject_subqueries(select.selection.as_mut())
    }

    pub fn inject_update(&mut self, update: &mut Update) -> Result<(), RewriteError> {
        for alias in self.inject_table_with_joins(&mut update.table)? {
            let predicate = self.bind(alias);
            merge_predicate(&mut update.selection, predicate);
        }
        if let Some(
            UpdateTableFromKind::BeforeSet(tables) | UpdateTableFromKind::AfterSet(tables),
        ) = update.from.as_mut()
        {
            self.inject_from_list(tables, &mut update.selection)?;
        }
        self.inject_subqueries(update.selection.as_mut())
    }

    pub fn inject_delete(&mut self, delete: &mut Delete) -> Result<(), RewriteError> {
        let tables = match &mut delete.from {
            FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
        };
        self.inject_from_list(tables, &mut delete.selection)?;
        if let Some(using) = delete.using.as_mut() {
            self.inject_from_list(using, &mut delete.selection)?;
        }
        self.inject_subqueries(delete.selection.as_mut())
    }

    fn inject_from_list(
        &mut self,
        tables: &mut [TableWithJoins],
        selection: &mut Option<Expr>,
    ) -> Result<(), RewriteError> {
        for table in tables {
            for alias in self.inject_table_with_joins(table)? {
                let predicate = self.bind(alias);
                merge_predicate(selection, predicate);
            }
        }
        Ok(())
    }

    /// Rewrites joins in place and returns the qualifiers the caller must
    /// merge into its own predicate slot.
    fn inject_table_with_joins(
        &mut self,
        table: &mut TableWithJoins,
    ) -> Result<Vec<Ident>, RewriteError> {
        let mut pending = self.inject_table_factor(&mut table.relation)?;
        for join in &mut table.joins {
            pending.extend(self.inject_join(join)?);
        }
        Ok(pending)
    }

    /// Scopes the right side of a join. Qualifiers that belong in the
    /// enclosing WHERE are returned.
    fn inject_join(&mut self, join: &mut Join) -> Result<Vec<Ident>, RewriteError> {
        let aliases = self.inject_table_factor(&mut join.relation)?;
        if aliases.is_empty() {
            return Ok(aliases);
        }
        match join_site(&join.join_operator) {
            JoinSite::Enclosing => Ok(aliases),
            JoinSite::Unsupported => Err(RewriteError::UnsupportedJoin {
                table: self.target.to_string(),
                operator: join.to_string().trim().to_string(),
            }),
            JoinSite::On => {
                for alias in aliases {
                    let predicate = self.bind(alias);
                    if let Some(constraint) = join_constraint_mut(&mut join.join_operator) {
                        merge_on(constraint, predicate);
                    }
                }
                Ok(Vec::new())
            }
        }
    }

    fn inject_table_factor(
        &mut self,
        relation: &mut TableFactor,
    ) -> Result<Vec<Ident>, RewriteError> {
        match relation {
            TableFactor::Table { name, alias, .. } => {
                let alias_name = alias.as_ref().map(|alias| &alias.name);
                if self.target.matches(name, alias_name) {
                    Ok(qualifier(name, alias.as_ref()).into_iter().collect())
                } else {
                    Ok(Vec::new())
                }
            }
            TableFactor::Derived { subquery, .. } => {
                self.inject_query(subquery)?;
                Ok(Vec::new())
            }
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.inject_table_with_joins(table_with_joins),
            _ => Ok(Vec::new()),
        }
    }

    fn inject_subqueries(&mut self, selection: Option<&mut Expr>) -> Result<(), RewriteError> {
        let Some(selection) = selection else {
            return Ok(());
        };
        let mut visitor = SubqueryVisitor {
            injector: self,
            depth: 0,
        };
        match selection.visit(&mut visitor) {
            ControlFlow::Break(err) => Err(err),
            ControlFlow::Continue(()) => Ok(()),
        }
    }

    fn bind(&mut self, alias: Ident) -> Expr {
        self.injected += 1;
        tracing::trace!(
            table = %self.target,
            qualifier = %alias,
            "Binding condition to table reference"
        );
        self.condition.reconstruct_with_alias(alias).to_expr()
    }
}

/// Where a condition on the right side of a join belongs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinSite {
    On,
    Enclosing,
    Unsupported,
}

fn join_site(operator: &JoinOperator) -> JoinSite {
    match operator {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::CrossJoin(constraint)
        | JoinOperator::StraightJoin(constraint) => match constraint {
            JoinConstraint::On(_) => JoinSite::On,
            JoinConstraint::Using(_) | JoinConstraint::Natural | JoinConstraint::None => {
                JoinSite::Enclosing
            }
        },
        JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint)
        | JoinOperator::AsOf { constraint, .. } => match constraint {
            JoinConstraint::On(_) | JoinConstraint::None => JoinSite::On,
            JoinConstraint::Using(_) | JoinConstraint::Natural => JoinSite::Unsupported,
        },
        JoinOperator::CrossApply | JoinOperator::OuterApply => JoinSite::Unsupported,
    }
}

fn merge_on(constraint: &mut JoinConstraint, predicate: Expr) {
    let existing = match std::mem::replace(constraint, JoinConstraint::None) {
        JoinConstraint::On(existing) => Some(existing),
        _ => None,
    };
    *constraint = JoinConstraint::On(conjoin(existing, predicate));
}

fn join_constraint_mut(operator: &mut JoinOperator) -> Option<&mut JoinConstraint> {
    match operator {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::CrossJoin(constraint)
        | JoinOperator::StraightJoin(constraint)
        | JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint)
        | JoinOperator::AsOf { constraint, .. } => Some(constraint),
        JoinOperator::CrossApply | JoinOperator::OuterApply => None,
    }
}

/// Rewrites the outermost queries nested in an expression. Deeper queries
/// are reached through `inject_query` on their parent.
struct SubqueryVisitor<'i, 'a> {
    injector: &'i mut ConditionInjector<'a>,
    depth: usize,
}

impl VisitorMut for SubqueryVisitor<'_, '_> {
    type Break = RewriteError;

    fn pre_visit_query(&mut self, query: &mut Query) -> ControlFlow<Self::Break> {
        if self.depth == 0
            && let Err(err) = self.injector.inject_query(query)
        {
            return ControlFlow::Break(err);
        }
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &mut Query) -> ControlFlow<Self::Break> {
        self.depth = self.depth.saturating_sub(1);
        ControlFlow::Continue(())
    }
}
