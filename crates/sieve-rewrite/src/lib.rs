//! # sieve-rewrite
//!
//! Priority-ordered rewriting of SQL statements.
//!
//! A [`RewriteEngine`] parses a statement, runs every matching [`Rule`] in
//! ascending priority order and prints the result:
//!
//! **Before:**
//! ```sql
//! SELECT * FROM orders o WHERE o.status = 'pending' OR o.status = 'new'
//! ```
//!
//! **After** (`add_condition` on `orders.tenant_id`):
//! ```sql
//! SELECT * FROM orders o WHERE (o.status = 'pending' OR o.status = 'new') AND o.tenant_id = 'client_a'
//! ```
//!
//! ## Built-in rules
//!
//! | Rule | Statement | Effect |
//! |------|-----------|--------|
//! | `AddConditionRule::select` | `SELECT` | Condition in WHERE / JOIN ON, including subqueries |
//! | `AddConditionRule::update` | `UPDATE` | Condition in WHERE |
//! | `AddConditionRule::delete` | `DELETE` | Condition in WHERE |
//! | `AddColumnRule` | `INSERT` | Extra column and value in every row |
//! | `CombinedRule` | any | Group of the above applied together |
//!
//! `RewriteEngine::run` never fails: unparseable SQL, failing rules and
//! no-op rewrites all return the input unchanged.

pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod inject;
pub mod matcher;
pub mod parser;
pub mod rule;
pub mod value;

pub use condition::ConditionExpression;
pub use config::build_rules;
pub use engine::{RewriteEngine, RewriteReport};
pub use error::RewriteError;
pub use parser::{SqlParser, StatementKind};
pub use rule::{priority, AddColumnRule, AddConditionRule, CombinedRule, Rule, TypedRule};
pub use value::LiteralValue;
