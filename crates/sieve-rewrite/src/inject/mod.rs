//! AST rewrites shared by the built-in rules.

pub mod condition;
pub mod insert;

pub use condition::ConditionInjector;
pub use insert::ColumnInjector;
