//! Rewrite rules.
//!
//! [`Rule`] is what the engine runs. Most rules target one statement kind and
//! implement [`TypedRule`] instead, which provides `priority`, `matches` and
//! `apply` through a blanket implementation.

pub mod builtin;
pub mod combined;
pub mod priority;

use std::fmt;

use sqlparser::ast::Statement;

use crate::error::RewriteError;
use crate::parser::StatementKind;

pub use builtin::{AddColumnRule, AddConditionRule};
pub use combined::CombinedRule;

/// A unit of rewriting applied by the engine.
///
/// Rules are shared between concurrent rewrites and must not keep
/// per-statement state.
pub trait Rule: fmt::Debug + Send + Sync {
    /// Ordering key; lower runs first.
    fn priority(&self) -> i32 {
        priority::DEFAULT
    }

    /// Should `apply` run for this statement?
    fn matches(&self, statement: &Statement) -> bool;

    /// Rewrite the statement in place.
    ///
    /// An error discards every change made to the statement during the
    /// current rewrite, including changes made by earlier rules.
    fn apply(&self, statement: &mut Statement) -> Result<(), RewriteError>;

    /// Name used in logs and reports.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

/// A rule bound to one statement kind.
pub trait TypedRule: fmt::Debug + Send + Sync {
    fn kind(&self) -> StatementKind;

    /// Table the rule rewrites, when it is limited to one.
    fn target_table(&self) -> Option<&str> {
        None
    }

    /// Explicit priority; `None` uses the default for `kind()`.
    fn priority_override(&self) -> Option<i32> {
        None
    }

    /// Rewrite a statement already known to be of `kind()`.
    fn apply_typed(&self, statement: &mut Statement) -> Result<(), RewriteError>;

    fn rule_name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

impl<T: TypedRule + ?Sized> Rule for T {
    fn priority(&self) -> i32 {
        self.priority_override()
            .unwrap_or_else(|| priority::default_for(self.kind()))
    }

    fn matches(&self, statement: &Statement) -> bool {
        StatementKind::of(statement) == self.kind()
    }

    fn apply(&self, statement: &mut Statement) -> Result<(), RewriteError> {
        if self.matches(statement) {
            self.apply_typed(statement)
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        self.rule_name()
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SqlParser;

    #[derive(Debug)]
    struct DeleteMarker;

    impl TypedRule for DeleteMarker {
        fn kind(&self) -> StatementKind {
            StatementKind::Delete
        }

        fn apply_typed(&self, _statement: &mut Statement) -> Result<(), RewriteError> {
            Err(RewriteError::Rule(anyhow::anyhow!("applied")))
        }
    }

    #[derive(Debug)]
    struct Untyped;

    impl Rule for Untyped {
        fn matches(&self, _statement: &Statement) -> bool {
            true
        }

        fn apply(&self, _statement: &mut Statement) -> Result<(), RewriteError> {
            Ok(())
        }
    }

    #[test]
    fn test_typed_rule_defaults() {
        let rule = DeleteMarker;
        assert_eq!(Rule::priority(&rule), priority::DELETE_DEFAULT);
        assert_eq!(Rule::name(&rule), "DeleteMarker");
        assert_eq!(rule.target_table(), None);
    }

    #[test]
    fn test_typed_rule_applies_only_to_its_kind() {
        let parser = SqlParser::default();
        let rule = DeleteMarker;

        let mut select = parser.parse_statement("SELECT * FROM t").unwrap();
        assert!(!rule.matches(&select));
        assert!(rule.apply(&mut select).is_ok());

        let mut delete = parser.parse_statement("DELETE FROM t").unwrap();
        assert!(rule.matches(&delete));
        assert!(rule.apply(&mut delete).is_err());
    }

    #[test]
    fn test_untyped_rule_defaults() {
        assert_eq!(Untyped.priority(), priority::DEFAULT);
        assert_eq!(Untyped.name(), "Untyped");
    }
}
