//! Literal values injected into statements.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sieve_core::RuleValue;
use sqlparser::ast::{Expr, Value};

/// A literal that can be rendered as a SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    /// Rendered as `'YYYY-MM-DD'`.
    Date(NaiveDate),
    /// Rendered as `'HH:MM:SS'`.
    Time(NaiveTime),
    /// Rendered as `'YYYY-MM-DD HH:MM:SS'`.
    Timestamp(NaiveDateTime),
}

impl LiteralValue {
    /// Build the AST expression for this literal.
    pub fn to_expr(&self) -> Expr {
        let value = match self {
            LiteralValue::Null => Value::Null,
            LiteralValue::Integer(n) => Value::Number(n.to_string(), false),
            LiteralValue::Float(n) if n.is_finite() => Value::Number(n.to_string(), false),
            // NaN and infinities have no literal form.
            LiteralValue::Float(_) => Value::Null,
            LiteralValue::Text(s) => Value::SingleQuotedString(s.clone()),
            LiteralValue::Boolean(b) => Value::Boolean(*b),
            LiteralValue::Date(d) => Value::SingleQuotedString(d.format("%Y-%m-%d").to_string()),
            LiteralValue::Time(t) => Value::SingleQuotedString(t.format("%H:%M:%S").to_string()),
            LiteralValue::Timestamp(ts) => {
                Value::SingleQuotedString(ts.format("%Y-%m-%d %H:%M:%S").to_string())
            }
        };
        Expr::Value(value.into())
    }
}

impl From<RuleValue> for LiteralValue {
    fn from(value: RuleValue) -> Self {
        match value {
            RuleValue::Null => LiteralValue::Null,
            RuleValue::Boolean(b) => LiteralValue::Boolean(b),
            RuleValue::Integer(n) => LiteralValue::Integer(n),
            RuleValue::Float(n) => LiteralValue::Float(n),
            RuleValue::Text(s) => LiteralValue::Text(s),
        }
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::Text(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::Text(value)
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Integer(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Float(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Boolean(value)
    }
}

impl From<NaiveDate> for LiteralValue {
    fn from(value: NaiveDate) -> Self {
        LiteralValue::Date(value)
    }
}

impl From<NaiveTime> for LiteralValue {
    fn from(value: NaiveTime) -> Self {
        LiteralValue::Time(value)
    }
}

impl From<NaiveDateTime> for LiteralValue {
    fn from(value: NaiveDateTime) -> Self {
        LiteralValue::Timestamp(value)
    }
}

impl<T: Into<LiteralValue>> From<Option<T>> for LiteralValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(LiteralValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(value: impl Into<LiteralValue>) -> String {
        value.into().to_expr().to_string()
    }

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(render("TENANT_1"), "'TENANT_1'");
        assert_eq!(render("it's"), "'it''s'");
        assert_eq!(render(42i64), "42");
        assert_eq!(render(1.5f64), "1.5");
        assert_eq!(render(true), "true");
        assert_eq!(render(None::<i64>), "NULL");
    }

    #[test]
    fn test_non_finite_float_renders_null() {
        assert_eq!(render(f64::NAN), "NULL");
        assert_eq!(render(f64::INFINITY), "NULL");
        assert_eq!(render(f64::NEG_INFINITY), "NULL");
        assert_eq!(render(-0.25f64), "-0.25");
    }

    #[test]
    fn test_temporal_rendering() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let time = NaiveTime::from_hms_opt(7, 5, 0).unwrap();
        assert_eq!(render(date), "'2024-03-09'");
        assert_eq!(render(time), "'07:05:00'");
        assert_eq!(render(date.and_time(time)), "'2024-03-09 07:05:00'");
    }

    #[test]
    fn test_from_rule_value() {
        assert_eq!(LiteralValue::from(RuleValue::Integer(7)), LiteralValue::Integer(7));
        assert_eq!(LiteralValue::from(RuleValue::Null), LiteralValue::Null);
        assert_eq!(
            LiteralValue::from(RuleValue::Text("x".to_string())),
            LiteralValue::Text("x".to_string())
        );
    }
}
