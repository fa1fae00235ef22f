//! Column injection into INSERT statements.

use sqlparser::ast::{
    Expr, FunctionArg, FunctionArgExpr, FunctionArguments, Ident, Insert, SetExpr, TableObject,
};

use crate::error::RewriteError;
use crate::matcher::{names_equal, TableTarget};
use crate::value::LiteralValue;

/// Appends one column and its value to inserts into a target table.
pub struct ColumnInjector<'a> {
    target: &'a TableTarget,
    column: &'a Ident,
    value: &'a LiteralValue,
}

impl<'a> ColumnInjector<'a> {
    pub fn new(target: &'a TableTarget, column: &'a Ident, value: &'a LiteralValue) -> Self {
        Self {
            target,
            column,
            value,
        }
    }

    /// Add the column to `insert` if it targets the table.
    ///
    /// Returns `Ok(false)` for other tables. The statement is left untouched
    /// whenever an error is returned.
    pub fn inject(&self, insert: &mut Insert) -> Result<bool, RewriteError> {
        let TableObject::TableName(name) = &insert.table else {
            return Ok(false);
        };
        if !self.target.matches(name, None) {
            return Ok(false);
        }
        let table = name.to_string();

        if insert.columns.is_empty() {
            return Err(RewriteError::UnsupportedValuesShape {
                table,
                reason: "statement has no column list".to_string(),
            });
        }
        if insert
            .columns
            .iter()
            .any(|column| names_equal(&column.value, &self.column.value))
        {
            return Err(RewriteError::UnsupportedValuesShape {
                table,
                reason: format!("column {} is already listed", self.column),
            });
        }

        let Some(source) = insert.source.as_mut() else {
            return Err(RewriteError::MissingInsertSource { table });
        };
        let rows = match source.body.as_mut() {
            SetExpr::Values(values) => &mut values.rows,
            other => {
                return Err(RewriteError::UnsupportedInsertSource {
                    table,
                    source_kind: source_kind(other).to_string(),
                });
            }
        };

        append_value(rows, self.value.to_expr(), &table)?;
        insert.columns.push(self.column.clone());
        Ok(true)
    }
}

/// Append `value` according to the shape of the VALUES list.
fn append_value(rows: &mut Vec<Vec<Expr>>, value: Expr, table: &str) -> Result<(), RewriteError> {
    if rows.is_empty() {
        rows.push(vec![value]);
        return Ok(());
    }

    if rows.len() > 1 {
        for row in rows.iter_mut() {
            row.push(value.clone());
        }
        return Ok(());
    }

    let row = &mut rows[0];
    if !matches!(row.first(), Some(Expr::Function(_))) {
        row.push(value);
        return Ok(());
    }

    // Function-call row: the value becomes an extra argument of every call.
    for expr in row.iter() {
        if function_arguments(expr).is_none() {
            return Err(RewriteError::UnsupportedValuesShape {
                table: table.to_string(),
                reason: format!("`{}` is not a call with an argument list", expr),
            });
        }
    }
    for expr in row.iter_mut() {
        if let Some(args) = function_arguments_mut(expr) {
            args.push(FunctionArg::Unnamed(FunctionArgExpr::Expr(value.clone())));
        }
    }
    Ok(())
}

fn function_arguments(expr: &Expr) -> Option<&Vec<FunctionArg>> {
    match expr {
        Expr::Function(function) => match &function.args {
            FunctionArguments::List(list) => Some(&list.args),
            _ => None,
        },
        _ => None,
    }
}

fn function_arguments_mut(expr: &mut Expr) -> Option<&mut Vec<FunctionArg>> {
    match expr {
        Expr::Function(function) => match &mut function.args {
            FunctionArguments::List(list) => Some(&mut list.args),
            _ => None,
        },
        _ => None,
    }
}

fn source_kind(body: &SetExpr) -> &'static str {
    match body {
        SetExpr::Select(_) => "SELECT",
        SetExpr::Query(_) => "subquery",
        SetExpr::SetOperation { .. } => "set operation",
        SetExpr::Values(_) => "VALUES",
        _ => "statement",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SqlParser;
    use pretty_assertions::assert_eq;
    use sqlparser::ast::Statement;

    fn run(sql: &str) -> (Result<bool, RewriteError>, String) {
        let target = TableTarget::new("tenant");
        let column = Ident::new("tenant_id");
        let value = LiteralValue::from("T1");
        let injector = ColumnInjector::new(&target, &column, &value);

        let mut stmt = SqlParser::default().parse_statement(sql).unwrap();
        let Statement::Insert(insert) = &mut stmt else {
            panic!("expected insert");
        };
        let result = injector.inject(insert);
        (result, stmt.to_string())
    }

    #[test]
    fn test_flat_row() {
        let (result, sql) = run("INSERT INTO tenant (name) VALUES ('NAME')");
        assert!(result.unwrap());
        assert_eq!(sql, "INSERT INTO tenant (name, tenant_id) VALUES ('NAME', 'T1')");
    }

    #[test]
    fn test_row_batch() {
        let (result, sql) = run("INSERT INTO tenant(name) VALUES ('NAME'),('OTHER')");
        assert!(result.unwrap());
        assert_eq!(
            sql,
            "INSERT INTO tenant (name, tenant_id) VALUES ('NAME', 'T1'), ('OTHER', 'T1')"
        );
    }

    #[test]
    fn test_function_call_row() {
        let (result, sql) = run("INSERT INTO tenant (name) VALUES (UPPER('NAME'))");
        assert!(result.unwrap());
        assert_eq!(
            sql,
            "INSERT INTO tenant (name, tenant_id) VALUES (UPPER('NAME', 'T1'))"
        );
    }

    #[test]
    fn test_empty_row() {
        let mut rows = vec![Vec::new()];
        append_value(&mut rows, LiteralValue::Integer(1).to_expr(), "tenant").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].to_string(), "1");

        let mut rows = Vec::new();
        append_value(&mut rows, LiteralValue::Integer(1).to_expr(), "tenant").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_other_table_untouched() {
        let (result, sql) = run("INSERT INTO other (name) VALUES ('NAME')");
        assert!(!result.unwrap());
        assert_eq!(sql, "INSERT INTO other (name) VALUES ('NAME')");
    }

    #[test]
    fn test_insert_select_rejected() {
        let (result, sql) = run("INSERT INTO tenant (name) SELECT name FROM staging");
        assert!(matches!(
            result,
            Err(RewriteError::UnsupportedInsertSource { .. })
        ));
        assert_eq!(sql, "INSERT INTO tenant (name) SELECT name FROM staging");
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let (result, _) = run("INSERT INTO tenant (name, TENANT_ID) VALUES ('NAME', 'X')");
        assert!(matches!(
            result,
            Err(RewriteError::UnsupportedValuesShape { .. })
        ));
    }

    #[test]
    fn test_mixed_function_row_rejected_without_mutation() {
        let (result, sql) = run("INSERT INTO tenant (a, b) VALUES (UPPER('x'), 'y')");
        assert!(matches!(
            result,
            Err(RewriteError::UnsupportedValuesShape { .. })
        ));
        assert_eq!(sql, "INSERT INTO tenant (a, b) VALUES (UPPER('x'), 'y')");
    }
}
