//! Flag-driven `WHERE` clause rendering.
//!
//! [`build_where`] walks a flat field sequence once, left to right:
//!
//! - `$n` placeholders are numbered in emission order. `IN`, `IS NULL`,
//!   `IS NOT NULL` and column-to-column comparisons take none, `BETWEEN` takes two.
//! - A field's chaining key joins it to the *next* field, so the last key is dropped.
//! - `group_open` prefixes `(` to the column, `group_close` appends `)`, and any
//!   group still open after the last field is closed there.
//!
//! The argument list stays in lockstep with the placeholders: `args[k]` is `$k+1`.

use crate::error::{FilterError, FilterResult};
use crate::field::{ChainingKey, Field, Operator};
use crate::value::{FieldValue, Value};
use tokio_postgres::types::ToSql;

/// A rendered `WHERE ...` fragment and its bound arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    sql: String,
    args: Vec<Value>,
}

impl WhereClause {
    pub(crate) fn new(sql: String, args: Vec<Value>) -> Self {
        Self { sql, args }
    }

    /// The fragment, starting with `WHERE `.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Arguments in placeholder order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Get parameter references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

/// Render-ready copy of a [`Field`] with every default applied.
struct ResolvedField<'a> {
    /// Lower-cased `source.name`, prefixed with `(` when the field opens a group.
    name: String,
    /// Lower-cased `source.column` of a column-to-column comparison.
    other_column: Option<String>,
    operator: Operator,
    chaining_key: ChainingKey,
    field: &'a Field,
}

impl<'a> ResolvedField<'a> {
    fn resolve(field: &'a Field) -> Self {
        let mut name = qualify(field.source.as_deref(), &field.name);
        if field.group_open {
            name.insert(0, '(');
        }
        let other_column = field
            .name_value_from_table
            .as_deref()
            .map(|other| qualify(field.source_name_value_from_table.as_deref(), other));

        Self {
            name: name.to_lowercase(),
            other_column: other_column.map(|c| c.to_lowercase()),
            operator: field.operator.unwrap_or_default(),
            chaining_key: field.chaining_key.unwrap_or_default(),
            field,
        }
    }
}

/// `source.name`, or `name` when there is no (or an empty) source.
pub(crate) fn qualify(source: Option<&str>, name: &str) -> String {
    match source {
        Some(source) if !source.is_empty() => format!("{source}.{name}"),
        _ => name.to_string(),
    }
}

/// Render a field sequence into `WHERE ...` plus its arguments.
///
/// Fails with [`FilterError::FieldsEmpty`] on an empty sequence, with a range
/// error when a `BETWEEN` field has a missing or mismatched bound, and with
/// [`FilterError::ScalarValueRequired`] when a comparison has nothing to bind.
/// Such a comparison is rejected rather than rendered with a placeholder that
/// has no argument. A failure never yields partial SQL.
pub fn build_where(fields: &[Field]) -> FilterResult<WhereClause> {
    let result = render(fields);

    #[cfg(feature = "tracing")]
    match &result {
        Ok(clause) => tracing::trace!(
            target: "pgfilter.sql",
            sql = %clause.sql,
            arg_count = clause.args.len(),
            "rendered where clause"
        ),
        Err(err) => tracing::debug!(
            target: "pgfilter.sql",
            error = %err,
            field_count = fields.len(),
            "rejected where clause"
        ),
    }

    result
}

fn render(fields: &[Field]) -> FilterResult<WhereClause> {
    let Some(last) = fields.len().checked_sub(1) else {
        return Err(FilterError::FieldsEmpty);
    };

    let mut sql = String::from("WHERE ");
    let mut args: Vec<Value> = Vec::new();
    let mut open_groups = 0usize;
    let mut param = 1usize;

    for (i, field) in fields.iter().enumerate() {
        let resolved = ResolvedField::resolve(field);
        if field.group_open {
            open_groups += 1;
        }

        let binds = render_body(&resolved, param, &mut sql, &mut args)?;
        if resolved.operator == Operator::Between {
            param += 1;
        }

        if open_groups > 0 && field.group_close {
            sql.push(')');
            open_groups -= 1;
        }
        if open_groups > 0 && i == last {
            sql.push_str(&")".repeat(open_groups));
        }

        if i != last {
            sql.push_str(&format!(" {} ", resolved.chaining_key));
        }

        if binds {
            param += 1;
        }
        debug_assert_eq!(param, args.len() + 1);
    }

    Ok(WhereClause::new(sql, args))
}

/// Write one field's condition. Returns true if it bound arguments.
fn render_body(
    resolved: &ResolvedField<'_>,
    param: usize,
    sql: &mut String,
    args: &mut Vec<Value>,
) -> FilterResult<bool> {
    let field = resolved.field;
    let name = &resolved.name;

    match resolved.operator {
        Operator::In => {
            sql.push_str(&render_in(name, field.value.as_ref()));
            Ok(false)
        }
        op @ (Operator::IsNull | Operator::IsNotNull) => {
            sql.push_str(&format!("{name} {op}"));
            Ok(false)
        }
        op @ Operator::Between => {
            let (from, to) = field.validate_from_and_to_values()?;
            sql.push_str(&format!("{name} {op} ${} AND ${}", param, param + 1));
            args.push(from);
            args.push(to);
            Ok(true)
        }
        op if field.is_value_from_table => {
            let other = resolved
                .other_column
                .as_deref()
                .ok_or_else(|| FilterError::ColumnMissing(field.name.clone()))?;
            sql.push_str(&format!("{name} {op} {other}"));
            Ok(false)
        }
        op => {
            let value = field
                .value
                .as_ref()
                .and_then(FieldValue::as_scalar)
                .ok_or_else(|| FilterError::ScalarValueRequired(field.name.clone()))?;
            sql.push_str(&format!("{name} {op} ${param}"));
            args.push(value.clone());
            Ok(true)
        }
    }
}

/// Render the `IN (...)` condition of a single field.
///
/// The list is inlined as literals and binds nothing. An empty list, a scalar
/// or a missing value renders `{column} = 0` so the filter never matches
/// every row.
pub fn build_in(field: &Field) -> String {
    let resolved = ResolvedField::resolve(field);
    render_in(&resolved.name, field.value.as_ref())
}

fn render_in(name: &str, value: Option<&FieldValue>) -> String {
    match value.and_then(FieldValue::as_list) {
        Some(list) if !list.is_empty() => format!("{name} IN ({})", list.to_sql_literals()),
        _ => format!("{name} = 0"),
    }
}
