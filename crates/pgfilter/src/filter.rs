//! Structure-driven filter tree.
//!
//! [`Filter`] expresses the same conditions as a flat [`Field`] sequence, but
//! grouping and precedence are carried by the tree instead of open/close flags:
//!
//! - `And` and `Or` join their children with ` AND ` / ` OR `.
//! - An `Or` nested directly in an `And` is parenthesized, and vice versa.
//! - `Group` always renders its child in parentheses.
//! - Empty nodes render nothing and are skipped by their parent.
//!
//! Placeholders are numbered from the argument count, so a rendered tree is
//! always balanced and `args[k]` is always `$k+1`.
//!
//! # Example
//! ```ignore
//! use pgfilter::{Filter, Column};
//!
//! let filter = Filter::and(vec![
//!     Filter::eq(Column::new("employer_id").source("c"), 1),
//!     Filter::or(vec![
//!         Filter::eq("is_active", true),
//!         Filter::is_null("terminated_at"),
//!     ]),
//! ]);
//! let clause = filter.build_where()?;
//! assert_eq!(
//!     clause.sql(),
//!     "WHERE c.employer_id = $1 AND (is_active = $2 OR terminated_at IS NULL)"
//! );
//! ```

use crate::error::{FilterError, FilterResult};
use crate::field::{Field, Operator};
use crate::value::{FieldValue, Value, ValueList};
use crate::where_clause::{WhereClause, qualify};
use std::fmt;

/// A possibly qualified column, rendered lower-cased as `source.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub source: Option<String>,
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            source: None,
            name: name.into(),
        }
    }

    /// Set the table or alias.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&qualify(self.source.as_deref(), &self.name).to_lowercase())
    }
}

/// `"name"` or `"source.name"`.
impl From<&str> for Column {
    fn from(s: &str) -> Self {
        match s.split_once('.') {
            Some((source, name)) => Column::new(name).source(source),
            None => Column::new(s),
        }
    }
}

impl From<String> for Column {
    fn from(s: String) -> Self {
        Column::from(s.as_str())
    }
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Equals,
    NotEqual,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
    ILike,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        Operator::from(self).as_str()
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CompareOp> for Operator {
    fn from(op: CompareOp) -> Self {
        match op {
            CompareOp::Equals => Operator::Equals,
            CompareOp::NotEqual => Operator::NotEqual,
            CompareOp::LessThan => Operator::LessThan,
            CompareOp::GreaterThan => Operator::GreaterThan,
            CompareOp::LessOrEqual => Operator::LessOrEqual,
            CompareOp::GreaterOrEqual => Operator::GreaterOrEqual,
            CompareOp::ILike => Operator::ILike,
        }
    }
}

/// One typed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// column op $n
    Comparison {
        column: Column,
        op: CompareOp,
        value: Value,
    },

    /// column IN (literals...), or `column = 0` for an empty list
    Membership { column: Column, values: ValueList },

    /// column IS NULL / column IS NOT NULL
    NullCheck { column: Column, negated: bool },

    /// column BETWEEN $n AND $m
    Range {
        column: Column,
        from: Value,
        to: Value,
    },

    /// column op other_column
    ColumnCompare {
        column: Column,
        op: CompareOp,
        other: Column,
    },
}

impl Predicate {
    /// Build a range, checking that both ends are compatible value kinds.
    ///
    /// Numeric ends are widened to one variant, see [`Value::unify`].
    pub fn range(column: impl Into<Column>, from: Value, to: Value) -> FilterResult<Self> {
        let (from, to) = from.unify(&to).ok_or(FilterError::RangeTypeMismatch {
            from: from.type_name(),
            to: to.type_name(),
        })?;
        Ok(Predicate::Range {
            column: column.into(),
            from,
            to,
        })
    }

    fn build(&self, args: &mut Vec<Value>) -> String {
        match self {
            Predicate::Comparison { column, op, value } => {
                args.push(value.clone());
                format!("{} {} ${}", column, op, args.len())
            }
            Predicate::Membership { column, values } => {
                if values.is_empty() {
                    format!("{column} = 0")
                } else {
                    format!("{} IN ({})", column, values.to_sql_literals())
                }
            }
            Predicate::NullCheck { column, negated } => {
                if *negated {
                    format!("{column} IS NOT NULL")
                } else {
                    format!("{column} IS NULL")
                }
            }
            Predicate::Range { column, from, to } => {
                args.push(from.clone());
                let from_idx = args.len();
                args.push(to.clone());
                format!("{} BETWEEN ${} AND ${}", column, from_idx, args.len())
            }
            Predicate::ColumnCompare { column, op, other } => {
                format!("{column} {op} {other}")
            }
        }
    }
}

/// Convert one flat field into its typed predicate.
///
/// Group flags and the chaining key are not part of a predicate and are ignored.
impl TryFrom<&Field> for Predicate {
    type Error = FilterError;

    fn try_from(field: &Field) -> FilterResult<Self> {
        let column = Column {
            source: field.source.clone().filter(|s| !s.is_empty()),
            name: field.name.clone(),
        };

        let op = match field.operator.unwrap_or_default() {
            Operator::In => {
                let values = field
                    .value
                    .as_ref()
                    .and_then(FieldValue::as_list)
                    .cloned()
                    .unwrap_or(ValueList::Ints(Vec::new()));
                return Ok(Predicate::Membership { column, values });
            }
            Operator::IsNull => {
                return Ok(Predicate::NullCheck {
                    column,
                    negated: false,
                });
            }
            Operator::IsNotNull => {
                return Ok(Predicate::NullCheck {
                    column,
                    negated: true,
                });
            }
            Operator::Between => {
                let (from, to) = field.validate_from_and_to_values()?;
                return Ok(Predicate::Range { column, from, to });
            }
            Operator::Equals => CompareOp::Equals,
            Operator::NotEqual => CompareOp::NotEqual,
            Operator::LessThan => CompareOp::LessThan,
            Operator::GreaterThan => CompareOp::GreaterThan,
            Operator::LessOrEqual => CompareOp::LessOrEqual,
            Operator::GreaterOrEqual => CompareOp::GreaterOrEqual,
            Operator::ILike => CompareOp::ILike,
        };

        if field.is_value_from_table {
            let name = field
                .name_value_from_table
                .clone()
                .ok_or_else(|| FilterError::ColumnMissing(field.name.clone()))?;
            let other = Column {
                source: field
                    .source_name_value_from_table
                    .clone()
                    .filter(|s| !s.is_empty()),
                name,
            };
            return Ok(Predicate::ColumnCompare { column, op, other });
        }

        let value = field
            .value
            .as_ref()
            .and_then(FieldValue::as_scalar)
            .cloned()
            .ok_or_else(|| FilterError::ScalarValueRequired(field.name.clone()))?;
        Ok(Predicate::Comparison { column, op, value })
    }
}

/// Filter tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Leaf(Predicate),
    /// All children must hold.
    And(Vec<Filter>),
    /// At least one child must hold.
    Or(Vec<Filter>),
    /// Explicit parentheses.
    Group(Box<Filter>),
}

impl Filter {
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And(filters)
    }

    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    pub fn group(filter: Filter) -> Self {
        Filter::Group(Box::new(filter))
    }

    fn compare(column: impl Into<Column>, op: CompareOp, value: impl Into<Value>) -> Self {
        Filter::Leaf(Predicate::Comparison {
            column: column.into(),
            op,
            value: value.into(),
        })
    }

    pub fn eq(column: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Equals, value)
    }

    pub fn ne(column: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::NotEqual, value)
    }

    pub fn lt(column: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::LessThan, value)
    }

    pub fn gt(column: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::GreaterThan, value)
    }

    pub fn lte(column: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::LessOrEqual, value)
    }

    pub fn gte(column: impl Into<Column>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::GreaterOrEqual, value)
    }

    pub fn ilike(column: impl Into<Column>, pattern: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::ILike, pattern)
    }

    pub fn in_list(column: impl Into<Column>, values: impl Into<ValueList>) -> Self {
        Filter::Leaf(Predicate::Membership {
            column: column.into(),
            values: values.into(),
        })
    }

    pub fn is_null(column: impl Into<Column>) -> Self {
        Filter::Leaf(Predicate::NullCheck {
            column: column.into(),
            negated: false,
        })
    }

    pub fn is_not_null(column: impl Into<Column>) -> Self {
        Filter::Leaf(Predicate::NullCheck {
            column: column.into(),
            negated: true,
        })
    }

    /// column BETWEEN from AND to. Both ends share `T`, so they cannot mismatch.
    pub fn between<T: Into<Value>>(column: impl Into<Column>, from: T, to: T) -> Self {
        Filter::Leaf(Predicate::Range {
            column: column.into(),
            from: from.into(),
            to: to.into(),
        })
    }

    pub fn compare_column(
        column: impl Into<Column>,
        op: CompareOp,
        other: impl Into<Column>,
    ) -> Self {
        Filter::Leaf(Predicate::ColumnCompare {
            column: column.into(),
            op,
            other: other.into(),
        })
    }

    /// Returns true if the node renders nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Filter::Leaf(_) => false,
            Filter::And(children) | Filter::Or(children) => children.iter().all(Filter::is_empty),
            Filter::Group(inner) => inner.is_empty(),
        }
    }

    /// Render the condition (without `WHERE`), appending bound values to `args`.
    ///
    /// Placeholders continue from `args.len()`, so a filter can be rendered
    /// after other bound parameters.
    pub fn build(&self, args: &mut Vec<Value>) -> String {
        match self {
            Filter::Leaf(predicate) => predicate.build(args),
            Filter::And(children) => join(children, " AND ", args, |c| matches!(c, Filter::Or(_))),
            Filter::Or(children) => join(children, " OR ", args, |c| matches!(c, Filter::And(_))),
            Filter::Group(inner) => {
                let sql = inner.build(args);
                if sql.is_empty() {
                    sql
                } else {
                    format!("({sql})")
                }
            }
        }
    }

    /// Render `WHERE ...` with placeholders starting at `$1`.
    pub fn build_where(&self) -> FilterResult<WhereClause> {
        let mut args = Vec::new();
        let sql = self.build(&mut args);
        if sql.is_empty() {
            return Err(FilterError::FieldsEmpty);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            target: "pgfilter.sql",
            sql = %sql,
            arg_count = args.len(),
            "rendered filter tree"
        );

        Ok(WhereClause::new(format!("WHERE {sql}"), args))
    }
}

fn join(
    children: &[Filter],
    sep: &str,
    args: &mut Vec<Value>,
    needs_parens: impl Fn(&Filter) -> bool,
) -> String {
    let parts: Vec<String> = children
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| {
            let sql = c.build(args);
            if needs_parens(c) {
                format!("({sql})")
            } else {
                sql
            }
        })
        .collect();
    parts.join(sep)
}

impl From<Predicate> for Filter {
    fn from(predicate: Predicate) -> Self {
        Filter::Leaf(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_display() {
        assert_eq!(Column::new("Employer_ID").source("C").to_string(), "c.employer_id");
        assert_eq!(Column::from("cs.description").to_string(), "cs.description");
        assert_eq!(Column::from("id"), Column::new("id"));
    }

    #[test]
    fn test_and_with_nested_or() {
        let filter = Filter::and(vec![
            Filter::eq("a", 1),
            Filter::or(vec![Filter::eq("b", true), Filter::eq("c", false)]),
        ]);
        let clause = filter.build_where().unwrap();
        assert_eq!(clause.sql(), "WHERE a = $1 AND (b = $2 OR c = $3)");
        assert_eq!(
            clause.args(),
            &[Value::from(1), Value::from(true), Value::from(false)]
        );
    }

    #[test]
    fn test_or_with_nested_and() {
        let filter = Filter::or(vec![
            Filter::and(vec![Filter::eq("a", 1), Filter::eq("b", 2)]),
            Filter::is_null("c"),
        ]);
        assert_eq!(
            filter.build_where().unwrap().sql(),
            "WHERE (a = $1 AND b = $2) OR c IS NULL"
        );
    }

    #[test]
    fn test_explicit_group() {
        let filter = Filter::and(vec![
            Filter::eq("a", 1),
            Filter::group(Filter::or(vec![Filter::eq("b", 2), Filter::eq("c", 3)])),
            Filter::group(Filter::eq("d", 4)),
        ]);
        assert_eq!(
            filter.build_where().unwrap().sql(),
            "WHERE a = $1 AND (b = $2 OR c = $3) AND (d = $4)"
        );
    }

    #[test]
    fn test_empty_nodes_are_skipped() {
        let filter = Filter::and(vec![
            Filter::or(vec![]),
            Filter::eq("a", 1),
            Filter::group(Filter::and(vec![])),
        ]);
        assert_eq!(filter.build_where().unwrap().sql(), "WHERE a = $1");
        assert_eq!(Filter::and(vec![]).build_where(), Err(FilterError::FieldsEmpty));
        assert!(Filter::group(Filter::or(vec![])).is_empty());
    }

    #[test]
    fn test_every_predicate() {
        let filter = Filter::and(vec![
            Filter::ilike("cs.description", "%ACTIVE%"),
            Filter::in_list("code", vec!["COL", "COP"]),
            Filter::in_list("id", Vec::<i64>::new()),
            Filter::is_not_null("c.termination_date"),
            Filter::between("begins_at", 1, 9),
            Filter::compare_column("c.ends_at", CompareOp::LessThan, "PP.Ends_At"),
            Filter::ne("status", "closed"),
        ]);
        let clause = filter.build_where().unwrap();
        assert_eq!(
            clause.sql(),
            "WHERE cs.description ILIKE $1 AND code IN ('COL','COP') AND id = 0 \
             AND c.termination_date IS NOT NULL AND begins_at BETWEEN $2 AND $3 \
             AND c.ends_at < pp.ends_at AND status <> $4"
        );
        assert_eq!(clause.args().len(), 4);
    }

    #[test]
    fn test_build_continues_numbering() {
        let mut args = vec![Value::from("existing")];
        let sql = Filter::eq("a", 1).build(&mut args);
        assert_eq!(sql, "a = $2");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_range_validation() {
        assert!(Predicate::range("n", Value::from(1), Value::from(2)).is_ok());
        assert_eq!(
            Predicate::range("n", Value::from(1), Value::from(5_000_000_000i64)),
            Ok(Predicate::Range {
                column: Column::new("n"),
                from: Value::BigInt(1),
                to: Value::BigInt(5_000_000_000),
            })
        );
        assert_eq!(
            Predicate::range("n", Value::from(1), Value::from("2")),
            Err(FilterError::RangeTypeMismatch {
                from: "int",
                to: "text"
            })
        );
    }

    #[test]
    fn test_predicate_from_field() {
        let p = Predicate::try_from(&Field::gte("hire_date", "2021-04-28").source("c").group_open())
            .unwrap();
        assert_eq!(
            p,
            Predicate::Comparison {
                column: Column::new("hire_date").source("c"),
                op: CompareOp::GreaterOrEqual,
                value: Value::from("2021-04-28"),
            }
        );

        let p = Predicate::try_from(&Field::new("id")).unwrap_err();
        assert_eq!(p, FilterError::ScalarValueRequired("id".to_string()));

        let p = Predicate::try_from(&Field::in_list("id", vec![1i64, 2])).unwrap();
        assert_eq!(
            p,
            Predicate::Membership {
                column: Column::new("id"),
                values: ValueList::Ints(vec![1, 2]),
            }
        );

        let p = Predicate::try_from(&Field::is_null("ends_at")).unwrap();
        assert_eq!(
            p,
            Predicate::NullCheck {
                column: Column::new("ends_at"),
                negated: false,
            }
        );

        let p = Predicate::try_from(
            &Field::compare_column("ends_at", Operator::Equals, "ends_at").other_source("pp"),
        )
        .unwrap();
        assert_eq!(
            Filter::from(p).build_where().unwrap().sql(),
            "WHERE ends_at = pp.ends_at"
        );

        let mut between = Field::between("begins_at", 1, 2);
        between.to_value = None;
        assert_eq!(
            Predicate::try_from(&between),
            Err(FilterError::ToValueMissing)
        );
    }

    #[test]
    fn test_tree_matches_flat_render() {
        let fields = vec![
            Field::eq("a", 1),
            Field::eq("b", true).group_open().or(),
            Field::eq("c", false).group_close(),
        ];
        let flat = crate::build_where(&fields).unwrap();

        let leaves: Vec<Filter> = fields
            .iter()
            .map(|f| Predicate::try_from(f).map(Filter::from))
            .collect::<FilterResult<_>>()
            .unwrap();
        let mut leaves = leaves.into_iter();
        let a = leaves.next().unwrap();
        let tree = Filter::and(vec![a, Filter::or(leaves.collect())]);

        assert_eq!(tree.build_where().unwrap(), flat);
    }
}
