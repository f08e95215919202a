//! Filter field model.
//!
//! A [`Field`] is one flat filter condition as a caller (or a JSON request)
//! describes it: column, operator, value(s), the connector to the next field
//! and the grouping flags. [`Fields`] is the ordered sequence rendered by
//! [`build_where`](crate::build_where).
//!
//! # Example
//! ```ignore
//! use pgfilter::{Field, Fields, build_where};
//!
//! let fields = Fields::from(vec![
//!     Field::eq("employer_id", 1),
//!     Field::eq("is_active", true).group_open().or(),
//!     Field::eq("is_staff", false).group_close(),
//! ]);
//! let clause = build_where(&fields)?;
//! assert_eq!(clause.sql(), "WHERE employer_id = $1 AND (is_active = $2 OR is_staff = $3)");
//! ```

use crate::error::{FilterError, FilterResult};
use crate::value::{FieldValue, Value, ValueList};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a filter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "<>")]
    NotEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "ILIKE")]
    ILike,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "IS NULL")]
    IsNull,
    #[serde(rename = "IS NOT NULL")]
    IsNotNull,
    #[serde(rename = "BETWEEN")]
    Between,
}

impl Operator {
    /// SQL text of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEqual => "<>",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessOrEqual => "<=",
            Operator::GreaterOrEqual => ">=",
            Operator::ILike => "ILIKE",
            Operator::In => "IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Between => "BETWEEN",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean connector joining a field to the one after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChainingKey {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl ChainingKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ChainingKey::And => "AND",
            ChainingKey::Or => "OR",
        }
    }
}

impl fmt::Display for ChainingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filter condition.
///
/// Unset `operator` and `chaining_key` default to `=` and `AND` when rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Field {
    pub name: String,
    pub operator: Option<Operator>,
    pub value: Option<FieldValue>,

    /// Lower bound, only read by `BETWEEN`.
    pub from_value: Option<Value>,
    /// Upper bound, only read by `BETWEEN`.
    pub to_value: Option<Value>,

    /// Connector placed after this field. The last field's key is never rendered.
    pub chaining_key: Option<ChainingKey>,

    /// Table or alias the column belongs to, e.g. `c` in `c.employer_id`.
    pub source: Option<String>,

    /// Opens a parenthesized group starting at this field.
    pub group_open: bool,
    /// Closes the innermost open group after this field.
    pub group_close: bool,

    /// Compare against another column (`name_value_from_table`) instead of a bound value.
    pub is_value_from_table: bool,
    pub name_value_from_table: Option<String>,
    pub source_name_value_from_table: Option<String>,
}

impl Field {
    /// Create a field for `name` with no operator or value.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn with(name: impl Into<String>, op: Operator, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            operator: Some(op),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// column = value
    pub fn eq(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::with(name, Operator::Equals, value)
    }

    /// column <> value
    pub fn ne(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::with(name, Operator::NotEqual, value)
    }

    /// column < value
    pub fn lt(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::with(name, Operator::LessThan, value)
    }

    /// column > value
    pub fn gt(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::with(name, Operator::GreaterThan, value)
    }

    /// column <= value
    pub fn lte(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::with(name, Operator::LessOrEqual, value)
    }

    /// column >= value
    pub fn gte(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::with(name, Operator::GreaterOrEqual, value)
    }

    /// column ILIKE pattern
    pub fn ilike(name: impl Into<String>, pattern: impl Into<FieldValue>) -> Self {
        Self::with(name, Operator::ILike, pattern)
    }

    /// column IN (literals...)
    pub fn in_list(name: impl Into<String>, values: impl Into<ValueList>) -> Self {
        Self::with(name, Operator::In, values.into())
    }

    /// column IS NULL
    pub fn is_null(name: impl Into<String>) -> Self {
        Self::new(name).operator(Operator::IsNull)
    }

    /// column IS NOT NULL
    pub fn is_not_null(name: impl Into<String>) -> Self {
        Self::new(name).operator(Operator::IsNotNull)
    }

    /// column BETWEEN from AND to
    pub fn between(
        name: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            operator: Some(Operator::Between),
            from_value: Some(from.into()),
            to_value: Some(to.into()),
            ..Self::default()
        }
    }

    /// column {op} other_column
    pub fn compare_column(
        name: impl Into<String>,
        op: Operator,
        other_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            operator: Some(op),
            is_value_from_table: true,
            name_value_from_table: Some(other_column.into()),
            ..Self::default()
        }
    }

    /// Set the operator.
    pub fn operator(mut self, op: Operator) -> Self {
        self.operator = Some(op);
        self
    }

    /// Set the value.
    pub fn value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the table or alias of the column.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the table or alias of the compared column.
    pub fn other_source(mut self, source: impl Into<String>) -> Self {
        self.source_name_value_from_table = Some(source.into());
        self
    }

    /// Set the connector to the next field.
    pub fn chaining(mut self, key: ChainingKey) -> Self {
        self.chaining_key = Some(key);
        self
    }

    /// Join the next field with `AND`.
    pub fn and(self) -> Self {
        self.chaining(ChainingKey::And)
    }

    /// Join the next field with `OR`.
    pub fn or(self) -> Self {
        self.chaining(ChainingKey::Or)
    }

    /// Open a group at this field.
    pub fn group_open(mut self) -> Self {
        self.group_open = true;
        self
    }

    /// Close a group after this field.
    pub fn group_close(mut self) -> Self {
        self.group_close = true;
        self
    }

    /// Check the `BETWEEN` bounds: both present and of compatible value kinds.
    ///
    /// Returns the bounds as one variant, see [`Value::unify`].
    pub fn validate_from_and_to_values(&self) -> FilterResult<(Value, Value)> {
        let from = self
            .from_value
            .as_ref()
            .ok_or(FilterError::FromValueMissing)?;
        let to = self.to_value.as_ref().ok_or(FilterError::ToValueMissing)?;

        from.unify(to).ok_or(FilterError::RangeTypeMismatch {
            from: from.type_name(),
            to: to.type_name(),
        })
    }
}

/// Ordered sequence of filter fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields(Vec<Field>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append a field.
    pub fn push(&mut self, field: Field) {
        self.0.push(field);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Field] {
        &self.0
    }

    /// Check every field name against `allowed` (case-insensitive).
    pub fn validate_names<S: AsRef<str>>(&self, allowed: &[S]) -> FilterResult<()> {
        for field in &self.0 {
            if !contains_ignore_case(allowed, &field.name) {
                return Err(FilterError::FieldNotAllowed(field.name.clone()));
            }
        }
        Ok(())
    }

    /// Check every field source against `allowed` (case-insensitive).
    ///
    /// A field without source matches an empty entry in `allowed`.
    pub fn validate_sources<S: AsRef<str>>(&self, allowed: &[S]) -> FilterResult<()> {
        for field in &self.0 {
            let source = field.source.as_deref().unwrap_or("");
            if !contains_ignore_case(allowed, source) {
                return Err(FilterError::SourceNotAllowed(source.to_string()));
            }
        }
        Ok(())
    }

    /// Find the first field named `name` (case-insensitive).
    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.0.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

pub(crate) fn contains_ignore_case<S: AsRef<str>>(allowed: &[S], name: &str) -> bool {
    allowed
        .iter()
        .any(|a| a.as_ref().to_lowercase() == name.to_lowercase())
}

/// `name: value, ...` for every field, most recent first, ending in `not found`.
impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in self.0.iter().rev() {
            match &field.value {
                Some(value) => write!(f, "{}: {}, ", field.name, value)?,
                None => write!(f, "{}: <nil>, ", field.name)?,
            }
        }
        f.write_str("not found")
    }
}

impl From<Vec<Field>> for Fields {
    fn from(fields: Vec<Field>) -> Self {
        Self(fields)
    }
}

impl FromIterator<Field> for Fields {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Field> for Fields {
    fn extend<I: IntoIterator<Item = Field>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Fields {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl std::ops::Deref for Fields {
    type Target = [Field];

    fn deref(&self) -> &[Field] {
        &self.0
    }
}
