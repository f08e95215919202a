//! Bound values and membership lists.
//!
//! [`Value`] is a scalar that can be bound as a `$n` parameter. It implements
//! [`ToSql`] by delegating to the wrapped Rust value, so the argument list of a
//! rendered clause can be passed to `tokio-postgres` unchanged.
//!
//! [`ValueList`] is the inline literal list of an `IN (...)` membership filter.
//! Its values are rendered into the SQL text and are never bound.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type};
use uuid::Uuid;

/// A scalar value bound to a `$n` placeholder.
///
/// JSON input maps booleans, integers (`i32` first, then `i64`), floats and
/// strings. Dates, timestamps and UUIDs are only constructed from Rust.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Float(f64),
    Text(String),
    #[serde(skip_deserializing)]
    Date(NaiveDate),
    #[serde(skip_deserializing)]
    Timestamp(DateTime<Utc>),
    #[serde(skip_deserializing)]
    Uuid(Uuid),
}

impl Value {
    /// Name of the variant, used in range mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
            Value::Uuid(_) => "uuid",
        }
    }

    /// Returns true when both values are the same variant.
    pub fn is_same_kind(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(f64::from(*v)),
            Value::BigInt(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Bring two range ends to one variant.
    ///
    /// `Int` and `BigInt` widen to `BigInt`; an integer paired with a `Float`
    /// widens to `Float`. Any other mismatch returns `None`.
    pub fn unify(&self, other: &Value) -> Option<(Value, Value)> {
        match (self, other) {
            (a, b) if a.is_same_kind(b) => Some((a.clone(), b.clone())),
            (Value::Int(a), Value::BigInt(b)) => Some((Value::BigInt(i64::from(*a)), Value::BigInt(*b))),
            (Value::BigInt(a), Value::Int(b)) => Some((Value::BigInt(*a), Value::BigInt(i64::from(*b)))),
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                let (a, b) = (self.as_f64()?, other.as_f64()?);
                Some((Value::Float(a), Value::Float(b)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{v}"),
            Value::Timestamp(v) => f.write_str(&v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "{v}"),
        }
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) => v.to_sql(ty, out),
            Value::BigInt(v) => v.to_sql(ty, out),
            Value::Float(v) => v.to_sql(ty, out),
            Value::Text(v) => v.to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
        }
    }

    // The real type check happens per variant in `to_sql_checked`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => v.to_sql_checked(ty, out),
            Value::BigInt(v) => v.to_sql_checked(ty, out),
            Value::Float(v) => v.to_sql_checked(ty, out),
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
        }
    }
}

/// An inline literal list for `IN (...)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueList {
    Ints(Vec<i64>),
    UInts(Vec<u64>),
    Texts(Vec<String>),
}

impl ValueList {
    pub fn len(&self) -> usize {
        match self {
            ValueList::Ints(items) => items.len(),
            ValueList::UInts(items) => items.len(),
            ValueList::Texts(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render the list as comma-joined SQL literals: `1,2,3` or `'a','b'`.
    ///
    /// Text items are quoted but not escaped; callers must pass trusted values.
    pub fn to_sql_literals(&self) -> String {
        match self {
            ValueList::Ints(items) => join_literals(items.iter().map(|v| v.to_string())),
            ValueList::UInts(items) => join_literals(items.iter().map(|v| v.to_string())),
            ValueList::Texts(items) => join_literals(items.iter().map(|v| format!("'{v}'"))),
        }
    }
}

fn join_literals(items: impl Iterator<Item = String>) -> String {
    items.collect::<Vec<_>>().join(",")
}

/// The `value` slot of a filter field: one bound scalar or a membership list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    List(ValueList),
    Scalar(Value),
}

impl FieldValue {
    /// The scalar, if this is not a list.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(v) => Some(v),
            FieldValue::List(_) => None,
        }
    }

    /// The membership list, if this is not a scalar.
    pub fn as_list(&self) -> Option<&ValueList> {
        match self {
            FieldValue::List(list) => Some(list),
            FieldValue::Scalar(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(v) => write!(f, "{v}"),
            FieldValue::List(list) => write!(f, "[{}]", list.to_sql_literals()),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Scalar(v)
    }
}

impl From<ValueList> for FieldValue {
    fn from(list: ValueList) -> Self {
        FieldValue::List(list)
    }
}

macro_rules! impl_scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }

            impl From<$ty> for FieldValue {
                fn from(v: $ty) -> Self {
                    FieldValue::Scalar(Value::from(v))
                }
            }
        )*
    };
}

impl_scalar_from! {
    bool => Bool,
    i32 => Int,
    i64 => BigInt,
    f64 => Float,
    String => Text,
    &str => Text,
    NaiveDate => Date,
    DateTime<Utc> => Timestamp,
    Uuid => Uuid,
}

macro_rules! impl_list_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ValueList {
                fn from(items: $ty) -> Self {
                    ValueList::$variant(items.into_iter().map(Into::into).collect())
                }
            }

            impl From<$ty> for FieldValue {
                fn from(items: $ty) -> Self {
                    FieldValue::List(ValueList::from(items))
                }
            }
        )*
    };
}

impl_list_from! {
    Vec<i32> => Ints,
    Vec<i64> => Ints,
    Vec<u32> => UInts,
    Vec<u64> => UInts,
    Vec<String> => Texts,
    Vec<&str> => Texts,
}
