//! Sort model and `ORDER BY` rendering.

use crate::error::{FilterError, FilterResult};
use crate::field::contains_ignore_case;
use crate::where_clause::qualify;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Order {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `ORDER BY` entry. An unset order sorts ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortField {
    pub name: String,
    pub order: Option<Order>,
    pub source: Option<String>,
}

impl SortField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn asc(name: impl Into<String>) -> Self {
        Self::new(name).order(Order::Asc)
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self::new(name).order(Order::Desc)
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// `source.name DIR`, lower-cased column.
    fn to_sql(&self) -> String {
        let name = qualify(self.source.as_deref(), &self.name);
        format!("{} {}", name.to_lowercase(), self.order.unwrap_or_default())
    }
}

/// Ordered sequence of sort fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortFields(Vec<SortField>);

impl SortFields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, sort: SortField) {
        self.0.push(sort);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SortField> {
        self.0.iter()
    }

    /// Check every sort name against `allowed` (case-insensitive).
    pub fn validate_names<S: AsRef<str>>(&self, allowed: &[S]) -> FilterResult<()> {
        for sort in &self.0 {
            if !contains_ignore_case(allowed, &sort.name) {
                return Err(FilterError::SortFieldNotAllowed(sort.name.clone()));
            }
        }
        Ok(())
    }

    /// Render `ORDER BY a ASC, b DESC`, or an empty string when there is nothing to sort.
    pub fn to_sql(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }
        let items: Vec<String> = self.0.iter().map(SortField::to_sql).collect();
        format!("ORDER BY {}", items.join(", "))
    }
}

impl From<Vec<SortField>> for SortFields {
    fn from(sorts: Vec<SortField>) -> Self {
        Self(sorts)
    }
}

impl FromIterator<SortField> for SortFields {
    fn from_iter<I: IntoIterator<Item = SortField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SortFields {
    type Item = &'a SortField;
    type IntoIter = std::slice::Iter<'a, SortField>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_by_defaults_to_asc() {
        let sorts = SortFields::from(vec![SortField::new("id"), SortField::new("begins_at")]);
        assert_eq!(sorts.to_sql(), "ORDER BY id ASC, begins_at ASC");
    }

    #[test]
    fn order_by_with_direction() {
        let sorts = SortFields::from(vec![SortField::desc("id"), SortField::asc("begins_at")]);
        assert_eq!(sorts.to_sql(), "ORDER BY id DESC, begins_at ASC");
    }

    #[test]
    fn order_by_with_alias() {
        let sorts = SortFields::from(vec![
            SortField::new("id").source("a"),
            SortField::new("Begins_At").source("B"),
        ]);
        assert_eq!(sorts.to_sql(), "ORDER BY a.id ASC, b.begins_at ASC");
    }

    #[test]
    fn order_by_empty_source_is_unqualified() {
        let sorts: SortFields =
            serde_json::from_str(r#"[{"name": "id", "source": ""}, {"name": "Name", "source": "u"}]"#)
                .unwrap();
        assert_eq!(sorts.to_sql(), "ORDER BY id ASC, u.name ASC");
    }

    #[test]
    fn order_by_single_and_empty() {
        assert_eq!(SortFields::from(vec![SortField::new("id")]).to_sql(), "ORDER BY id ASC");
        assert_eq!(SortFields::new().to_sql(), "");
    }

    #[test]
    fn validate_names() {
        let sorts = SortFields::from(vec![SortField::new("ID"), SortField::new("name")]);
        assert!(sorts.validate_names(&["id", "name"]).is_ok());
        assert_eq!(
            sorts.validate_names(&["id"]),
            Err(FilterError::SortFieldNotAllowed("name".to_string()))
        );
    }

    #[test]
    fn deserialize_from_json() {
        let sorts: SortFields =
            serde_json::from_str(r#"[{"name": "id", "order": "DESC", "source": "c"}]"#).unwrap();
        assert_eq!(sorts, SortFields::from(vec![SortField::desc("id").source("c")]));
    }
}
