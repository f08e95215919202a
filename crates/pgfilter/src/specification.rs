//! Request-level bundle of filters, sorts and pagination.

use crate::error::FilterResult;
use crate::field::Fields;
use crate::pagination::Pagination;
use crate::sort::SortFields;
use crate::value::Value;
use crate::where_clause::build_where;
use serde::{Deserialize, Serialize};
use tokio_postgres::types::ToSql;

/// Everything a list endpoint receives to filter, sort and page a query.
///
/// Deserializes from JSON such as:
///
/// ```json
/// {
///   "filters": [{"name": "employer_id", "value": 1}],
///   "sorts": [{"name": "id", "order": "DESC"}],
///   "pagination": {"page": 2, "limit": 10}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldsSpecification {
    pub filters: Fields,
    pub sorts: SortFields,
    pub pagination: Pagination,
}

impl FieldsSpecification {
    pub fn new(filters: impl Into<Fields>) -> Self {
        Self {
            filters: filters.into(),
            ..Self::default()
        }
    }

    pub fn sorts(mut self, sorts: impl Into<SortFields>) -> Self {
        self.sorts = sorts.into();
        self
    }

    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Check filter and sort names against `columns`, and filter sources
    /// against `sources` when given.
    pub fn validate<S: AsRef<str>>(&self, columns: &[S], sources: Option<&[S]>) -> FilterResult<()> {
        self.filters.validate_names(columns)?;
        if let Some(sources) = sources {
            self.filters.validate_sources(sources)?;
        }
        self.sorts.validate_names(columns)
    }

    /// Compose `{select} WHERE ... ORDER BY ... LIMIT ... OFFSET ...`.
    ///
    /// Empty parts are left out; no filters means no `WHERE`.
    pub fn build_query(&self, select: &str) -> FilterResult<BuiltQuery> {
        let mut parts: Vec<String> = vec![select.to_string()];
        let mut args = Vec::new();

        if !self.filters.is_empty() {
            let (sql, where_args) = build_where(&self.filters)?.into_parts();
            parts.push(sql);
            args = where_args;
        }
        parts.push(self.sorts.to_sql());
        parts.push(self.pagination.to_sql());

        parts.retain(|p| !p.is_empty());
        Ok(BuiltQuery {
            sql: parts.join(" "),
            args,
        })
    }
}

/// A complete statement and its bound arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuiltQuery {
    sql: String,
    args: Vec<Value>,
}

impl BuiltQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Get parameter references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.args.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::field::Field;
    use crate::sort::SortField;

    #[test]
    fn full_query() {
        let spec = FieldsSpecification::new(vec![Field::eq("employer_id", 1), Field::is_null("ends_at")])
            .sorts(vec![SortField::desc("id")])
            .pagination(Pagination::new(2, 10));

        let query = spec.build_query("SELECT id FROM contracts").unwrap();
        assert_eq!(
            query.sql(),
            "SELECT id FROM contracts WHERE employer_id = $1 AND ends_at IS NULL ORDER BY id DESC LIMIT 10 OFFSET 10"
        );
        assert_eq!(query.args(), &[Value::from(1)]);
        assert_eq!(query.params_ref().len(), 1);
    }

    #[test]
    fn no_filters_no_where() {
        let spec = FieldsSpecification::default().sorts(vec![SortField::new("id")]);
        let query = spec.build_query("SELECT id FROM t").unwrap();
        assert_eq!(query.sql(), "SELECT id FROM t ORDER BY id ASC");
        assert!(query.args().is_empty());

        let query = FieldsSpecification::default().build_query("SELECT id FROM t").unwrap();
        assert_eq!(query.sql(), "SELECT id FROM t");
    }

    #[test]
    fn render_errors_propagate() {
        let spec = FieldsSpecification::new(vec![Field::new("age")]);
        assert_eq!(
            spec.build_query("SELECT 1"),
            Err(FilterError::ScalarValueRequired("age".to_string()))
        );
    }

    #[test]
    fn validate_allow_lists() {
        let spec = FieldsSpecification::new(vec![Field::eq("employer_id", 1).source("c")])
            .sorts(vec![SortField::new("created_at")]);

        assert!(spec.validate(&["employer_id", "created_at"], Some(&["c"][..])).is_ok());
        assert_eq!(
            spec.validate(&["employer_id"], None),
            Err(FilterError::SortFieldNotAllowed("created_at".to_string()))
        );
        assert_eq!(
            spec.validate(&["employer_id", "created_at"], Some(&[""][..])),
            Err(FilterError::SourceNotAllowed("c".to_string()))
        );
    }
}
