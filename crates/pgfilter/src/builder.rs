//! Fixed-shape statement fragments for tables with `id`, `created_at` and
//! `updated_at` columns.
//!
//! Table and column names are inserted as given. They must come from trusted
//! code, never from request input.

use crate::error::{FilterError, FilterResult};
use crate::pagination::Pagination;
use crate::sort::SortFields;

fn require_columns<S: AsRef<str>>(columns: &[S]) -> FilterResult<()> {
    if columns.is_empty() {
        return Err(FilterError::FieldsEmpty);
    }
    Ok(())
}

fn join_columns<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

fn placeholders(range: std::ops::RangeInclusive<usize>) -> String {
    range.map(|i| format!("${i}")).collect::<Vec<_>>().join(", ")
}

/// `INSERT INTO t (a, b) VALUES ($1, $2) RETURNING id, created_at`
pub fn build_insert<S: AsRef<str>>(table: &str, columns: &[S]) -> FilterResult<String> {
    require_columns(columns)?;
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id, created_at",
        table,
        join_columns(columns),
        placeholders(1..=columns.len())
    ))
}

/// `INSERT INTO t (id, a, b) VALUES ($1, $2, $3) RETURNING created_at`
///
/// The caller binds the id first.
pub fn build_insert_with_id<S: AsRef<str>>(table: &str, columns: &[S]) -> FilterResult<String> {
    require_columns(columns)?;
    Ok(format!(
        "INSERT INTO {} (id, {}) VALUES ({}) RETURNING created_at",
        table,
        join_columns(columns),
        placeholders(1..=columns.len() + 1)
    ))
}

/// `UPDATE t SET a = $1, b = $2, updated_at = now() WHERE id = $3`
///
/// The id is bound last.
pub fn build_update_by_id<S: AsRef<str>>(table: &str, columns: &[S]) -> FilterResult<String> {
    require_columns(columns)?;
    let assignments: String = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}, ", c.as_ref(), i + 1))
        .collect();
    Ok(format!(
        "UPDATE {} SET {}updated_at = now() WHERE id = ${}",
        table,
        assignments,
        columns.len() + 1
    ))
}

/// `SELECT id, a, b, created_at, updated_at FROM t`
pub fn build_select<S: AsRef<str>>(table: &str, columns: &[S]) -> FilterResult<String> {
    require_columns(columns)?;
    Ok(format!(
        "SELECT id, {}, created_at, updated_at FROM {}",
        join_columns(columns),
        table
    ))
}

/// `SELECT a, b FROM t`
pub fn build_select_fields<S: AsRef<str>>(table: &str, columns: &[S]) -> FilterResult<String> {
    require_columns(columns)?;
    Ok(format!("SELECT {} FROM {}", join_columns(columns), table))
}

/// `ORDER BY ...`, or an empty string when `sorts` is empty.
pub fn build_order_by(sorts: &SortFields) -> String {
    sorts.to_sql()
}

/// `LIMIT n OFFSET m`, or an empty string when no pagination was requested.
pub fn build_pagination(pagination: &Pagination) -> String {
    pagination.to_sql()
}

/// `b.id, b.title, b.created_at, b.updated_at` for alias `b`, or an empty
/// string when `columns` is empty.
pub fn columns_aliased<S: AsRef<str>>(columns: &[S], alias: &str) -> String {
    if columns.is_empty() {
        return String::new();
    }
    let middle: String = columns
        .iter()
        .map(|c| format!("{alias}.{}, ", c.as_ref()))
        .collect();
    format!("{alias}.id, {middle}{alias}.created_at, {alias}.updated_at")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortField;

    const CASHBOX: [&str; 4] = ["responsable", "country", "user_id", "account"];
    const NONE: [&str; 0] = [];

    #[test]
    fn test_insert() {
        assert_eq!(
            build_insert("cashboxes", &CASHBOX).unwrap(),
            "INSERT INTO cashboxes (responsable, country, user_id, account) VALUES ($1, $2, $3, $4) RETURNING id, created_at"
        );
        assert_eq!(
            build_insert("one", &["one_field"]).unwrap(),
            "INSERT INTO one (one_field) VALUES ($1) RETURNING id, created_at"
        );
        assert_eq!(build_insert("empty", &NONE), Err(FilterError::FieldsEmpty));
    }

    #[test]
    fn test_insert_with_id() {
        assert_eq!(
            build_insert_with_id("cashboxes", &CASHBOX).unwrap(),
            "INSERT INTO cashboxes (id, responsable, country, user_id, account) VALUES ($1, $2, $3, $4, $5) RETURNING created_at"
        );
        assert_eq!(
            build_insert_with_id("one", &["one_field"]).unwrap(),
            "INSERT INTO one (id, one_field) VALUES ($1, $2) RETURNING created_at"
        );
        assert_eq!(
            build_insert_with_id("empty", &NONE),
            Err(FilterError::FieldsEmpty)
        );
    }

    #[test]
    fn test_update_by_id() {
        assert_eq!(
            build_update_by_id("cashboxes", &CASHBOX).unwrap(),
            "UPDATE cashboxes SET responsable = $1, country = $2, user_id = $3, account = $4, updated_at = now() WHERE id = $5"
        );
        assert_eq!(
            build_update_by_id("one", &["one_field"]).unwrap(),
            "UPDATE one SET one_field = $1, updated_at = now() WHERE id = $2"
        );
        assert_eq!(
            build_update_by_id("nothing", &NONE),
            Err(FilterError::FieldsEmpty)
        );
    }

    #[test]
    fn test_select() {
        assert_eq!(
            build_select("cashboxes", &CASHBOX).unwrap(),
            "SELECT id, responsable, country, user_id, account, created_at, updated_at FROM cashboxes"
        );
        assert_eq!(
            build_select("one", &["one_field"]).unwrap(),
            "SELECT id, one_field, created_at, updated_at FROM one"
        );
        assert_eq!(build_select("nothing", &NONE), Err(FilterError::FieldsEmpty));
    }

    #[test]
    fn test_select_fields() {
        assert_eq!(
            build_select_fields("cashboxes", &CASHBOX).unwrap(),
            "SELECT responsable, country, user_id, account FROM cashboxes"
        );
        let owned = vec!["one_field".to_string()];
        assert_eq!(
            build_select_fields("one", &owned).unwrap(),
            "SELECT one_field FROM one"
        );
        assert_eq!(
            build_select_fields("nothing", &NONE),
            Err(FilterError::FieldsEmpty)
        );
    }

    #[test]
    fn test_order_by_and_pagination() {
        let sorts = SortFields::from(vec![SortField::new("id").source("a"), SortField::desc("begins_at")]);
        assert_eq!(build_order_by(&sorts), "ORDER BY a.id ASC, begins_at DESC");
        assert_eq!(build_order_by(&SortFields::new()), "");

        assert_eq!(build_pagination(&Pagination::new(2, 10)), "LIMIT 10 OFFSET 10");
        assert_eq!(build_pagination(&Pagination::default()), "");
    }

    #[test]
    fn test_columns_aliased() {
        assert_eq!(
            columns_aliased(&["title", "slug", "content", "poster"], "b"),
            "b.id, b.title, b.slug, b.content, b.poster, b.created_at, b.updated_at"
        );
        assert_eq!(columns_aliased(&NONE, "nothing"), "");
        assert_eq!(
            columns_aliased(&["one_field"], "one"),
            "one.id, one.one_field, one.created_at, one.updated_at"
        );
    }
}
