//! Mapping of PostgreSQL driver errors to domain errors.

use crate::error::FilterError;
use std::collections::HashMap;

/// Constraint name to the domain error reported when it is violated.
pub type Constraints<E> = HashMap<String, E>;

/// Find the domain error registered for `constraint`.
pub fn lookup_constraint<'a, E>(
    constraints: &'a Constraints<E>,
    constraint: Option<&str>,
) -> Option<&'a E> {
    constraints.get(constraint?)
}

/// Replace a constraint violation with the domain error registered for it.
///
/// Errors that are not database errors, or whose constraint is not
/// registered, are converted unchanged.
///
/// # Example
/// ```ignore
/// let mut constraints = Constraints::new();
/// constraints.insert("users_email_key".to_string(), AppError::EmailTaken);
///
/// let err = client.execute(sql, &params).await.map_err(|e| check_constraint(&constraints, e))?;
/// ```
pub fn check_constraint<E>(constraints: &Constraints<E>, err: tokio_postgres::Error) -> E
where
    E: Clone + From<tokio_postgres::Error>,
{
    let constraint = err.as_db_error().and_then(|db_err| db_err.constraint());
    let mapped = lookup_constraint(constraints, constraint).cloned();

    match mapped {
        Some(mapped) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "pgfilter.sql",
                constraint = err.as_db_error().and_then(|e| e.constraint()).unwrap_or(""),
                "mapped constraint violation"
            );
            mapped
        }
        None => E::from(err),
    }
}

/// Classify integrity violations by SQLSTATE.
///
/// Returns `None` for anything that is not a unique, foreign key or not null
/// violation.
pub fn check_error(err: &tokio_postgres::Error) -> Option<FilterError> {
    let db_err = err.as_db_error()?;
    let constraint = db_err.constraint().unwrap_or("unknown");
    let detail = format!("{}: {}", constraint, db_err.message());

    let classified = classify_sql_state(db_err.code().code(), detail);

    #[cfg(feature = "tracing")]
    if let Some(classified) = &classified {
        tracing::debug!(
            target: "pgfilter.sql",
            code = db_err.code().code(),
            error = %classified,
            "classified database error"
        );
    }

    classified
}

/// `23505`, `23503` and `23502` to their [`FilterError`] variant.
pub fn classify_sql_state(code: &str, detail: String) -> Option<FilterError> {
    match code {
        "23505" => Some(FilterError::UniqueViolation(detail)),
        "23503" => Some(FilterError::ForeignKeyViolation(detail)),
        "23502" => Some(FilterError::NotNullViolation(detail)),
        _ => None,
    }
}
