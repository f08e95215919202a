//! # pgfilter
//!
//! Render declarative filter, sort and pagination specifications into
//! parameterized PostgreSQL fragments.
//!
//! ## Features
//!
//! - **Flat filters**: an ordered [`Field`] sequence with `AND`/`OR` chaining and
//!   open/close group flags, rendered by [`build_where`]
//! - **Filter trees**: the same conditions as a [`Filter`] tree, grouped by structure
//! - **Placeholders in lockstep**: `$n` numbering always matches the argument list
//! - **Fragments**: `INSERT`, `UPDATE ... WHERE id`, `SELECT`, `ORDER BY`, `LIMIT/OFFSET`
//! - **Driver errors**: map constraint violations to domain errors
//!
//! Nothing here talks to the database. The rendered SQL and the
//! [`Value`] arguments are handed to `tokio-postgres` by the caller.
//!
//! ```ignore
//! use pgfilter::prelude::*;
//!
//! let fields = vec![
//!     Field::eq("employer_id", 1).source("c"),
//!     Field::ilike("description", "%ACTIVE%").source("cs").group_open().or(),
//!     Field::is_null("ends_at").source("c").group_close(),
//! ];
//! let clause = build_where(&fields)?;
//! assert_eq!(
//!     clause.sql(),
//!     "WHERE c.employer_id = $1 AND (cs.description ILIKE $2 OR c.ends_at IS NULL)"
//! );
//! let rows = client.query(&format!("SELECT * FROM contracts c {}", clause.sql()), &clause.params_ref()).await?;
//! ```

pub mod builder;
pub mod constraint;
pub mod error;
pub mod field;
pub mod filter;
pub mod nulls;
pub mod pagination;
pub mod prelude;
pub mod sort;
pub mod specification;
pub mod value;
pub mod where_clause;

pub use builder::{
    build_insert, build_insert_with_id, build_order_by, build_pagination, build_select,
    build_select_fields, build_update_by_id, columns_aliased,
};
pub use constraint::{Constraints, check_constraint, check_error, classify_sql_state, lookup_constraint};
pub use error::{FilterError, FilterResult};
pub use field::{ChainingKey, Field, Fields, Operator};
pub use filter::{Column, CompareOp, Filter, Predicate};
pub use nulls::{IntoNullable, parse_time_to_null};
pub use pagination::{DEFAULT_MAX_LIMIT, Pagination};
pub use sort::{Order, SortField, SortFields};
pub use specification::{BuiltQuery, FieldsSpecification};
pub use value::{FieldValue, Value, ValueList};
pub use where_clause::{WhereClause, build_in, build_where};

// Re-export for callers binding `WhereClause::params_ref()` directly.
pub use tokio_postgres::types::ToSql;
