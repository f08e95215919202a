//! Convenient imports for typical `pgfilter` usage.
//!
//! ```ignore
//! use pgfilter::prelude::*;
//! ```

pub use crate::{
    Field, Fields, FieldsSpecification, FilterError, FilterResult, Pagination, SortField,
    SortFields, Value, build_where,
};
pub use crate::{Column, CompareOp, Filter, Predicate};
pub use crate::{ChainingKey, Operator, Order};
