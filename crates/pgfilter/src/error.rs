//! Error types for pgfilter

use thiserror::Error;

/// Result type alias for pgfilter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Error types for rendering and validating filter specifications
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A builder that needs at least one field received none
    #[error("no fields were provided")]
    FieldsEmpty,

    /// `BETWEEN` without a lower bound
    #[error("`from` value is empty")]
    FromValueMissing,

    /// `BETWEEN` without an upper bound
    #[error("`to` value is empty")]
    ToValueMissing,

    /// `BETWEEN` bounds of different value kinds
    #[error("`from` and `to` values are mismatched: {from} vs {to}")]
    RangeTypeMismatch {
        from: &'static str,
        to: &'static str,
    },

    /// A comparison needs exactly one bound scalar value
    #[error("the field {0} requires a single scalar value")]
    ScalarValueRequired(String),

    /// A column-to-column comparison without the other column's name
    #[error("the field {0} compares against another column but names none")]
    ColumnMissing(String),

    /// Filter field missing from the caller's allow-list
    #[error("the field {0} is not allowed for query")]
    FieldNotAllowed(String),

    /// Sort field missing from the caller's allow-list
    #[error("the field {0} is not allowed for ordering")]
    SortFieldNotAllowed(String),

    /// Filter source missing from the caller's allow-list
    #[error("the source {0} is not allowed for query")]
    SourceNotAllowed(String),

    /// Unique constraint violation
    #[error("Unique violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Not null constraint violation
    #[error("Not null violation: {0}")]
    NotNullViolation(String),
}

impl FilterError {
    /// Returns true for the `BETWEEN` validation failures.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            Self::FromValueMissing | Self::ToValueMissing | Self::RangeTypeMismatch { .. }
        )
    }

    /// Returns true for the allow-list validation failures.
    pub fn is_not_allowed(&self) -> bool {
        matches!(
            self,
            Self::FieldNotAllowed(_) | Self::SortFieldNotAllowed(_) | Self::SourceNotAllowed(_)
        )
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a foreign key violation error
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation(_))
    }

    /// Check if this is a not null violation error
    pub fn is_not_null_violation(&self) -> bool {
        matches!(self, Self::NotNullViolation(_))
    }
}
