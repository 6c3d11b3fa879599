//! Error types for criteria construction and execution.
//!

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    /// A predicate or ordering referenced an association that was never joined or fetched.
    #[error("No JOIN or FETCH made between [{root}] and [{joined}]")]
    UnresolvedJoin {
        root: &'static str,
        joined: &'static str,
    },
    #[error(
        "Predicates exist for this criteria builder. Create a new builder if this is a new query"
    )]
    DuplicatePredicate,
    #[error("At least one Criteria object should be specified")]
    EmptyComposition,
    #[error("No updates have been set")]
    NoUpdatesSpecified,
    /// Every operand of a null-skipping AND/OR combination was absent.
    #[error("Predicate combination has no operands")]
    EmptyPredicate,
    #[error("Unknown field '{field}' on [{entity}]")]
    UnknownField {
        entity: &'static str,
        field: String,
    },
    #[error("Cannot assign {value} to field '{field}' on [{entity}]")]
    InvalidAssignment {
        entity: &'static str,
        field: String,
        value: String,
    },
    #[error("Expected at most one [{entity}] row but {count} matched")]
    NonUniqueResult { entity: &'static str, count: usize },
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl CriteriaError {
    pub fn unknown_field(entity: &'static str, field: impl Into<String>) -> Self {
        CriteriaError::UnknownField {
            entity,
            field: field.into(),
        }
    }

    pub fn invalid_assignment(
        entity: &'static str,
        field: impl Into<String>,
        value: &crate::model::Value,
    ) -> Self {
        CriteriaError::InvalidAssignment {
            entity,
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// True for errors raised while a criteria was being described, as opposed to
    /// errors raised by a repository while executing one.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            CriteriaError::UnresolvedJoin { .. }
                | CriteriaError::DuplicatePredicate
                | CriteriaError::EmptyComposition
                | CriteriaError::NoUpdatesSpecified
                | CriteriaError::EmptyPredicate
        )
    }
}

impl From<config::ConfigError> for CriteriaError {
    fn from(error: config::ConfigError) -> Self {
        CriteriaError::ConfigurationError(error.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for CriteriaError {
    fn from(err: sqlx::Error) -> Self {
        CriteriaError::DatabaseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CriteriaError>;
