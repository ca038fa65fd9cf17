use thiserror::Error;

/// Errors produced by the domain and its repositories
///
/// Business-rule failures (`NotFound`, `RosterSizeExceeded`, `BudgetExceeded`,
/// `Conflict`, `Validation`) are caller-fixable and never retried.
/// `StoreUnavailable` is surfaced as-is; retry policy belongs to the store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("maximum limit of {max} players per team exceeded by {excess}")]
    RosterSizeExceeded { max: usize, excess: usize },

    #[error("total player value {total} exceeds the budget of {budget}")]
    BudgetExceeded { total: i64, budget: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl DomainError {
    /// Shorthand for a missing entity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for malformed input
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
