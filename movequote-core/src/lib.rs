pub mod repository;

pub use repository::{EstimateRepository, OrderTransaction};

use movequote_shared::OrderValidationError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Lookup found no matching row: {0}")]
    NotFound(String),
    #[error("Persistence failed: {0}")]
    Persistence(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl From<OrderValidationError> for CoreError {
    fn from(err: OrderValidationError) -> Self {
        CoreError::ValidationError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Yen per kilometre when nothing else is configured
pub const DEFAULT_PRICE_PER_KM: i64 = 100;
