//! Error types for the order engine.

use thiserror::Error;

use crate::model::ModelError;
use crate::order::OrderStatus;

/// Error returned by every order-engine operation.
///
/// All variants except `Store` are raised before anything is committed, so a
/// failed call never leaves partial stock, discount, or order writes behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Malformed or empty input.
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("order not found: {0}")]
    OrderNotFound(String),
    #[error("product is not active: {0}")]
    ProductInactive(String),
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },
    /// The status machine does not allow this move.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    /// The operation is not permitted in the order's current state.
    #[error("rejected: {0}")]
    Rejected(String),
    /// A concurrent transaction touched a record we read. Retried internally.
    #[error("concurrent modification: {0}")]
    Conflict(String),
    /// Conflict retries exhausted.
    #[error("order store busy after {attempts} attempts")]
    Busy { attempts: u32 },
    #[error(transparent)]
    Store(ModelError),
}

impl From<ModelError> for OrderError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::ConcurrencyConflict { .. } => OrderError::Conflict(err.to_string()),
            other => OrderError::Store(other),
        }
    }
}

impl OrderError {
    /// Map this error to an HTTP-style status code for the controller layer.
    pub fn status_code(&self) -> u16 {
        match self {
            OrderError::Validation(_) => 400,
            OrderError::ProductNotFound(_) => 404,
            OrderError::OrderNotFound(_) => 404,
            OrderError::ProductInactive(_) => 422,
            OrderError::InsufficientStock { .. } => 409,
            OrderError::InvalidTransition { .. } => 422,
            OrderError::Rejected(_) => 422,
            OrderError::Conflict(_) => 409,
            OrderError::Busy { .. } => 503,
            OrderError::Store(_) => 500,
        }
    }

    /// Whether the caller may retry the same request later.
    pub fn is_transient(&self) -> bool {
        matches!(self, OrderError::Conflict(_) | OrderError::Busy { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_conflicts_become_retryable() {
        let err: OrderError = ModelError::ConcurrencyConflict {
            collection: "products".into(),
            id: "p-1".into(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert!(matches!(err, OrderError::Conflict(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn storage_failures_are_not_retryable() {
        let err: OrderError = ModelError::Storage("disk on fire".into()).into();
        assert!(matches!(err, OrderError::Store(_)));
        assert!(!err.is_transient());
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn messages_name_the_offending_product() {
        let err = OrderError::InsufficientStock {
            product_id: "p-9".into(),
            requested: 3,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product p-9: requested 3, available 2"
        );
    }
}
