use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Requested quantity for variant {variant_id} exceeds available stock")]
    OutOfStock { variant_id: Uuid },

    #[error("Insufficient stock for variant {variant_id}")]
    InsufficientStock { variant_id: Uuid },

    #[error("Product {product_id} is no longer available")]
    ProductInactive { product_id: Uuid },

    #[error("An order already exists for reference {0}")]
    DuplicateReference(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Bounded retries exhausted against an external system that is expected
    /// to complete asynchronously. Surfaces as "processing", not a failure.
    #[error("Still processing: {0}")]
    Processing(String),

    /// Upstream 5xx/timeout. Safe to retry; never a business outcome.
    #[error("Upstream temporarily unavailable: {0}")]
    Transient(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// True for errors the caller can retry after the external system settles.
    pub fn is_transient(&self) -> bool {
        matches!(self, DomainError::Transient(_) | DomainError::Processing(_))
    }
}
