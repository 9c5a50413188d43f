use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// HTTP-facing error. Every response body carries a stable machine-readable
/// `code` alongside the human-readable message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
    },

    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: String,
    },

    #[error("Not found")]
    NotFound,

    /// The external system has not finished yet; the request was accepted
    /// and will settle asynchronously.
    #[error("Processing: {0}")]
    Processing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound => AppError::NotFound,
            DomainError::EmptyCart => AppError::Validation {
                code: "EMPTY_CART",
                message: e.to_string(),
            },
            DomainError::InvalidInput(_) => AppError::Validation {
                code: "INVALID_INPUT",
                message: e.to_string(),
            },
            DomainError::OutOfStock { .. } => AppError::Conflict {
                code: "OUT_OF_STOCK",
                message: e.to_string(),
            },
            DomainError::InsufficientStock { .. } => AppError::Conflict {
                code: "INSUFFICIENT_STOCK",
                message: e.to_string(),
            },
            DomainError::ProductInactive { .. } => AppError::Conflict {
                code: "PRODUCT_INACTIVE",
                message: e.to_string(),
            },
            DomainError::DuplicateReference(_) => AppError::Conflict {
                code: "DUPLICATE_REFERENCE",
                message: e.to_string(),
            },
            DomainError::Processing(msg) | DomainError::Transient(msg) => {
                AppError::Processing(msg)
            }
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Validation { code, message } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": message,
                    "code": code
                }))
            }
            AppError::Conflict { code, message } => {
                HttpResponse::Conflict().json(serde_json::json!({
                    "error": message,
                    "code": code
                }))
            }
            AppError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": self.to_string(),
                "code": "NOT_FOUND"
            })),
            AppError::Processing(detail) => HttpResponse::Accepted().json(serde_json::json!({
                "status": "processing",
                "detail": detail,
                "code": "PROCESSING"
            })),
            AppError::Internal(_) => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error",
                "code": "INTERNAL"
            })),
        }
    }
}
