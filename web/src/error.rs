//! Error types for web handlers.
//!
//! [`AppError`] bridges domain errors and HTTP responses, implementing
//! Axum's `IntoResponse`. Handlers return `Result<_, AppError>` and let
//! `?` convert [`storefront_core::Error`] via the `From` impl, which
//! carries the status mapping for the whole API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use storefront_core::Error as DomainError;

/// Application error type for web handlers.
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code.
    status: StatusCode,
    /// Error message (user-facing).
    message: String,
    /// Error code (for client error handling).
    code: &'static str,
    /// Internal detail (for logging, not exposed to the client).
    detail: Option<String>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: &'static str) -> Self {
        Self {
            status,
            message,
            code,
            detail: None,
        }
    }

    /// Attach an internal detail that is logged but never sent.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into(), "BAD_REQUEST")
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND",
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
            }
            DomainError::InsufficientStock { .. } => {
                Self::new(StatusCode::BAD_REQUEST, message, "INSUFFICIENT_STOCK")
            }
            DomainError::InvalidTransition { .. } => {
                Self::new(StatusCode::BAD_REQUEST, message, "INVALID_TRANSITION")
            }
            DomainError::Validation(_) => {
                Self::new(StatusCode::BAD_REQUEST, message, "VALIDATION_ERROR")
            }
            DomainError::CartNotModifiable { .. } => {
                Self::new(StatusCode::FORBIDDEN, message, "CART_NOT_MODIFIABLE")
            }
            DomainError::OrderNotModifiable { .. } => {
                Self::new(StatusCode::FORBIDDEN, message, "ORDER_NOT_MODIFIABLE")
            }
            DomainError::CannotDeleteApproved { .. } => {
                Self::new(StatusCode::FORBIDDEN, message, "PAYMENT_APPROVED")
            }
            DomainError::DuplicatePayment { .. } => {
                Self::new(StatusCode::CONFLICT, message, "DUPLICATE_PAYMENT")
            }
            DomainError::Store(_) => {
                // The storage detail is logged, never sent to the client.
                Self::internal("An internal storage error occurred").with_detail(message)
            }
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = %self.code,
                message = %self.message,
                detail = self.detail.as_deref().unwrap_or(""),
                "Internal server error"
            );
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{CartStatus, OrderId, PaymentId, ProductId};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let id = OrderId::new();
        let err = AppError::from(DomainError::not_found("order", id));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_guard_violations_map_to_403() {
        let err = AppError::from(DomainError::CartNotModifiable {
            status: CartStatus::Finalized,
        });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);

        let err = AppError::from(DomainError::CannotDeleteApproved {
            payment_id: PaymentId::new(),
        });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_duplicate_payment_maps_to_409() {
        let err = AppError::from(DomainError::DuplicatePayment {
            order_id: OrderId::new(),
        });
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_insufficient_stock_maps_to_400() {
        let err = AppError::from(DomainError::InsufficientStock {
            product_id: ProductId::new(),
            requested: 3,
            available: 1,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_store_errors_do_not_leak_detail() {
        let err = AppError::from(DomainError::store("connection refused"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("connection refused"));
        assert!(err.detail.as_deref().unwrap_or("").contains("connection"));
    }
}
