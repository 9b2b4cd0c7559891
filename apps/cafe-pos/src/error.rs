//! # API Error Type
//!
//! Unified error type for app commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Cafe POS                               │
//! │                                                                         │
//! │  UI                          Rust Backend                               │
//! │  ──                          ────────────                               │
//! │                                                                         │
//! │  { "command": "create_order", "args": {...} }                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Business rule? ─── CoreError::InsufficientStock ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Database Error? ─── DbError::QueryFailed ─────── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "ok": false, "error": { "code": "INSUFFICIENT_STOCK", ... } }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cafe_core::CoreError;
use cafe_db::DbError;
use serde::Serialize;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Vanilla Latte: available 5, requested 10"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business rule refused the operation
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed
    CartError,

    /// Not enough menu stock
    InsufficientStock,

    /// Payment could not be recorded
    PaymentError,

    /// No command with that name
    UnknownCommand,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Snapshot serialization failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Stored data could not be read")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let code = match err {
            CoreError::MenuItemNotFound(_)
            | CoreError::InventoryItemNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::PurchaseNotFound(_) => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::OrderAlreadyPaid(_) => ErrorCode::PaymentError,
            CoreError::InvalidOrderStatus { .. } | CoreError::CategoryInUse { .. } => {
                ErrorCode::BusinessLogic
            }
            CoreError::EmptyOrder
            | CoreError::EmptyPurchase
            | CoreError::UnknownVariant { .. }
            | CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, message)
    }
}

/// Malformed command arguments.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::validation(format!("Invalid arguments: {}", err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_core::ValidationError;

    #[test]
    fn test_core_error_codes() {
        let err = ApiError::from(CoreError::InsufficientStock {
            item: "Vanilla Latte".into(),
            available: 5,
            requested: 10,
        });
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("available 5"));

        assert_eq!(
            ApiError::from(CoreError::OrderNotFound("o-1".into())).code,
            ErrorCode::NotFound
        );
        assert_eq!(
            ApiError::from(CoreError::OrderAlreadyPaid("o-1".into())).code,
            ErrorCode::PaymentError
        );
        assert_eq!(
            ApiError::from(CoreError::Validation(ValidationError::Required { field: "name".into() })).code,
            ErrorCode::ValidationError
        );
    }

    #[test]
    fn test_db_errors_hide_details() {
        let err = ApiError::from(DbError::QueryFailed("syntax error near SELEC".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::cart("Cart is empty")).unwrap();
        assert_eq!(json["code"], "CART_ERROR");
        assert_eq!(json["message"], "Cart is empty");
    }
}
