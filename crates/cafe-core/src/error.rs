//! # Error Types
//!
//! Domain-specific error types for cafe-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cafe-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cafe-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  App API errors (apps/cafe-pos)                                        │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (name, ID, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// A failed operation leaves every store untouched: all checks run before
/// the first mutation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Menu item cannot be found in the catalog.
    ///
    /// ## When This Occurs
    /// - The item was deleted after the cashier opened the POS screen
    /// - An order line references an id from another device
    #[error("Menu item not found: {0}")]
    MenuItemNotFound(String),

    /// Inventory (ingredient) item cannot be found.
    #[error("Inventory item not found: {0}")]
    InventoryItemNotFound(String),

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Purchase cannot be found.
    #[error("Purchase not found: {0}")]
    PurchaseNotFound(String),

    /// Not enough catalog stock to create the order.
    ///
    /// ## User Workflow
    /// ```text
    /// Create order (Vanilla Latte × 10)
    ///      │
    ///      ▼
    /// Check stock: available=5
    ///      │
    ///      ▼
    /// InsufficientStock { item: "Vanilla Latte", available: 5, requested: 10 }
    ///      │
    ///      ▼
    /// UI shows: "Only 5 Vanilla Latte in stock"
    /// ```
    #[error("Insufficient stock for {item}: available {available}, requested {requested}")]
    InsufficientStock {
        item: String,
        available: i64,
        requested: i64,
    },

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Cancelling a paid order
    /// - Serving or paying a cancelled order
    #[error("Order {order_id} is {current_status}, cannot {operation}")]
    InvalidOrderStatus {
        order_id: String,
        current_status: String,
        operation: String,
    },

    /// Order has already been paid; stock was deducted once already.
    #[error("Order {0} is already paid")]
    OrderAlreadyPaid(String),

    /// Order has no line items.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Purchase has no line items.
    #[error("Purchase must contain at least one item")]
    EmptyPurchase,

    /// Requested size or flavor does not exist on the menu item.
    #[error("{item} has no {kind} named '{name}'")]
    UnknownVariant {
        item: String,
        kind: String,
        name: String,
    },

    /// Category still has menu items and cannot be removed.
    #[error("Category '{category}' still has {count} menu item(s)")]
    CategoryInUse { category: String, count: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// A computed total no longer fits in the money or quantity range.
    #[error("{field} is too large")]
    TooLarge { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., non-finite number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate category).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            item: "Vanilla Latte".to_string(),
            available: 5,
            requested: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Vanilla Latte: available 5, requested 10"
        );

        let err = CoreError::InvalidOrderStatus {
            order_id: "o-1".to_string(),
            current_status: "completed".to_string(),
            operation: "cancel".to_string(),
        };
        assert_eq!(err.to_string(), "Order o-1 is completed, cannot cancel");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Duplicate {
            field: "category".to_string(),
            value: "Coffee".to_string(),
        };
        assert_eq!(err.to_string(), "category 'Coffee' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "supplier".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
