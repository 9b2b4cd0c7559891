//! # Validation Module
//!
//! Input validation utilities for the café POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms                                                      │
//! │  ├── Basic format checks (empty, numeric keypad)                       │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: App command (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules, called by the stores                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Store operations                                             │
//! │  └── Business rules (existence, stock, order status)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cafe_core::validation::{validate_name, validate_quantity};
//!
//! validate_name("name", "Vanilla Latte").unwrap();
//! validate_quantity(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted name for menu items, ingredients, categories and suppliers.
pub const MAX_NAME_LENGTH: usize = 200;

/// Highest accepted price, cost or cash amount: ₱1,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

/// Highest accepted menu stock counter.
pub const MAX_STOCK: i64 = 1_000_000;

/// Highest accepted ingredient amount (on hand, purchased, per-unit usage).
pub const MAX_AMOUNT: f64 = 1_000_000_000.0;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `MAX_NAME_LENGTH` characters
///
/// ## Example
/// ```rust
/// use cafe_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Iced Chocolate ").unwrap(), "Iced Chocolate");
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(value.to_string())
}

/// Trims optional free text (customer name, notes) and drops it when blank.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ```text
/// Cashier enters quantity: 2
///      │
///      ▼
/// validate_quantity(2) ← THIS FUNCTION
///      │
///      ├── qty <= 0?   → "quantity must be positive"
///      ├── qty > 999?  → "quantity must be between 1 and 999"
///      └── OK → stock check against the catalog
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or cost. Zero is allowed (complimentary items).
///
/// Capped at `MAX_PRICE_CENTS` so order and purchase totals stay far from
/// the `i64` limit.
///
/// ## Example
/// ```rust
/// use cafe_core::money::Money;
/// use cafe_core::validation::validate_price;
///
/// assert!(validate_price("price", Money::from_cents(12000)).is_ok());
/// assert!(validate_price("price", Money::zero()).is_ok());
/// assert!(validate_price("price", Money::from_cents(-100)).is_err());
/// assert!(validate_price("price", Money::from_cents(i64::MAX / 2)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a menu stock counter entered by staff.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock quantity".to_string(),
        });
    }

    if stock > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: "stock quantity".to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }

    Ok(())
}

/// Validates a fractional ingredient amount (on hand, threshold).
///
/// ## Rules
/// - Must be a finite number
/// - Must not be negative
/// - At most `MAX_AMOUNT`
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if amount < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT as i64,
        });
    }

    Ok(())
}

/// Validates a fractional amount that must be strictly positive
/// (purchased quantity, per-unit ingredient usage).
pub fn validate_positive_amount(field: &str, amount: f64) -> ValidationResult<()> {
    validate_amount(field, amount)?;

    if amount == 0.0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates cash handed over by the customer.
pub fn validate_amount_received(amount: Money) -> ValidationResult<()> {
    validate_price("amount received", amount)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("name", "Vanilla Latte").unwrap(), "Vanilla Latte");
        assert_eq!(validate_name("name", "  Soda  ").unwrap(), "Soda");
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", "   ").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  Juan ".into())), Some("Juan".to_string()));
        assert_eq!(normalize_optional(Some("   ".into())), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(50).is_ok());
        assert!(validate_stock(-1).is_err());
        assert!(validate_stock(MAX_STOCK).is_ok());
        assert!(validate_stock(MAX_STOCK + 1).is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_amount("quantity", 0.0).is_ok());
        assert!(validate_amount("quantity", 2.5).is_ok());
        assert!(validate_amount("quantity", -0.1).is_err());
        assert!(validate_amount("quantity", f64::NAN).is_err());
        assert!(validate_amount("quantity", f64::INFINITY).is_err());
        assert!(validate_amount("quantity", MAX_AMOUNT).is_ok());
        assert!(validate_amount("quantity", 1e308).is_err());

        assert!(validate_positive_amount("quantity", 0.02).is_ok());
        assert!(validate_positive_amount("quantity", 0.0).is_err());
    }

    #[test]
    fn test_validate_amount_received() {
        assert!(validate_amount_received(Money::from_cents(15000)).is_ok());
        assert!(validate_amount_received(Money::zero()).is_ok());
        assert!(validate_amount_received(Money::from_cents(-1)).is_err());
        assert!(validate_amount_received(Money::from_cents(MAX_PRICE_CENTS + 1)).is_err());
    }
}
