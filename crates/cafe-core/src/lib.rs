//! # cafe-core: Pure Business Logic for the Café POS
//!
//! This crate holds every business rule of the café back office as plain
//! values and pure functions. Nothing in here touches a database, a clock
//! source other than `Utc::now()`, or a logger.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cafe POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile UI (screens)                          │   │
//! │  │     POS ──► Orders ──► Payment ──► Dashboard / Sales            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 apps/cafe-pos (commands, state)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cafe-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌───────────┐ ┌────────┐ ┌───────────┐ ┌────────┐ │   │
//! │  │  │ catalog │ │ inventory │ │ orders │ │ purchases │ │ report │ │   │
//! │  │  └─────────┘ └───────────┘ └────────┘ └───────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                cafe-db (store snapshots in SQLite)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic
//! - [`types`] - Domain types (MenuItem, InventoryItem, Order, Purchase)
//! - [`error`] - Domain error types
//! - [`validation`] - Field validation
//! - [`catalog`] - Menu catalog and category set
//! - [`inventory`] - Ingredient ledger
//! - [`orders`] - Order book and the order state machine
//! - [`purchases`] - Supplier purchase ledger
//! - [`reporting`] - Dashboard and sales report aggregation
//!
//! ## Example Usage
//!
//! ```rust
//! use cafe_core::catalog::{MenuCatalog, NewMenuItem};
//! use cafe_core::inventory::InventoryLedger;
//! use cafe_core::orders::{NewOrder, OrderBook, OrderLineRequest};
//! use cafe_core::{Actor, Money, PaymentMethod};
//!
//! let mut catalog = MenuCatalog::new();
//! let mut inventory = InventoryLedger::new();
//! let mut orders = OrderBook::new();
//!
//! let latte = catalog
//!     .add_item(NewMenuItem::new("Vanilla Latte", "Coffee", Money::from_cents(12000), 5))
//!     .unwrap();
//!
//! let order = orders
//!     .create_order(
//!         &catalog,
//!         NewOrder::new(
//!             vec![OrderLineRequest::new(&latte.id, 2)],
//!             PaymentMethod::Cash,
//!             Actor::new("staff-1", "Ana"),
//!         ),
//!     )
//!     .unwrap();
//! assert_eq!(order.total, Money::from_cents(24000));
//!
//! // Stock only moves when the order is paid.
//! orders
//!     .mark_paid(&order.id, Some(Money::from_cents(25000)), &mut catalog, &mut inventory)
//!     .unwrap();
//! assert_eq!(catalog.get(&latte.id).unwrap().stock_quantity, 3);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod inventory;
pub mod money;
pub mod orders;
pub mod purchases;
pub mod reporting;
pub mod types;
pub mod validation;

use chrono::{DateTime, Utc};

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single menu item on one order line.
///
/// Guards against typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Number of entries shown in the dashboard's top-selling list.
pub const TOP_SELLING_LIMIT: usize = 5;

/// Number of entries shown in the dashboard's recent-orders list.
pub const RECENT_ORDERS_LIMIT: usize = 10;

/// Trailing window (days) for the dashboard's top-selling list.
pub const TOP_SELLING_WINDOW_DAYS: i64 = 30;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Builds a human-readable document number such as `ORD-1732262400123`.
///
/// Two documents created in the same millisecond get `-2`, `-3`, ...
/// appended so numbers stay unique within a store.
pub fn document_number(prefix: &str, at: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("{}-{}", prefix, at.timestamp_millis());
    if !taken(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_document_number_is_unique() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(document_number("ORD", at, |_| false), "ORD-1700000000123");

        let taken = ["PUR-1700000000123", "PUR-1700000000123-2"];
        assert_eq!(
            document_number("PUR", at, |n| taken.contains(&n)),
            "PUR-1700000000123-3"
        );
    }

    #[test]
    fn test_generate_id_is_uuid() {
        let id = generate_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_ne!(id, generate_id());
    }
}
