//! # Domain Types
//!
//! Core domain types used throughout the café POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │      Order      │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  order_number   │   │  purchase_number│       │
//! │  │  price          │   │  items[]        │   │  supplier_name  │       │
//! │  │  stock_quantity │   │  status         │   │  items[]        │       │
//! │  │  sizes/flavors  │   │  is_paid        │   │  total_cost     │       │
//! │  │  ingredients[] ─┼─┐ │  total          │   └────────┬────────┘       │
//! │  └─────────────────┘ │ └─────────────────┘            │                │
//! │                      │                                │ increments     │
//! │                      │ consumes  ┌─────────────────┐  │                │
//! │                      └──────────►│  InventoryItem  │◄─┘                │
//! │                                  │  quantity (f64) │                   │
//! │                                  │  min_quantity   │                   │
//! │                                  └─────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Order lines and purchase lines copy the name and price of what they
//! reference. Deleting or repricing a menu item never rewrites history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Actor
// =============================================================================

/// The signed-in user recorded as creator of orders and purchases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Actor {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// Availability of a menu item, derived from its stock counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MenuStatus {
    Available,
    OutOfStock,
}

impl MenuStatus {
    /// `Available` iff stock is above zero.
    #[inline]
    pub const fn from_stock(stock: i64) -> Self {
        if stock > 0 {
            MenuStatus::Available
        } else {
            MenuStatus::OutOfStock
        }
    }
}

/// A named price variant (a cup size such as "16oz", or a flavor such as
/// "Honey Butter").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantOption {
    pub name: String,
    pub price: Money,
}

impl VariantOption {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        VariantOption {
            name: name.into(),
            price,
        }
    }
}

/// How much of one ingredient a single unit of a menu item consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IngredientUsage {
    pub ingredient_id: String,
    /// In the ingredient's own unit (kg, liters, pieces).
    pub quantity_used: f64,
}

impl IngredientUsage {
    pub fn new(ingredient_id: impl Into<String>, quantity_used: f64) -> Self {
        IngredientUsage {
            ingredient_id: ingredient_id.into(),
            quantity_used,
        }
    }
}

/// A sellable menu entry with its own stock counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the POS grid and on orders.
    pub name: String,

    /// Category name; one of the catalog's categories.
    pub category: String,

    /// Base price when no size or flavor is chosen.
    pub price: Money,

    /// Units that can still be sold. Unguarded writes may leave it negative.
    pub stock_quantity: i64,

    pub description: Option<String>,

    /// Size variants (e.g. 16oz, 22oz).
    #[serde(default)]
    pub sizes: Vec<VariantOption>,

    /// Flavor variants (e.g. Cheese, Honey Butter).
    #[serde(default)]
    pub flavors: Vec<VariantOption>,

    /// Ingredients consumed per unit sold.
    #[serde(default)]
    pub ingredients: Vec<IngredientUsage>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Availability derived from the current stock.
    #[inline]
    pub fn status(&self) -> MenuStatus {
        MenuStatus::from_stock(self.stock_quantity)
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.status() == MenuStatus::Available
    }

    /// Resolves the unit price for a size/flavor selection.
    ///
    /// ## Precedence
    /// ```text
    /// flavor chosen? ──yes──► flavor.price
    ///      │no
    ///      ▼
    /// size chosen?   ──yes──► size.price
    ///      │no
    ///      ▼
    /// base price
    /// ```
    ///
    /// Naming a variant the item does not offer is an error.
    pub fn price_for(&self, size: Option<&str>, flavor: Option<&str>) -> CoreResult<Money> {
        let size_price = match size {
            Some(name) => Some(self.find_variant(&self.sizes, "size", name)?.price),
            None => None,
        };
        let flavor_price = match flavor {
            Some(name) => Some(self.find_variant(&self.flavors, "flavor", name)?.price),
            None => None,
        };

        Ok(flavor_price.or(size_price).unwrap_or(self.price))
    }

    /// Display name with the chosen variants: `Name (Flavor) - Size`.
    pub fn display_name(&self, size: Option<&str>, flavor: Option<&str>) -> String {
        let mut name = self.name.clone();
        if let Some(flavor) = flavor {
            name.push_str(&format!(" ({})", flavor));
        }
        if let Some(size) = size {
            name.push_str(&format!(" - {}", size));
        }
        name
    }

    fn find_variant<'a>(
        &self,
        options: &'a [VariantOption],
        kind: &str,
        name: &str,
    ) -> CoreResult<&'a VariantOption> {
        options
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| CoreError::UnknownVariant {
                item: self.name.clone(),
                kind: kind.to_string(),
                name: name.to_string(),
            })
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A raw stocked ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: String,
    /// Unit of measure: kg, liters, pieces, ...
    pub unit: String,
    pub quantity: f64,
    /// Low-stock threshold.
    pub min_quantity: f64,
    pub cost_per_unit: Money,
    pub supplier: Option<String>,
    #[ts(as = "Option<String>")]
    pub last_restocked: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// At or below the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ```text
///   Pending ──serve──► Served ──pay──► Completed
///      │                 │
///      └──pay────────────┼───────────► Completed
///      │                 │
///      └──cancel──┬──────┘
///                 ▼
///             Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Served => "served",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and Cancelled never change again.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays. GCash and Maya are mobile wallets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Card,
    GCash,
    Maya,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::GCash => "GCash",
            PaymentMethod::Maya => "Maya",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line item on an order.
/// Uses snapshot pattern to freeze menu data at time of ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub menu_item_id: String,
    /// Display name at time of ordering, including variants (frozen).
    pub menu_item_name: String,
    pub quantity: i64,
    /// Unit price at time of ordering (frozen).
    pub price: Money,
    /// price × quantity.
    pub subtotal: Money,
    pub selected_size: Option<String>,
    pub selected_flavor: Option<String>,
}

/// A customer order. Provisional until payment is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Human-readable number shown on the kitchen screen (`ORD-...`).
    pub order_number: String,
    pub items: Vec<OrderLine>,
    pub subtotal: Money,
    /// Equal to subtotal; no tax is applied.
    pub total: Money,
    pub status: OrderStatus,
    pub is_served: bool,
    pub is_paid: bool,
    pub payment_method: PaymentMethod,
    pub amount_received: Option<Money>,
    /// Only stored when positive.
    pub change: Option<Money>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_by_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub served_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    /// Paid and completed: the only orders that count as revenue.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.is_paid && self.status == OrderStatus::Completed
    }

    /// Paid but not completed; the repair pass fixes these.
    #[inline]
    pub fn is_inconsistent(&self) -> bool {
        self.is_paid && self.status != OrderStatus::Completed
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A line on a supplier purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub inventory_item_id: String,
    /// Ingredient name at time of purchase (frozen).
    pub item_name: String,
    pub quantity: f64,
    pub cost_per_unit: Money,
    /// cost_per_unit × quantity, rounded to the centavo.
    pub total: Money,
}

/// A supplier restocking event. Immutable except for deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    /// Human-readable number (`PUR-...`).
    pub purchase_number: String,
    pub supplier_name: String,
    pub items: Vec<PurchaseLine>,
    pub total_cost: Money,
    #[ts(as = "String")]
    pub purchase_date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_by_name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
