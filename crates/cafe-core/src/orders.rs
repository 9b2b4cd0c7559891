//! # Order Engine
//!
//! Order creation against the menu catalog, the order state machine, and
//! stock deduction on payment.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create_order ──► Pending ──mark_served──► Served                       │
//! │   (validate       │  │                       │  │                       │
//! │    stock, no      │  │                       │  │                       │
//! │    deduction)     │  └──────mark_paid────────┼──┴──► Completed          │
//! │                   │         │                │        (is_paid)         │
//! │                   │         ▼                │                          │
//! │                   │   catalog.set_stock(-qty)│                          │
//! │                   │   inventory.decrement()  │                          │
//! │                   │                          │                          │
//! │                   └──cancel_order──┬─────────┘                          │
//! │                                    ▼                                    │
//! │                                Cancelled (no stock touched)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - A failed `create_order` inserts nothing.
//! - Stock is deducted at most once per order: paying a paid or cancelled
//!   order is an error.
//! - `is_paid` implies `Completed`; `fix_inconsistent_orders` restores it
//!   for snapshots written by older builds or other devices.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::catalog::MenuCatalog;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::inventory::InventoryLedger;
use crate::money::Money;
use crate::reporting::local_day_bounds;
use crate::types::{Actor, Order, OrderLine, OrderStatus, PaymentMethod};
use crate::validation::{normalize_optional, validate_amount_received, validate_quantity};

/// Prefix for human-readable order numbers.
pub const ORDER_NUMBER_PREFIX: &str = "ORD";

// =============================================================================
// Inputs
// =============================================================================

/// One requested line: which menu item, how many, which variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub menu_item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub selected_flavor: Option<String>,
}

impl OrderLineRequest {
    pub fn new(menu_item_id: impl Into<String>, quantity: i64) -> Self {
        OrderLineRequest {
            menu_item_id: menu_item_id.into(),
            quantity,
            selected_size: None,
            selected_flavor: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = Some(size.into());
        self
    }

    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.selected_flavor = Some(flavor.into());
        self
    }
}

/// Everything the cashier submits to open an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<OrderLineRequest>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    pub actor: Actor,
    /// Cash handed over at the counter, if already known.
    #[serde(default)]
    pub amount_received: Option<Money>,
}

impl NewOrder {
    pub fn new(items: Vec<OrderLineRequest>, payment_method: PaymentMethod, actor: Actor) -> Self {
        NewOrder {
            items,
            customer_name: None,
            notes: None,
            payment_method,
            actor,
            amount_received: None,
        }
    }

    pub fn with_customer(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_amount_received(mut self, amount: Money) -> Self {
        self.amount_received = Some(amount);
        self
    }
}

/// Editable order fields. Status, payment and totals are changed only
/// through the lifecycle operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPatch {
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

// =============================================================================
// Payment Outcome
// =============================================================================

/// A menu item whose stock counter went below zero on payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OversoldItem {
    pub menu_item_id: String,
    pub name: String,
    pub stock_quantity: i64,
}

/// An ingredient whose ledger balance went below zero on payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IngredientShortfall {
    pub ingredient_id: String,
    pub name: String,
    pub quantity: f64,
}

/// Result of `mark_paid`: the settled order plus everything the stock
/// deduction could not do cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub order: Order,
    /// Menu item ids on the order that no longer exist in the catalog.
    pub skipped_items: Vec<String>,
    /// Ingredient ids referenced by a recipe but missing from the ledger.
    pub missing_ingredients: Vec<String>,
    pub oversold_items: Vec<OversoldItem>,
    pub ingredient_shortfalls: Vec<IngredientShortfall>,
}

impl PaymentOutcome {
    /// True when every line and ingredient was deducted without going negative.
    pub fn is_clean(&self) -> bool {
        self.skipped_items.is_empty()
            && self.missing_ingredients.is_empty()
            && self.oversold_items.is_empty()
            && self.ingredient_shortfalls.is_empty()
    }
}

// =============================================================================
// Order Book
// =============================================================================

/// The order store. Persisted as one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pending order priced from the catalog.
    ///
    /// Every line must reference an existing item, and the total quantity
    /// requested per item (summed across lines) must not exceed its stock.
    /// Stock is checked but not reserved.
    ///
    /// ## Example
    /// ```rust
    /// use cafe_core::catalog::{MenuCatalog, NewMenuItem};
    /// use cafe_core::orders::{NewOrder, OrderBook, OrderLineRequest};
    /// use cafe_core::{Actor, CoreError, Money, PaymentMethod};
    ///
    /// let mut catalog = MenuCatalog::new();
    /// let waffle = catalog
    ///     .add_item(NewMenuItem::new("Caramel Waffle", "Waffle", Money::from_cents(5000), 5))
    ///     .unwrap();
    /// let mut orders = OrderBook::new();
    ///
    /// let too_many = NewOrder::new(
    ///     vec![OrderLineRequest::new(&waffle.id, 10)],
    ///     PaymentMethod::Cash,
    ///     Actor::new("u1", "Ana"),
    /// );
    /// let err = orders.create_order(&catalog, too_many).unwrap_err();
    /// assert!(matches!(err, CoreError::InsufficientStock { available: 5, requested: 10, .. }));
    /// assert!(orders.is_empty());
    /// ```
    pub fn create_order(&mut self, catalog: &MenuCatalog, new: NewOrder) -> CoreResult<Order> {
        if new.items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        if let Some(amount) = new.amount_received {
            validate_amount_received(amount)?;
        }

        let mut requested: HashMap<&str, i64> = HashMap::new();
        let mut lines = Vec::with_capacity(new.items.len());

        for request in &new.items {
            validate_quantity(request.quantity)?;

            let item = catalog
                .get(&request.menu_item_id)
                .ok_or_else(|| CoreError::MenuItemNotFound(request.menu_item_id.clone()))?;

            let total_requested = requested.entry(item.id.as_str()).or_insert(0);
            *total_requested += request.quantity;
            if *total_requested > item.stock_quantity {
                return Err(CoreError::InsufficientStock {
                    item: item.name.clone(),
                    available: item.stock_quantity,
                    requested: *total_requested,
                });
            }

            let size = request.selected_size.as_deref();
            let flavor = request.selected_flavor.as_deref();
            let price = item.price_for(size, flavor)?;
            let subtotal = price
                .checked_multiply_quantity(request.quantity)
                .ok_or_else(|| too_large("order line"))?;

            lines.push(OrderLine {
                menu_item_id: item.id.clone(),
                menu_item_name: item.display_name(size, flavor),
                quantity: request.quantity,
                price,
                subtotal,
                selected_size: request.selected_size.clone(),
                selected_flavor: request.selected_flavor.clone(),
            });
        }

        let subtotal =
            Money::checked_sum(lines.iter().map(|l| l.subtotal)).ok_or_else(|| too_large("order total"))?;
        let total = subtotal;
        let now = Utc::now();

        let order = Order {
            id: crate::generate_id(),
            order_number: self.next_order_number(now),
            items: lines,
            subtotal,
            total,
            status: OrderStatus::Pending,
            is_served: false,
            is_paid: false,
            payment_method: new.payment_method,
            amount_received: new.amount_received,
            change: change_due(new.amount_received, total),
            customer_name: normalize_optional(new.customer_name),
            notes: normalize_optional(new.notes),
            created_by: new.actor.id,
            created_by_name: new.actor.name,
            created_at: now,
            served_at: None,
            completed_at: None,
        };

        self.orders.push(order.clone());
        Ok(order)
    }

    /// Marks the order as handed to the customer. Idempotent.
    ///
    /// A paid order keeps its `Completed` status; `served_at` is only set
    /// the first time.
    pub fn mark_served(&mut self, id: &str) -> CoreResult<Order> {
        let order = self.get_mut(id)?;
        if order.status == OrderStatus::Cancelled {
            return Err(invalid_status(order, "serve"));
        }

        order.is_served = true;
        if order.served_at.is_none() {
            order.served_at = Some(Utc::now());
        }
        if !order.is_paid && order.status != OrderStatus::Completed {
            order.status = OrderStatus::Served;
        }

        Ok(order.clone())
    }

    /// Confirms payment, deducts stock, and completes the order.
    ///
    /// ## Deduction
    /// ```text
    /// for each line:
    ///   menu item gone?  ──► skipped_items
    ///   catalog.set_stock(stock - qty)           (not re-validated)
    ///   for each recipe ingredient:
    ///     inventory.decrement(per_unit × qty)    (may go negative)
    /// ```
    ///
    /// When `amount_received` is `None` the amount captured at creation is
    /// used for change. Change is stored only when positive.
    pub fn mark_paid(
        &mut self,
        id: &str,
        amount_received: Option<Money>,
        catalog: &mut MenuCatalog,
        inventory: &mut InventoryLedger,
    ) -> CoreResult<PaymentOutcome> {
        if let Some(amount) = amount_received {
            validate_amount_received(amount)?;
        }

        let order = self.get_mut(id)?;
        if order.is_paid {
            return Err(CoreError::OrderAlreadyPaid(order.id.clone()));
        }
        if order.status == OrderStatus::Cancelled {
            return Err(invalid_status(order, "pay"));
        }

        let mut skipped_items = Vec::new();
        let mut missing_ingredients = Vec::new();
        let mut oversold_items = Vec::new();
        let mut ingredient_shortfalls = Vec::new();

        for line in &order.items {
            let Some(item) = catalog.get(&line.menu_item_id) else {
                skipped_items.push(line.menu_item_id.clone());
                continue;
            };
            let recipe = item.ingredients.clone();
            let remaining = item.stock_quantity - line.quantity;

            let item = catalog.set_stock(&line.menu_item_id, remaining)?;
            if remaining < 0 {
                oversold_items.push(OversoldItem {
                    menu_item_id: item.id.clone(),
                    name: item.name.clone(),
                    stock_quantity: remaining,
                });
            }

            for usage in recipe {
                let consumed = usage.quantity_used * line.quantity as f64;
                match inventory.decrement(&usage.ingredient_id, consumed) {
                    Ok(ingredient) if ingredient.quantity < 0.0 => {
                        ingredient_shortfalls.push(IngredientShortfall {
                            ingredient_id: ingredient.id,
                            name: ingredient.name,
                            quantity: ingredient.quantity,
                        });
                    }
                    Ok(_) => {}
                    Err(_) => missing_ingredients.push(usage.ingredient_id.clone()),
                }
            }
        }

        let amount = amount_received.or(order.amount_received);
        order.amount_received = amount;
        order.change = change_due(amount, order.total);
        order.is_paid = true;
        order.status = OrderStatus::Completed;
        order.completed_at = Some(Utc::now());

        Ok(PaymentOutcome {
            order: order.clone(),
            skipped_items,
            missing_ingredients,
            oversold_items,
            ingredient_shortfalls,
        })
    }

    /// Cancels an unpaid order. No stock is touched. Cancelling twice is a no-op.
    pub fn cancel_order(&mut self, id: &str) -> CoreResult<Order> {
        let order = self.get_mut(id)?;
        if order.is_paid || order.status == OrderStatus::Completed {
            return Err(invalid_status(order, "cancel"));
        }

        order.status = OrderStatus::Cancelled;
        Ok(order.clone())
    }

    /// Removes the order record. Deducted stock is not restored.
    pub fn delete_order(&mut self, id: &str) -> CoreResult<Order> {
        let index = self
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;
        Ok(self.orders.remove(index))
    }

    /// Edits customer name, notes or payment method.
    pub fn update_order(&mut self, id: &str, patch: OrderPatch) -> CoreResult<Order> {
        let order = self.get_mut(id)?;
        if patch.customer_name.is_some() {
            order.customer_name = normalize_optional(patch.customer_name);
        }
        if patch.notes.is_some() {
            order.notes = normalize_optional(patch.notes);
        }
        if let Some(method) = patch.payment_method {
            order.payment_method = method;
        }
        Ok(order.clone())
    }

    /// Completes every paid order whose status says otherwise.
    ///
    /// `completed_at` falls back to `created_at` when missing. Returns the
    /// number of orders fixed.
    pub fn fix_inconsistent_orders(&mut self) -> usize {
        let mut fixed = 0;
        for order in self.orders.iter_mut().filter(|o| o.is_inconsistent()) {
            order.status = OrderStatus::Completed;
            if order.completed_at.is_none() {
                order.completed_at = Some(order.created_at);
            }
            fixed += 1;
        }
        fixed
    }

    /// Replaces the whole collection with an authoritative snapshot
    /// (e.g. received from another device).
    pub fn replace_all(&mut self, orders: Vec<Order>) {
        self.orders = orders;
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    fn get_mut(&mut self, id: &str) -> CoreResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders created within `[start, end]`, both inclusive.
    pub fn orders_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| o.created_at >= start && o.created_at <= end)
            .collect()
    }

    /// Orders created on the given calendar day in `tz`.
    pub fn orders_created_on<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<&Order> {
        let (start, end) = local_day_bounds(day, tz);
        self.orders
            .iter()
            .filter(|o| o.created_at >= start && o.created_at < end)
            .collect()
    }

    pub fn orders_by_creator(&self, user_id: &str) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.created_by == user_id).collect()
    }

    fn next_order_number(&self, now: DateTime<Utc>) -> String {
        crate::document_number(ORDER_NUMBER_PREFIX, now, |n| {
            self.orders.iter().any(|o| o.order_number == n)
        })
    }
}

fn too_large(field: &str) -> CoreError {
    ValidationError::TooLarge {
        field: field.to_string(),
    }
    .into()
}

fn change_due(amount_received: Option<Money>, total: Money) -> Option<Money> {
    amount_received
        .map(|amount| amount - total)
        .filter(Money::is_positive)
}

fn invalid_status(order: &Order, operation: &str) -> CoreError {
    CoreError::InvalidOrderStatus {
        order_id: order.id.clone(),
        current_status: order.status.to_string(),
        operation: operation.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
