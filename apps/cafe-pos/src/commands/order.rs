//! # Order Commands
//!
//! The order lifecycle as seen from the counter and the kitchen.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Lifecycle                                      │
//! │                                                                         │
//! │  create_order ──► Pending ──mark_order_served──► Served                 │
//! │                      │                             │                    │
//! │                      └──────mark_order_paid────────┴──► Completed       │
//! │                      │                                  (stock moves)   │
//! │                      └──cancel_order──► Cancelled                       │
//! │                                                                         │
//! │  Stores touched:                                                        │
//! │    create / serve / cancel / update / delete ──► orders                 │
//! │    pay ──────────────────────────────────────► menu, inventory, orders  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Creating an order only checks stock; nothing is reserved until payment.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{ConfigState, StoreKind, StoreState};
use cafe_core::orders::{NewOrder, OrderPatch, PaymentOutcome};
use cafe_core::{Money, Order, OrderStatus};

/// Opens a new order.
///
/// ## Returns
/// The pending order, or `INSUFFICIENT_STOCK` if any item (summed over
/// its lines) exceeds the menu stock counter
pub fn create_order(stores: &StoreState, order: NewOrder) -> Result<Order, ApiError> {
    debug!(lines = order.items.len(), created_by = %order.actor.id, "create_order command");

    let order = stores.mutate(&[StoreKind::Orders], |s| s.orders.create_order(&s.catalog, order))?;

    info!(
        order_id = %order.id,
        order_number = %order.order_number,
        total = %order.total,
        items = order.item_count(),
        "Order created"
    );
    Ok(order)
}

pub fn mark_order_served(stores: &StoreState, id: String) -> Result<Order, ApiError> {
    debug!(id = %id, "mark_order_served command");

    let order = stores.mutate(&[StoreKind::Orders], |s| s.orders.mark_served(&id))?;

    info!(order_number = %order.order_number, status = %order.status, "Order served");
    Ok(order)
}

/// Confirms payment and deducts menu stock and recipe ingredients.
///
/// Stock is not re-checked here. Anything that went negative or could not
/// be found is reported in the outcome and logged.
pub fn mark_order_paid(
    stores: &StoreState,
    id: String,
    amount_received: Option<Money>,
) -> Result<PaymentOutcome, ApiError> {
    debug!(id = %id, amount_received = ?amount_received, "mark_order_paid command");

    let outcome = stores.mutate(
        &[StoreKind::Menu, StoreKind::Inventory, StoreKind::Orders],
        |s| s.orders.mark_paid(&id, amount_received, &mut s.catalog, &mut s.inventory),
    )?;

    log_payment_outcome(&outcome);
    Ok(outcome)
}

fn log_payment_outcome(outcome: &PaymentOutcome) {
    let order = &outcome.order;

    for item in &outcome.oversold_items {
        warn!(
            order_number = %order.order_number,
            menu_item = %item.name,
            stock = item.stock_quantity,
            "Menu item oversold"
        );
    }
    for shortfall in &outcome.ingredient_shortfalls {
        warn!(
            order_number = %order.order_number,
            ingredient = %shortfall.name,
            quantity = shortfall.quantity,
            "Ingredient balance below zero"
        );
    }
    for id in &outcome.skipped_items {
        warn!(order_number = %order.order_number, menu_item_id = %id, "Menu item no longer exists, stock not deducted");
    }
    for id in &outcome.missing_ingredients {
        warn!(order_number = %order.order_number, ingredient_id = %id, "Recipe ingredient missing from inventory");
    }

    info!(
        order_number = %order.order_number,
        total = %order.total,
        change = ?order.change,
        method = %order.payment_method,
        "Order paid"
    );
}

/// Cancels an unpaid order. Stock is untouched.
pub fn cancel_order(stores: &StoreState, id: String) -> Result<Order, ApiError> {
    debug!(id = %id, "cancel_order command");

    let order = stores.mutate(&[StoreKind::Orders], |s| s.orders.cancel_order(&id))?;

    info!(order_number = %order.order_number, "Order cancelled");
    Ok(order)
}

/// Deletes the order record. Stock already deducted stays deducted.
pub fn delete_order(stores: &StoreState, id: String) -> Result<Order, ApiError> {
    debug!(id = %id, "delete_order command");

    let order = stores.mutate(&[StoreKind::Orders], |s| s.orders.delete_order(&id))?;

    if order.is_paid {
        warn!(order_number = %order.order_number, total = %order.total, "Paid order deleted");
    } else {
        info!(order_number = %order.order_number, "Order deleted");
    }
    Ok(order)
}

pub fn update_order(stores: &StoreState, id: String, patch: OrderPatch) -> Result<Order, ApiError> {
    debug!(id = %id, "update_order command");

    let order = stores.mutate(&[StoreKind::Orders], |s| s.orders.update_order(&id, patch))?;

    info!(order_number = %order.order_number, "Order updated");
    Ok(order)
}

/// Lists orders, newest first, optionally filtered by status.
pub fn list_orders(stores: &StoreState, status: Option<OrderStatus>) -> Vec<Order> {
    debug!(status = ?status, "list_orders command");

    let mut orders: Vec<Order> = stores.with_stores(|s| {
        s.orders
            .orders()
            .iter()
            .filter(|o| status.map_or(true, |st| o.status == st))
            .cloned()
            .collect()
    });
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

pub fn get_order(stores: &StoreState, id: String) -> Result<Order, ApiError> {
    debug!(id = %id, "get_order command");

    stores
        .with_stores(|s| s.orders.get(&id).cloned())
        .ok_or_else(|| ApiError::not_found("Order", &id))
}

/// Orders created on a local calendar day.
pub fn get_orders_for_day(stores: &StoreState, config: &ConfigState, date: NaiveDate) -> Vec<Order> {
    debug!(date = %date, "get_orders_for_day command");

    let tz = config.timezone();
    stores.with_stores(|s| s.orders.orders_created_on(date, &tz).into_iter().cloned().collect())
}

pub fn get_orders_by_creator(stores: &StoreState, user_id: String) -> Vec<Order> {
    debug!(user_id = %user_id, "get_orders_by_creator command");
    stores.with_stores(|s| s.orders.orders_by_creator(&user_id).into_iter().cloned().collect())
}

/// Completes paid orders whose status was left behind.
///
/// ## Returns
/// Number of orders repaired
pub fn fix_inconsistent_orders(stores: &StoreState) -> Result<usize, ApiError> {
    debug!("fix_inconsistent_orders command");

    let fixed = stores.mutate(&[StoreKind::Orders], |s| Ok::<_, ApiError>(s.orders.fix_inconsistent_orders()))?;

    if fixed > 0 {
        warn!(fixed, "Repaired paid orders that were not completed");
    }
    Ok(fixed)
}

/// Replaces every order with a snapshot received from another device,
/// then runs the repair pass over it.
///
/// ## Returns
/// Number of orders now held
pub fn apply_remote_orders(stores: &StoreState, orders: Vec<Order>) -> Result<usize, ApiError> {
    debug!(orders = orders.len(), "apply_remote_orders command");

    let (count, fixed) = stores.mutate(&[StoreKind::Orders], |s| {
        s.orders.replace_all(orders);
        let fixed = s.orders.fix_inconsistent_orders();
        Ok::<_, ApiError>((s.orders.len(), fixed))
    })?;

    if fixed > 0 {
        warn!(fixed, "Repaired paid orders in remote snapshot");
    }
    info!(orders = count, "Remote order snapshot applied");
    Ok(count)
}
