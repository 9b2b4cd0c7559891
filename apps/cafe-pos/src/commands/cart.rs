//! # Cart Commands
//!
//! Commands for the POS screen's cart.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Confirm  │────►│ Pending  │       │
//! │  │  Cart    │     │          │     │  Order   │     │  Order   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart        checkout                           │
//! │                   update_item        (create_order, then clear)         │
//! │                   remove_item                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::order;
use crate::error::ApiError;
use crate::state::{Cart, CartItem, CartState, CartTotals, StoreState};
use cafe_core::orders::NewOrder;
use cafe_core::{Actor, MenuItem, Money, Order, PaymentMethod};

/// Cart response including items and totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            items: cart.items.clone(),
            totals: CartTotals::from(cart),
        }
    }
}

/// What the confirm-order dialog adds to the cart contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub actor: Actor,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub amount_received: Option<Money>,
}

fn menu_item(stores: &StoreState, id: &str) -> Result<MenuItem, ApiError> {
    stores
        .with_stores(|s| s.catalog.get(id).cloned())
        .ok_or_else(|| ApiError::not_found("Menu item", id))
}

pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds a menu item (optionally a size or flavor) to the cart.
///
/// ## Behavior
/// - Same item, size and flavor already in cart: quantity increases
/// - Otherwise: added as a new line showing the variant's current price
/// - All lines of one item together may not exceed its stock
pub fn add_to_cart(
    stores: &StoreState,
    cart: &CartState,
    menu_item_id: String,
    quantity: Option<i64>,
    selected_size: Option<String>,
    selected_flavor: Option<String>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(menu_item_id = %menu_item_id, quantity, size = ?selected_size, flavor = ?selected_flavor, "add_to_cart command");

    let item = menu_item(stores, &menu_item_id)?;
    if !item.is_available() {
        return Err(ApiError::cart(format!("{} is out of stock", item.name)));
    }

    let result = cart.with_cart_mut(|c| {
        c.add_item(&item, quantity, selected_size.as_deref(), selected_flavor.as_deref())?;
        Ok::<CartResponse, String>(CartResponse::from(&*c))
    });

    result.map_err(ApiError::cart)
}

/// Sets the quantity of a cart line. Zero removes it.
pub fn update_cart_item(
    stores: &StoreState,
    cart: &CartState,
    line_id: String,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, quantity, "update_cart_item command");

    let menu_item_id = cart
        .with_cart(|c| c.line(&line_id).map(|l| l.menu_item_id.clone()))
        .ok_or_else(|| ApiError::cart(format!("Item {} not in cart", line_id)))?;
    let item = menu_item(stores, &menu_item_id)?;

    let result = cart.with_cart_mut(|c| {
        c.update_quantity(&line_id, quantity, &item)?;
        Ok::<CartResponse, String>(CartResponse::from(&*c))
    });

    result.map_err(ApiError::cart)
}

pub fn remove_from_cart(cart: &CartState, line_id: String) -> Result<CartResponse, ApiError> {
    debug!(line_id = %line_id, "remove_from_cart command");

    let result = cart.with_cart_mut(|c| {
        c.remove_item(&line_id)?;
        Ok::<CartResponse, String>(CartResponse::from(&*c))
    });

    result.map_err(ApiError::cart)
}

pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");

    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}

/// Turns the cart into a pending order and empties it.
///
/// Only item ids, variants and quantities are sent on: the order book
/// prices each line from the catalog and checks stock again. On failure
/// the cart is kept so the cashier can fix it.
pub fn checkout(stores: &StoreState, cart: &CartState, request: CheckoutRequest) -> Result<Order, ApiError> {
    debug!(created_by = %request.actor.id, method = %request.payment_method, "checkout command");

    cart.with_cart_mut(|c| {
        if c.is_empty() {
            return Err(ApiError::cart("Cart is empty"));
        }

        let new = NewOrder {
            items: c.order_lines(),
            customer_name: request.customer_name,
            notes: request.notes,
            payment_method: request.payment_method,
            actor: request.actor,
            amount_received: request.amount_received,
        };
        let order = order::create_order(stores, new)?;

        c.clear();
        info!(order_number = %order.order_number, "Cart checked out");
        Ok(order)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::CafeStores;
    use cafe_core::catalog::NewMenuItem;
    use cafe_core::OrderStatus;

    fn setup() -> (StoreState, CartState, String) {
        let mut cafe = CafeStores::first_run();
        let soda = cafe
            .catalog
            .add_item(
                NewMenuItem::new("Green Apple Soda", "Soda", Money::from_major(28), 5)
                    .with_size("16oz", Money::from_major(28))
                    .with_size("22oz", Money::from_major(38)),
            )
            .unwrap();
        (StoreState::new(cafe), CartState::new(), soda.id)
    }

    fn cashier() -> CheckoutRequest {
        CheckoutRequest {
            payment_method: PaymentMethod::Cash,
            actor: Actor::new("u1", "Ana"),
            customer_name: Some("Ben".into()),
            notes: None,
            amount_received: Some(Money::from_major(100)),
        }
    }

    #[test]
    fn test_add_update_remove() {
        let (stores, cart, soda) = setup();

        let response = add_to_cart(&stores, &cart, soda.clone(), None, Some("22oz".into()), None).unwrap();
        assert_eq!(response.totals.subtotal, Money::from_major(38));

        let line = response.items[0].line_id.clone();
        let response = update_cart_item(&stores, &cart, line.clone(), 2).unwrap();
        assert_eq!(response.totals.total_quantity, 2);

        let err = update_cart_item(&stores, &cart, line.clone(), 6).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        let response = remove_from_cart(&cart, line).unwrap();
        assert!(response.items.is_empty());
    }

    #[test]
    fn test_unknown_item_and_variant() {
        let (stores, cart, soda) = setup();

        let err = add_to_cart(&stores, &cart, "missing".into(), Some(1), None, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = add_to_cart(&stores, &cart, soda, Some(1), Some("32oz".into()), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[test]
    fn test_checkout_creates_order_and_clears_cart() {
        let (stores, cart, soda) = setup();
        add_to_cart(&stores, &cart, soda.clone(), Some(1), Some("16oz".into()), None).unwrap();
        add_to_cart(&stores, &cart, soda, Some(1), Some("22oz".into()), None).unwrap();

        let order = checkout(&stores, &cart, cashier()).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Money::from_major(66));
        assert_eq!(order.change, Some(Money::from_major(34)));
        assert_eq!(order.items[1].menu_item_name, "Green Apple Soda - 22oz");
        assert!(get_cart(&cart).items.is_empty());
    }

    #[test]
    fn test_checkout_prices_from_catalog() {
        let (stores, cart, soda) = setup();
        add_to_cart(&stores, &cart, soda.clone(), Some(2), None, None).unwrap();

        stores
            .mutate(&[], |s| {
                let mut item = s.catalog.get(&soda).cloned().ok_or(ApiError::not_found("Menu item", &soda))?;
                item.price = Money::from_major(30);
                s.catalog.upsert_item(item);
                Ok::<(), ApiError>(())
            })
            .unwrap();

        assert_eq!(get_cart(&cart).totals.subtotal, Money::from_major(56));
        let order = checkout(&stores, &cart, cashier()).unwrap();
        assert_eq!(order.total, Money::from_major(60));
        assert_eq!(order.items[0].price, Money::from_major(30));
    }

    #[test]
    fn test_checkout_keeps_cart_on_failure() {
        let (stores, cart, soda) = setup();
        add_to_cart(&stores, &cart, soda.clone(), Some(3), None, None).unwrap();

        // Someone sold two while this cart was open.
        stores
            .mutate(&[], |s| s.catalog.set_stock(&soda, 1))
            .unwrap();

        let err = checkout(&stores, &cart, cashier()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(get_cart(&cart).totals.total_quantity, 3);

        clear_cart(&cart);
        let err = checkout(&stores, &cart, cashier()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }
}
