//! # Cart State
//!
//! The order being assembled on the POS screen, before it becomes an
//! order.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  UI Action                 Command                 Cart State Change    │
//! │  ─────────                 ───────                 ─────────────────    │
//! │                                                                         │
//! │  Tap item / pick size ───► add_to_cart() ────────► line +qty or push   │
//! │                                                                         │
//! │  +/- buttons ────────────► update_cart_item() ───► line.qty = n        │
//! │                                                                         │
//! │  Click Remove ───────────► remove_from_cart() ───► lines.remove(i)     │
//! │                                                                         │
//! │  Confirm Order ──────────► checkout() ───────────► create_order, clear │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are keyed by item, size and flavor: a 16oz and a 22oz Green Apple
//! Soda are two lines. The cart never lets the lines of one menu item add
//! up to more than its stock.

use std::sync::{Arc, Mutex, PoisonError};

use cafe_core::orders::OrderLineRequest;
use cafe_core::{MenuItem, Money, MAX_ITEM_QUANTITY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A line in the cart.
///
/// `unit_price` is the catalog price when the line was first added and
/// is only used for the cart totals shown before checkout. The order is
/// priced again from the catalog when it is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// `{menuItemId}[|s:{size}][|f:{flavor}]`
    pub line_id: String,

    pub menu_item_id: String,

    /// Display name including the variant, e.g. "Green Apple Soda - 22oz"
    pub name: String,

    pub unit_price: Money,

    pub quantity: i64,

    pub selected_size: Option<String>,

    pub selected_flavor: Option<String>,

    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    fn is_line_for(&self, menu_item_id: &str, size: Option<&str>, flavor: Option<&str>) -> bool {
        self.menu_item_id == menu_item_id
            && self.selected_size.as_deref() == size
            && self.selected_flavor.as_deref() == flavor
    }
}

/// Builds the handle the UI uses for a cart line.
///
/// Size and flavor are tagged, so a size and a flavor with the same name
/// never share a key.
pub fn line_id(menu_item_id: &str, size: Option<&str>, flavor: Option<&str>) -> String {
    let mut key = menu_item_id.to_string();
    if let Some(size) = size {
        key.push_str("|s:");
        key.push_str(size);
    }
    if let Some(flavor) = flavor {
        key.push_str("|f:");
        key.push_str(flavor);
    }
    key
}

/// The cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,

    /// When the cart was created/last cleared
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds `quantity` of a menu item (optionally a size or flavor).
    ///
    /// ## Returns
    /// - `Err(String)` if the variant is unknown, or the item's lines
    ///   would exceed its stock or the per-line maximum
    pub fn add_item(
        &mut self,
        item: &MenuItem,
        quantity: i64,
        size: Option<&str>,
        flavor: Option<&str>,
    ) -> Result<(), String> {
        if quantity <= 0 {
            return Err("Quantity must be positive".to_string());
        }
        let price = item.price_for(size, flavor).map_err(|e| e.to_string())?;

        // Matched on the variant itself, not on the key string.
        let existing = self.items.iter().position(|i| i.is_line_for(&item.id, size, flavor));
        let key = match existing {
            Some(index) => self.items[index].line_id.clone(),
            None => line_id(&item.id, size, flavor),
        };
        let current = existing.map(|index| self.items[index].quantity).unwrap_or(0);
        self.check_quantity(item, &key, current + quantity)?;

        if let Some(index) = existing {
            self.items[index].quantity += quantity;
            return Ok(());
        }

        self.items.push(CartItem {
            line_id: key,
            menu_item_id: item.id.clone(),
            name: item.display_name(size, flavor),
            unit_price: price,
            quantity,
            selected_size: size.map(str::to_string),
            selected_flavor: flavor.map(str::to_string),
            added_at: Utc::now(),
        });
        Ok(())
    }

    /// Sets a line's quantity. Zero or less removes the line.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64, item: &MenuItem) -> Result<(), String> {
        if quantity <= 0 {
            return self.remove_item(line_id);
        }
        if self.line(line_id).is_none() {
            return Err(format!("Item {} not in cart", line_id));
        }
        self.check_quantity(item, line_id, quantity)?;

        if let Some(line) = self.items.iter_mut().find(|i| i.line_id == line_id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// `quantity` for line `key`, plus the item's other lines, must fit in stock.
    fn check_quantity(&self, item: &MenuItem, key: &str, quantity: i64) -> Result<(), String> {
        if quantity > MAX_ITEM_QUANTITY {
            return Err(format!("Quantity cannot exceed {}", MAX_ITEM_QUANTITY));
        }
        let other_lines: i64 = self
            .items
            .iter()
            .filter(|i| i.menu_item_id == item.id && i.line_id != key)
            .map(|i| i.quantity)
            .sum();
        if other_lines + quantity > item.stock_quantity {
            return Err(format!(
                "Only {} {} in stock",
                item.stock_quantity.max(0),
                item.name
            ));
        }
        Ok(())
    }

    pub fn remove_item(&mut self, line_id: &str) -> Result<(), String> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.line_id != line_id);

        if self.items.len() == initial_len {
            Err(format!("Item {} not in cart", line_id))
        } else {
            Ok(())
        }
    }

    pub fn line(&self, line_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.line_id == line_id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The cart as order line requests, in cart order.
    pub fn order_lines(&self) -> Vec<OrderLineRequest> {
        self.items
            .iter()
            .map(|i| OrderLineRequest {
                menu_item_id: i.menu_item_id.clone(),
                quantity: i.quantity,
                selected_size: i.selected_size.clone(),
                selected_flavor: i.selected_flavor.clone(),
            })
            .collect()
    }
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal,
            total: subtotal,
        }
    }
}

/// Shared cart state.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}
