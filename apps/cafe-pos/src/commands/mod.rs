//! # Commands Module
//!
//! All commands exposed to the UI, plus the dispatcher that routes a
//! named request to them.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (request routing)
//! ├── menu.rs      ◄─── Menu items, stock counter, categories
//! ├── inventory.rs ◄─── Ingredients and manual stock movements
//! ├── order.rs     ◄─── Order lifecycle and queries
//! ├── purchase.rs  ◄─── Supplier purchases
//! ├── report.rs    ◄─── Dashboard and sales report
//! ├── cart.rs      ◄─── Cart manipulation and checkout
//! └── config.rs    ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI (one JSON object per line on stdin)                                 │
//! │  ─────────────────────────────────────                                  │
//! │  {"id":7,"command":"mark_order_paid",                                   │
//! │   "args":{"id":"5f0c…","amountReceived":15000}}                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  dispatch(&app, request)                                                │
//! │    "mark_order_paid" ──► order::mark_order_paid(                        │
//! │                              &app.stores,  ◄── state the command needs  │
//! │                              args.id,      ◄── from "args"              │
//! │                              args.amount_received)                      │
//! │         │                                                               │
//! │         ▼ (JSON serialization)                                          │
//! │  {"id":7,"ok":true,"data":{"order":{…},"oversoldItems":[]…}}            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state it needs (`&StoreState`,
//! `&CartState`, `&ConfigState`) and returns `Result<T, ApiError>` or a
//! plain value when it cannot fail.

pub mod cart;
pub mod config;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod purchase;
pub mod report;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ErrorCode};
use crate::App;
use cafe_core::{Money, Order, OrderStatus};

// =============================================================================
// Wire Types
// =============================================================================

/// One command invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Echoed back so the caller can match responses to requests
    #[serde(default)]
    pub id: Option<Value>,

    pub command: String,

    #[serde(default)]
    pub args: Value,
}

/// Result of one command.
///
/// ```json
/// { "id": 7, "ok": false, "error": { "code": "NOT_FOUND", "message": "Order not found: x" } }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    pub fn new(id: Option<Value>, result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(data) => Response {
                id,
                ok: true,
                data: Some(data),
                error: None,
            },
            Err(error) => Response {
                id,
                ok: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

// =============================================================================
// Argument Shapes
// =============================================================================

#[derive(Deserialize)]
struct IdArgs {
    id: String,
}

#[derive(Deserialize)]
struct PatchArgs<P> {
    id: String,
    patch: P,
}

#[derive(Deserialize)]
struct QuantityArgs<Q> {
    id: String,
    quantity: Q,
}

#[derive(Deserialize)]
struct NameArgs {
    name: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CategoryFilter {
    category: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct StatusFilter {
    status: Option<OrderStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayArgs {
    id: String,
    #[serde(default)]
    amount_received: Option<Money>,
}

#[derive(Deserialize)]
struct DayArgs {
    date: NaiveDate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatorArgs {
    user_id: String,
}

#[derive(Deserialize)]
struct RemoteOrdersArgs {
    orders: Vec<Order>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateRangeArgs {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SupplierArgs {
    supplier_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddToCartArgs {
    menu_item_id: String,
    #[serde(default)]
    quantity: Option<i64>,
    #[serde(default)]
    selected_size: Option<String>,
    #[serde(default)]
    selected_flavor: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartLineArgs {
    line_id: String,
}

/// `quantity` is required: zero removes the line, so it is never defaulted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartQuantityArgs {
    line_id: String,
    quantity: i64,
}

/// Missing `args` reads as an empty object.
fn parse<T: DeserializeOwned>(args: Value) -> Result<T, ApiError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    Ok(serde_json::from_value(args)?)
}

fn reply<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("Failed to encode response: {}", e)))
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Routes a request to its command.
pub fn dispatch(app: &App, request: Request) -> Result<Value, ApiError> {
    let App { config, stores, cart } = app;
    let args = request.args;

    match request.command.as_str() {
        // Menu
        "list_menu_items" => {
            let a: CategoryFilter = parse(args)?;
            reply(menu::list_menu_items(stores, a.category))
        }
        "get_menu_item" => {
            let a: IdArgs = parse(args)?;
            reply(menu::get_menu_item(stores, a.id)?)
        }
        "add_menu_item" => reply(menu::add_menu_item(stores, parse(args)?)?),
        "update_menu_item" => {
            let a: PatchArgs<_> = parse(args)?;
            reply(menu::update_menu_item(stores, a.id, a.patch)?)
        }
        "delete_menu_item" => {
            let a: IdArgs = parse(args)?;
            reply(menu::delete_menu_item(stores, a.id)?)
        }
        "update_menu_stock" => {
            let a: QuantityArgs<i64> = parse(args)?;
            reply(menu::update_menu_stock(stores, a.id, a.quantity)?)
        }
        "list_categories" => reply(menu::list_categories(stores)),
        "add_category" => {
            let a: NameArgs = parse(args)?;
            reply(menu::add_category(stores, a.name)?)
        }
        "delete_category" => {
            let a: NameArgs = parse(args)?;
            reply(menu::delete_category(stores, a.name)?)
        }
        "reset_categories" => reply(menu::reset_categories(stores)?),

        // Inventory
        "list_inventory_items" => reply(inventory::list_inventory_items(stores)),
        "get_inventory_item" => {
            let a: IdArgs = parse(args)?;
            reply(inventory::get_inventory_item(stores, a.id)?)
        }
        "add_inventory_item" => reply(inventory::add_inventory_item(stores, parse(args)?)?),
        "update_inventory_item" => {
            let a: PatchArgs<_> = parse(args)?;
            reply(inventory::update_inventory_item(stores, a.id, a.patch)?)
        }
        "delete_inventory_item" => {
            let a: IdArgs = parse(args)?;
            reply(inventory::delete_inventory_item(stores, a.id)?)
        }
        "restock_inventory_item" => {
            let a: QuantityArgs<f64> = parse(args)?;
            reply(inventory::restock_inventory_item(stores, a.id, a.quantity)?)
        }
        "set_inventory_quantity" => {
            let a: QuantityArgs<f64> = parse(args)?;
            reply(inventory::set_inventory_quantity(stores, a.id, a.quantity)?)
        }
        "get_low_stock_items" => reply(inventory::get_low_stock_items(stores)),

        // Orders
        "create_order" => reply(order::create_order(stores, parse(args)?)?),
        "mark_order_served" => {
            let a: IdArgs = parse(args)?;
            reply(order::mark_order_served(stores, a.id)?)
        }
        "mark_order_paid" => {
            let a: PayArgs = parse(args)?;
            reply(order::mark_order_paid(stores, a.id, a.amount_received)?)
        }
        "cancel_order" => {
            let a: IdArgs = parse(args)?;
            reply(order::cancel_order(stores, a.id)?)
        }
        "delete_order" => {
            let a: IdArgs = parse(args)?;
            reply(order::delete_order(stores, a.id)?)
        }
        "update_order" => {
            let a: PatchArgs<_> = parse(args)?;
            reply(order::update_order(stores, a.id, a.patch)?)
        }
        "list_orders" => {
            let a: StatusFilter = parse(args)?;
            reply(order::list_orders(stores, a.status))
        }
        "get_order" => {
            let a: IdArgs = parse(args)?;
            reply(order::get_order(stores, a.id)?)
        }
        "get_orders_for_day" => {
            let a: DayArgs = parse(args)?;
            reply(order::get_orders_for_day(stores, config, a.date))
        }
        "get_orders_by_creator" => {
            let a: CreatorArgs = parse(args)?;
            reply(order::get_orders_by_creator(stores, a.user_id))
        }
        "fix_inconsistent_orders" => reply(order::fix_inconsistent_orders(stores)?),
        "apply_remote_orders" => {
            let a: RemoteOrdersArgs = parse(args)?;
            reply(order::apply_remote_orders(stores, a.orders)?)
        }

        // Purchases
        "create_purchase" => reply(purchase::create_purchase(stores, parse(args)?)?),
        "delete_purchase" => {
            let a: IdArgs = parse(args)?;
            reply(purchase::delete_purchase(stores, a.id)?)
        }
        "list_purchases" => reply(purchase::list_purchases(stores)),
        "get_purchase" => {
            let a: IdArgs = parse(args)?;
            reply(purchase::get_purchase(stores, a.id)?)
        }
        "get_purchases_between" => {
            let a: DateRangeArgs = parse(args)?;
            reply(purchase::get_purchases_between(stores, config, a.start_date, a.end_date)?)
        }
        "get_purchases_by_supplier" => {
            let a: SupplierArgs = parse(args)?;
            reply(purchase::get_purchases_by_supplier(stores, a.supplier_name))
        }

        // Reports
        "get_dashboard" => reply(report::get_dashboard(stores, config)),
        "get_sales_report" => {
            let a: DateRangeArgs = parse(args)?;
            reply(report::get_sales_report(stores, config, a.start_date, a.end_date)?)
        }

        // Cart
        "get_cart" => reply(cart::get_cart(cart)),
        "add_to_cart" => {
            let a: AddToCartArgs = parse(args)?;
            reply(cart::add_to_cart(
                stores,
                cart,
                a.menu_item_id,
                a.quantity,
                a.selected_size,
                a.selected_flavor,
            )?)
        }
        "update_cart_item" => {
            let a: CartQuantityArgs = parse(args)?;
            reply(cart::update_cart_item(stores, cart, a.line_id, a.quantity)?)
        }
        "remove_from_cart" => {
            let a: CartLineArgs = parse(args)?;
            reply(cart::remove_from_cart(cart, a.line_id)?)
        }
        "clear_cart" => reply(cart::clear_cart(cart)),
        "checkout" => reply(cart::checkout(stores, cart, parse(args)?)?),

        // Config
        "get_config" => reply(config::get_config(config)),

        other => Err(ApiError::new(
            ErrorCode::UnknownCommand,
            format!("Unknown command: {}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CafeStores, CartState, ConfigState, StoreState};
    use serde_json::json;

    fn app() -> App {
        App {
            config: ConfigState::default(),
            stores: StoreState::new(CafeStores::first_run()),
            cart: CartState::new(),
        }
    }

    fn call(app: &App, command: &str, args: Value) -> Result<Value, ApiError> {
        dispatch(
            app,
            Request {
                id: None,
                command: command.to_string(),
                args,
            },
        )
    }

    #[test]
    fn test_order_flow_over_dispatch() {
        let app = app();

        let latte = call(
            &app,
            "add_menu_item",
            json!({ "name": "Vanilla Latte", "category": "Coffee", "price": 5000, "stockQuantity": 5 }),
        )
        .unwrap();
        let latte_id = latte["id"].as_str().unwrap().to_string();

        let order = call(
            &app,
            "create_order",
            json!({
                "items": [{ "menuItemId": latte_id, "quantity": 2 }],
                "paymentMethod": "Cash",
                "actor": { "id": "u1", "name": "Ana" }
            }),
        )
        .unwrap();
        assert_eq!(order["total"], 10000);
        assert_eq!(order["status"], "pending");

        let outcome = call(
            &app,
            "mark_order_paid",
            json!({ "id": order["id"], "amountReceived": 15000 }),
        )
        .unwrap();
        assert_eq!(outcome["order"]["change"], 5000);

        let item = call(&app, "get_menu_item", json!({ "id": latte_id })).unwrap();
        assert_eq!(item["stockQuantity"], 3);
    }

    #[test]
    fn test_missing_args_default_to_empty() {
        let app = app();
        let orders = call(&app, "list_orders", Value::Null).unwrap();
        assert_eq!(orders, json!([]));

        let categories = call(&app, "list_categories", Value::Null).unwrap();
        assert_eq!(categories.as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_bad_args_and_unknown_command() {
        let app = app();

        let err = call(&app, "get_order", json!({ "orderId": "x" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = call(&app, "launch_rocket", Value::Null).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownCommand);
    }

    #[test]
    fn test_cart_update_requires_quantity() {
        let app = app();
        let soda = call(
            &app,
            "add_menu_item",
            json!({ "name": "Green Apple Soda", "category": "Soda", "price": 2800, "stockQuantity": 5 }),
        )
        .unwrap();

        let cart = call(&app, "add_to_cart", json!({ "menuItemId": soda["id"] })).unwrap();
        let line_id = cart["items"][0]["lineId"].clone();

        let err = call(&app, "update_cart_item", json!({ "lineId": line_id })).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let cart = call(&app, "get_cart", Value::Null).unwrap();
        assert_eq!(cart["items"][0]["quantity"], 1);

        let cart = call(&app, "update_cart_item", json!({ "lineId": line_id, "quantity": 0 })).unwrap();
        assert_eq!(cart["items"], json!([]));
    }

    #[test]
    fn test_response_shape() {
        let ok = serde_json::to_value(Response::new(Some(json!(1)), Ok(json!([])))).unwrap();
        assert_eq!(ok, json!({ "id": 1, "ok": true, "data": [] }));

        let err = Response::new(None, Err(ApiError::not_found("Order", "x")));
        let err = serde_json::to_value(err).unwrap();
        assert_eq!(err["ok"], false);
        assert_eq!(err["error"]["code"], "NOT_FOUND");
        assert!(err.get("id").is_none());
    }
}
