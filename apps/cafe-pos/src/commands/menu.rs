//! # Menu Commands
//!
//! Menu item CRUD, the stock counter, and category tabs.
//!
//! ## Menu Screen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [Coffee] [Waffle] [Beverage] [Soda] [Snack] [Rice Meal]  [+ Category]  │
//! │                                                                         │
//! │  ┌──────────────────────┐  ┌──────────────────────┐                    │
//! │  │ Vanilla Latte  ₱120  │  │ Spanish Latte  ₱130  │                    │
//! │  │ stock 20  available  │  │ stock 0  out_of_stock│                    │
//! │  └──────────────────────┘  └──────────────────────┘                    │
//! │                                                                         │
//! │  list_menu_items({ category: "Coffee" })                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{StoreKind, StoreState};
use cafe_core::catalog::{MenuItemPatch, NewMenuItem};
use cafe_core::validation::validate_stock;
use cafe_core::{CoreError, MenuItem};

/// Lists menu items, optionally only one category.
pub fn list_menu_items(stores: &StoreState, category: Option<String>) -> Vec<MenuItem> {
    debug!(category = ?category, "list_menu_items command");

    stores.with_stores(|s| match category.as_deref() {
        Some(category) => s.catalog.items_in_category(category).cloned().collect(),
        None => s.catalog.items().to_vec(),
    })
}

pub fn get_menu_item(stores: &StoreState, id: String) -> Result<MenuItem, ApiError> {
    debug!(id = %id, "get_menu_item command");

    stores
        .with_stores(|s| s.catalog.get(&id).cloned())
        .ok_or_else(|| ApiError::not_found("Menu item", &id))
}

/// Creates a menu item.
pub fn add_menu_item(stores: &StoreState, item: NewMenuItem) -> Result<MenuItem, ApiError> {
    debug!(name = %item.name, "add_menu_item command");

    let item = stores.mutate(&[StoreKind::Menu], |s| s.catalog.add_item(item))?;

    info!(id = %item.id, name = %item.name, category = %item.category, "Menu item added");
    Ok(item)
}

pub fn update_menu_item(stores: &StoreState, id: String, patch: MenuItemPatch) -> Result<MenuItem, ApiError> {
    debug!(id = %id, "update_menu_item command");

    let item = stores.mutate(&[StoreKind::Menu], |s| s.catalog.update_item(&id, patch))?;

    info!(id = %item.id, name = %item.name, "Menu item updated");
    Ok(item)
}

/// Deletes a menu item. Past orders keep their frozen copy of it.
pub fn delete_menu_item(stores: &StoreState, id: String) -> Result<MenuItem, ApiError> {
    debug!(id = %id, "delete_menu_item command");

    let item = stores.mutate(&[StoreKind::Menu], |s| s.catalog.delete_item(&id))?;

    info!(id = %item.id, name = %item.name, "Menu item deleted");
    Ok(item)
}

/// Sets the stock counter directly (manual count at opening).
///
/// Staff counts are validated here; the catalog itself accepts any value.
pub fn update_menu_stock(stores: &StoreState, id: String, quantity: i64) -> Result<MenuItem, ApiError> {
    debug!(id = %id, quantity, "update_menu_stock command");

    validate_stock(quantity).map_err(CoreError::from)?;
    let item = stores.mutate(&[StoreKind::Menu], |s| s.catalog.set_stock(&id, quantity))?;

    info!(id = %item.id, stock = item.stock_quantity, status = ?item.status(), "Menu stock set");
    Ok(item)
}

pub fn list_categories(stores: &StoreState) -> Vec<String> {
    debug!("list_categories command");
    stores.with_stores(|s| s.catalog.categories().as_slice().to_vec())
}

/// Adds a category tab. Adding an existing name is a no-op.
pub fn add_category(stores: &StoreState, name: String) -> Result<Vec<String>, ApiError> {
    debug!(name = %name, "add_category command");

    stores.mutate(&[StoreKind::Menu], |s| {
        if s.catalog.add_category(&name)? {
            info!(name = %name.trim(), "Category added");
        }
        Ok::<_, ApiError>(s.catalog.categories().as_slice().to_vec())
    })
}

/// Removes a category tab. Refused while menu items still use it.
pub fn delete_category(stores: &StoreState, name: String) -> Result<Vec<String>, ApiError> {
    debug!(name = %name, "delete_category command");

    stores.mutate(&[StoreKind::Menu], |s| {
        if s.catalog.delete_category(&name)? {
            info!(name = %name, "Category deleted");
        }
        Ok::<_, ApiError>(s.catalog.categories().as_slice().to_vec())
    })
}

/// Restores the default category tabs.
pub fn reset_categories(stores: &StoreState) -> Result<Vec<String>, ApiError> {
    debug!("reset_categories command");

    let categories = stores.mutate(&[StoreKind::Menu], |s| {
        s.catalog.reset_categories();
        Ok::<_, ApiError>(s.catalog.categories().as_slice().to_vec())
    })?;

    info!("Categories reset to defaults");
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::CafeStores;
    use cafe_core::{MenuStatus, Money};

    fn state() -> StoreState {
        StoreState::new(CafeStores::first_run())
    }

    #[test]
    fn test_add_and_filter_by_category() {
        let stores = state();
        add_menu_item(&stores, NewMenuItem::new("Vanilla Latte", "Coffee", Money::from_major(120), 20)).unwrap();
        add_menu_item(&stores, NewMenuItem::new("Nachos", "Snack", Money::from_major(99), 10)).unwrap();

        assert_eq!(list_menu_items(&stores, None).len(), 2);
        let coffee = list_menu_items(&stores, Some("Coffee".into()));
        assert_eq!(coffee.len(), 1);
        assert_eq!(coffee[0].name, "Vanilla Latte");
    }

    #[test]
    fn test_stock_zero_marks_out_of_stock() {
        let stores = state();
        let latte =
            add_menu_item(&stores, NewMenuItem::new("Vanilla Latte", "Coffee", Money::from_major(120), 20)).unwrap();

        let updated = update_menu_stock(&stores, latte.id.clone(), 0).unwrap();
        assert_eq!(updated.status(), MenuStatus::OutOfStock);
        assert_eq!(get_menu_item(&stores, latte.id.clone()).unwrap().stock_quantity, 0);

        let err = update_menu_stock(&stores, latte.id.clone(), -1).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = update_menu_stock(&stores, latte.id.clone(), i64::MAX).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_menu_item(&stores, latte.id).unwrap().stock_quantity, 0);
    }

    #[test]
    fn test_missing_item_is_not_found() {
        let err = get_menu_item(&state(), "nope".into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = delete_menu_item(&state(), "nope".into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_category_lifecycle() {
        let stores = state();
        let categories = add_category(&stores, "Pastry".into()).unwrap();
        assert_eq!(categories.len(), 7);

        add_menu_item(&stores, NewMenuItem::new("Croissant", "Pastry", Money::from_major(85), 5)).unwrap();
        let err = delete_category(&stores, "Pastry".into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);

        assert_eq!(reset_categories(&stores).unwrap().len(), 6);
    }
}
