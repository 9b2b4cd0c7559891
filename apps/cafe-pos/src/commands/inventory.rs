//! # Inventory Commands
//!
//! Ingredient CRUD and manual stock movements. Purchases restock through
//! `purchase.rs`; paid orders consume through `order.rs`.

use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{StoreKind, StoreState};
use cafe_core::inventory::{InventoryItemPatch, NewInventoryItem};
use cafe_core::InventoryItem;

pub fn list_inventory_items(stores: &StoreState) -> Vec<InventoryItem> {
    debug!("list_inventory_items command");
    stores.with_stores(|s| s.inventory.items().to_vec())
}

pub fn get_inventory_item(stores: &StoreState, id: String) -> Result<InventoryItem, ApiError> {
    debug!(id = %id, "get_inventory_item command");

    stores
        .with_stores(|s| s.inventory.get(&id).cloned())
        .ok_or_else(|| ApiError::not_found("Inventory item", &id))
}

pub fn add_inventory_item(stores: &StoreState, item: NewInventoryItem) -> Result<InventoryItem, ApiError> {
    debug!(name = %item.name, "add_inventory_item command");

    let item = stores.mutate(&[StoreKind::Inventory], |s| s.inventory.add_item(item))?;

    info!(id = %item.id, name = %item.name, quantity = item.quantity, unit = %item.unit, "Ingredient added");
    Ok(item)
}

pub fn update_inventory_item(
    stores: &StoreState,
    id: String,
    patch: InventoryItemPatch,
) -> Result<InventoryItem, ApiError> {
    debug!(id = %id, "update_inventory_item command");

    let item = stores.mutate(&[StoreKind::Inventory], |s| s.inventory.update_item(&id, patch))?;

    info!(id = %item.id, name = %item.name, "Ingredient updated");
    Ok(item)
}

/// Deletes an ingredient. Recipes that reference it are left alone and
/// skip it when an order is paid.
pub fn delete_inventory_item(stores: &StoreState, id: String) -> Result<InventoryItem, ApiError> {
    debug!(id = %id, "delete_inventory_item command");

    let item = stores.mutate(&[StoreKind::Inventory], |s| s.inventory.delete_item(&id))?;

    let used_by = stores.with_stores(|s| {
        s.catalog
            .items()
            .iter()
            .filter(|m| m.ingredients.iter().any(|u| u.ingredient_id == item.id))
            .count()
    });
    if used_by > 0 {
        warn!(id = %item.id, name = %item.name, recipes = used_by, "Deleted ingredient is still used by recipes");
    }

    info!(id = %item.id, name = %item.name, "Ingredient deleted");
    Ok(item)
}

/// Adds stock outside of a purchase (e.g. a transfer from another branch).
pub fn restock_inventory_item(stores: &StoreState, id: String, quantity: f64) -> Result<InventoryItem, ApiError> {
    debug!(id = %id, quantity, "restock_inventory_item command");

    let item = stores.mutate(&[StoreKind::Inventory], |s| s.inventory.increment(&id, quantity))?;

    info!(id = %item.id, added = quantity, quantity = item.quantity, "Ingredient restocked");
    Ok(item)
}

/// Overwrites the balance with a physical count.
pub fn set_inventory_quantity(stores: &StoreState, id: String, quantity: f64) -> Result<InventoryItem, ApiError> {
    debug!(id = %id, quantity, "set_inventory_quantity command");

    let item = stores.mutate(&[StoreKind::Inventory], |s| s.inventory.set_quantity(&id, quantity))?;

    info!(id = %item.id, quantity = item.quantity, "Ingredient count set");
    Ok(item)
}

/// Ingredients at or below their minimum.
pub fn get_low_stock_items(stores: &StoreState) -> Vec<InventoryItem> {
    debug!("get_low_stock_items command");
    stores.with_stores(|s| s.inventory.low_stock_items().into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::CafeStores;
    use cafe_core::Money;

    fn milk(stores: &StoreState) -> InventoryItem {
        add_inventory_item(
            stores,
            NewInventoryItem::new("Fresh Milk", "Dairy", "ml", 1000.0, 500.0, Money::from_cents(10)),
        )
        .unwrap()
    }

    #[test]
    fn test_restock_and_count() {
        let stores = StoreState::new(CafeStores::first_run());
        let milk = milk(&stores);

        let item = restock_inventory_item(&stores, milk.id.clone(), 250.0).unwrap();
        assert_eq!(item.quantity, 1250.0);

        let item = set_inventory_quantity(&stores, milk.id.clone(), 400.0).unwrap();
        assert_eq!(item.quantity, 400.0);
        assert_eq!(get_low_stock_items(&stores).len(), 1);
    }

    #[test]
    fn test_update_and_delete() {
        let stores = StoreState::new(CafeStores::first_run());
        let milk = milk(&stores);

        let patch = InventoryItemPatch {
            min_quantity: Some(100.0),
            ..Default::default()
        };
        let item = update_inventory_item(&stores, milk.id.clone(), patch).unwrap();
        assert_eq!(item.min_quantity, 100.0);

        delete_inventory_item(&stores, milk.id.clone()).unwrap();
        assert!(list_inventory_items(&stores).is_empty());
        assert_eq!(get_inventory_item(&stores, milk.id).unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_negative_restock_rejected() {
        let stores = StoreState::new(CafeStores::first_run());
        let milk = milk(&stores);

        let err = restock_inventory_item(&stores, milk.id, -5.0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
