//! # Purchase Commands
//!
//! Supplier deliveries. Recording a purchase restocks every ingredient on
//! it; deleting one does not take the stock back out.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::report::local_date_range;
use crate::error::ApiError;
use crate::state::{ConfigState, StoreKind, StoreState};
use cafe_core::purchases::NewPurchase;
use cafe_core::Purchase;

pub fn create_purchase(stores: &StoreState, purchase: NewPurchase) -> Result<Purchase, ApiError> {
    debug!(supplier = %purchase.supplier_name, lines = purchase.items.len(), "create_purchase command");

    let purchase = stores.mutate(&[StoreKind::Purchases, StoreKind::Inventory], |s| {
        s.purchases.create_purchase(&mut s.inventory, purchase)
    })?;

    info!(
        purchase_number = %purchase.purchase_number,
        supplier = %purchase.supplier_name,
        total_cost = %purchase.total_cost,
        lines = purchase.items.len(),
        "Purchase recorded"
    );
    Ok(purchase)
}

pub fn delete_purchase(stores: &StoreState, id: String) -> Result<Purchase, ApiError> {
    debug!(id = %id, "delete_purchase command");

    let purchase = stores.mutate(&[StoreKind::Purchases], |s| s.purchases.delete_purchase(&id))?;

    warn!(
        purchase_number = %purchase.purchase_number,
        "Purchase deleted, restocked quantities were kept"
    );
    Ok(purchase)
}

/// Lists purchases, most recent first.
pub fn list_purchases(stores: &StoreState) -> Vec<Purchase> {
    debug!("list_purchases command");

    let mut purchases = stores.with_stores(|s| s.purchases.purchases().to_vec());
    purchases.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
    purchases
}

pub fn get_purchase(stores: &StoreState, id: String) -> Result<Purchase, ApiError> {
    debug!(id = %id, "get_purchase command");

    stores
        .with_stores(|s| s.purchases.get(&id).cloned())
        .ok_or_else(|| ApiError::not_found("Purchase", &id))
}

/// Purchases dated within whole local days `start_date..=end_date`.
pub fn get_purchases_between(
    stores: &StoreState,
    config: &ConfigState,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<Purchase>, ApiError> {
    debug!(start = %start_date, end = %end_date, "get_purchases_between command");

    let (start, end) = local_date_range(config, start_date, end_date)?;
    Ok(stores.with_stores(|s| {
        s.purchases
            .purchases_between(start.with_timezone(&Utc), end.with_timezone(&Utc))
            .into_iter()
            .cloned()
            .collect()
    }))
}

pub fn get_purchases_by_supplier(stores: &StoreState, supplier_name: String) -> Vec<Purchase> {
    debug!(supplier = %supplier_name, "get_purchases_by_supplier command");
    stores.with_stores(|s| s.purchases.purchases_by_supplier(&supplier_name).into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::CafeStores;
    use cafe_core::inventory::NewInventoryItem;
    use cafe_core::purchases::PurchaseLineRequest;
    use cafe_core::{Actor, Money};

    fn with_ingredient() -> (StoreState, String) {
        let mut cafe = CafeStores::first_run();
        let beans = cafe
            .inventory
            .add_item(NewInventoryItem::new("Espresso Beans", "Coffee", "g", 10.0, 5.0, Money::from_major(5)))
            .unwrap();
        (StoreState::new(cafe), beans.id)
    }

    fn delivery(id: &str) -> NewPurchase {
        NewPurchase::new(
            "Bean Co",
            vec![PurchaseLineRequest::new(id, 20.0, Money::from_major(5))],
            Actor::new("u1", "Ana"),
        )
    }

    #[test]
    fn test_purchase_restocks_inventory() {
        let (stores, beans) = with_ingredient();

        let purchase = create_purchase(&stores, delivery(&beans)).unwrap();
        assert_eq!(purchase.total_cost, Money::from_major(100));
        assert_eq!(stores.with_stores(|s| s.inventory.get(&beans).unwrap().quantity), 30.0);
    }

    #[test]
    fn test_delete_keeps_stock() {
        let (stores, beans) = with_ingredient();
        let purchase = create_purchase(&stores, delivery(&beans)).unwrap();

        delete_purchase(&stores, purchase.id.clone()).unwrap();
        assert!(list_purchases(&stores).is_empty());
        assert_eq!(stores.with_stores(|s| s.inventory.get(&beans).unwrap().quantity), 30.0);
        assert_eq!(get_purchase(&stores, purchase.id).unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_queries() {
        let (stores, beans) = with_ingredient();
        create_purchase(&stores, delivery(&beans)).unwrap();

        assert_eq!(get_purchases_by_supplier(&stores, "bean co".into()).len(), 1);
        assert!(get_purchases_by_supplier(&stores, "Milk Co".into()).is_empty());

        let config = ConfigState::default();
        let today = Utc::now().with_timezone(&config.timezone()).date_naive();
        let found = get_purchases_between(&stores, &config, today, today).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_unknown_ingredient_rejected() {
        let (stores, _) = with_ingredient();
        let err = create_purchase(&stores, delivery("missing")).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(list_purchases(&stores).is_empty());
    }
}
