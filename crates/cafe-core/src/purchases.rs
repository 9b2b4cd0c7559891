//! # Purchase Ledger
//!
//! Supplier purchases. Recording a purchase replenishes the inventory
//! ledger; deleting one only removes the record.
//!
//! ```text
//! create_purchase("Metro Supplier", [Milk × 20.0 @ ₱5.00])
//!      │
//!      ├── every inventory item must exist (fails closed, nothing written)
//!      ├── no on-hand amount may end above MAX_AMOUNT (same)
//!      ├── line total = ₱5.00 × 20.0 = ₱100.00
//!      ├── inventory.increment(milk, 20.0)
//!      └── Purchase { PUR-..., total_cost: ₱100.00 }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::inventory::InventoryLedger;
use crate::money::Money;
use crate::types::{Actor, Purchase, PurchaseLine};
use crate::validation::{
    normalize_optional, validate_name, validate_positive_amount, validate_price, MAX_AMOUNT,
};

/// Prefix for human-readable purchase numbers.
pub const PURCHASE_NUMBER_PREFIX: &str = "PUR";

/// One purchased ingredient line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLineRequest {
    pub inventory_item_id: String,
    pub quantity: f64,
    pub cost_per_unit: Money,
}

impl PurchaseLineRequest {
    pub fn new(inventory_item_id: impl Into<String>, quantity: f64, cost_per_unit: Money) -> Self {
        PurchaseLineRequest {
            inventory_item_id: inventory_item_id.into(),
            quantity,
            cost_per_unit,
        }
    }
}

/// Everything submitted from the purchase form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    pub supplier_name: String,
    pub items: Vec<PurchaseLineRequest>,
    #[serde(default)]
    pub notes: Option<String>,
    pub actor: Actor,
}

impl NewPurchase {
    pub fn new(supplier_name: impl Into<String>, items: Vec<PurchaseLineRequest>, actor: Actor) -> Self {
        NewPurchase {
            supplier_name: supplier_name.into(),
            items,
            notes: None,
            actor,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The purchase store. Persisted as one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLedger {
    purchases: Vec<Purchase>,
}

impl PurchaseLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a purchase and adds each line's quantity to the inventory.
    pub fn create_purchase(&mut self, inventory: &mut InventoryLedger, new: NewPurchase) -> CoreResult<Purchase> {
        let supplier_name = validate_name("supplier", &new.supplier_name)?;
        if new.items.is_empty() {
            return Err(CoreError::EmptyPurchase);
        }

        let mut lines = Vec::with_capacity(new.items.len());
        let mut on_hand: HashMap<&str, f64> = HashMap::new();
        for request in &new.items {
            validate_positive_amount("quantity", request.quantity)?;
            validate_price("cost per unit", request.cost_per_unit)?;

            let item = inventory
                .get(&request.inventory_item_id)
                .ok_or_else(|| CoreError::InventoryItemNotFound(request.inventory_item_id.clone()))?;

            let after = on_hand.entry(item.id.as_str()).or_insert(item.quantity);
            *after += request.quantity;
            if *after > MAX_AMOUNT {
                return Err(ValidationError::TooLarge {
                    field: format!("{} on hand", item.name),
                }
                .into());
            }

            lines.push(PurchaseLine {
                inventory_item_id: item.id.clone(),
                item_name: item.name.clone(),
                quantity: request.quantity,
                cost_per_unit: request.cost_per_unit,
                total: request.cost_per_unit.scale_by(request.quantity),
            });
        }

        let total_cost = Money::checked_sum(lines.iter().map(|l| l.total)).ok_or_else(|| {
            CoreError::from(ValidationError::TooLarge {
                field: "purchase total".to_string(),
            })
        })?;

        for line in &lines {
            inventory.increment(&line.inventory_item_id, line.quantity)?;
        }

        let now = Utc::now();
        let purchase = Purchase {
            id: crate::generate_id(),
            purchase_number: crate::document_number(PURCHASE_NUMBER_PREFIX, now, |n| {
                self.purchases.iter().any(|p| p.purchase_number == n)
            }),
            supplier_name,
            total_cost,
            items: lines,
            purchase_date: now,
            notes: normalize_optional(new.notes),
            created_by: new.actor.id,
            created_by_name: new.actor.name,
        };

        self.purchases.push(purchase.clone());
        Ok(purchase)
    }

    /// Removes the record. Inventory added by the purchase stays.
    pub fn delete_purchase(&mut self, id: &str) -> CoreResult<Purchase> {
        let index = self
            .purchases
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::PurchaseNotFound(id.to_string()))?;
        Ok(self.purchases.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Purchase> {
        self.purchases.iter().find(|p| p.id == id)
    }

    pub fn purchases(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }

    /// Purchases dated within `[start, end]`, both inclusive.
    pub fn purchases_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Purchase> {
        self.purchases
            .iter()
            .filter(|p| p.purchase_date >= start && p.purchase_date <= end)
            .collect()
    }

    /// Case-insensitive supplier match.
    pub fn purchases_by_supplier(&self, supplier_name: &str) -> Vec<&Purchase> {
        let wanted = supplier_name.trim().to_lowercase();
        self.purchases
            .iter()
            .filter(|p| p.supplier_name.to_lowercase() == wanted)
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::NewInventoryItem;
    use chrono::Duration;

    fn setup() -> (InventoryLedger, String) {
        let mut inventory = InventoryLedger::new();
        let milk = inventory
            .add_item(NewInventoryItem::new("Fresh Milk", "Dairy", "liters", 10.0, 3.0, Money::from_cents(500)))
            .unwrap();
        (inventory, milk.id)
    }

    fn buyer() -> Actor {
        Actor::new("admin-1", "Owner")
    }

    #[test]
    fn test_create_purchase_replenishes_inventory() {
        let (mut inventory, milk) = setup();
        let mut ledger = PurchaseLedger::new();

        let purchase = ledger
            .create_purchase(
                &mut inventory,
                NewPurchase::new(
                    "Metro Supplier",
                    vec![PurchaseLineRequest::new(&milk, 20.0, Money::from_cents(500))],
                    buyer(),
                ),
            )
            .unwrap();

        assert_eq!(inventory.get(&milk).unwrap().quantity, 30.0);
        assert!(inventory.get(&milk).unwrap().last_restocked.is_some());
        assert_eq!(purchase.total_cost, Money::from_cents(10000));
        assert_eq!(purchase.items[0].item_name, "Fresh Milk");
        assert!(purchase.purchase_number.starts_with("PUR-"));
        assert_eq!(purchase.created_by_name, "Owner");
    }

    #[test]
    fn test_fractional_quantities_round_to_centavo() {
        let (mut inventory, milk) = setup();
        let mut ledger = PurchaseLedger::new();

        let purchase = ledger
            .create_purchase(
                &mut inventory,
                NewPurchase::new(
                    "Dairy Co",
                    vec![
                        PurchaseLineRequest::new(&milk, 2.5, Money::from_cents(9999)),
                        PurchaseLineRequest::new(&milk, 0.333, Money::from_cents(100)),
                    ],
                    buyer(),
                ),
            )
            .unwrap();

        assert_eq!(purchase.items[0].total.cents(), 24998); // 249.975 → 249.98
        assert_eq!(purchase.items[1].total.cents(), 33);
        assert_eq!(purchase.total_cost.cents(), 25031);
        assert!((inventory.get(&milk).unwrap().quantity - 12.833).abs() < 1e-9);
    }

    #[test]
    fn test_restock_past_ceiling_fails_closed() {
        let (mut inventory, milk) = setup();
        inventory.set_quantity(&milk, MAX_AMOUNT - 10.0).unwrap();
        let before = inventory.clone();
        let mut ledger = PurchaseLedger::new();

        // Each line fits on its own; together they overflow the ceiling.
        let err = ledger
            .create_purchase(
                &mut inventory,
                NewPurchase::new(
                    "Metro Supplier",
                    vec![
                        PurchaseLineRequest::new(&milk, 6.0, Money::from_cents(500)),
                        PurchaseLineRequest::new(&milk, 6.0, Money::from_cents(500)),
                    ],
                    buyer(),
                ),
            )
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation(ValidationError::TooLarge { .. })));
        assert_eq!(inventory, before);
        assert!(ledger.purchases().is_empty());

        let err = ledger
            .create_purchase(
                &mut inventory,
                NewPurchase::new(
                    "Metro Supplier",
                    vec![PurchaseLineRequest::new(&milk, 1e308, Money::from_cents(500))],
                    buyer(),
                ),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(inventory, before);
    }

    #[test]
    fn test_unknown_inventory_item_fails_closed() {
        let (mut inventory, milk) = setup();
        let before = inventory.clone();
        let mut ledger = PurchaseLedger::new();

        let err = ledger
            .create_purchase(
                &mut inventory,
                NewPurchase::new(
                    "Metro Supplier",
                    vec![
                        PurchaseLineRequest::new(&milk, 5.0, Money::from_cents(500)),
                        PurchaseLineRequest::new("missing", 1.0, Money::from_cents(500)),
                    ],
                    buyer(),
                ),
            )
            .unwrap_err();

        assert!(matches!(err, CoreError::InventoryItemNotFound(_)));
        assert_eq!(inventory, before);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_rejects_empty_and_invalid_purchases() {
        let (mut inventory, milk) = setup();
        let mut ledger = PurchaseLedger::new();

        let err = ledger
            .create_purchase(&mut inventory, NewPurchase::new("Metro", vec![], buyer()))
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyPurchase));

        let err = ledger
            .create_purchase(
                &mut inventory,
                NewPurchase::new(
                    " ",
                    vec![PurchaseLineRequest::new(&milk, 1.0, Money::from_cents(500))],
                    buyer(),
                ),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = ledger
            .create_purchase(
                &mut inventory,
                NewPurchase::new(
                    "Metro",
                    vec![PurchaseLineRequest::new(&milk, -2.0, Money::from_cents(500))],
                    buyer(),
                ),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_delete_does_not_reverse_inventory() {
        let (mut inventory, milk) = setup();
        let mut ledger = PurchaseLedger::new();
        let purchase = ledger
            .create_purchase(
                &mut inventory,
                NewPurchase::new(
                    "Metro",
                    vec![PurchaseLineRequest::new(&milk, 5.0, Money::from_cents(500))],
                    buyer(),
                ),
            )
            .unwrap();

        ledger.delete_purchase(&purchase.id).unwrap();
        assert!(ledger.get(&purchase.id).is_none());
        assert_eq!(inventory.get(&milk).unwrap().quantity, 15.0);
        assert!(matches!(
            ledger.delete_purchase(&purchase.id),
            Err(CoreError::PurchaseNotFound(_))
        ));
    }

    #[test]
    fn test_queries() {
        let (mut inventory, milk) = setup();
        let mut ledger = PurchaseLedger::new();
        for supplier in ["Metro Supplier", "Dairy Co", "metro supplier"] {
            ledger
                .create_purchase(
                    &mut inventory,
                    NewPurchase::new(
                        supplier,
                        vec![PurchaseLineRequest::new(&milk, 1.0, Money::from_cents(500))],
                        buyer(),
                    )
                    .with_notes("weekly"),
                )
                .unwrap();
        }

        assert_eq!(ledger.purchases_by_supplier("METRO SUPPLIER").len(), 2);
        assert_eq!(ledger.purchases_by_supplier("dairy co").len(), 1);
        assert!(ledger.purchases_by_supplier("Unknown").is_empty());

        let now = Utc::now();
        assert_eq!(ledger.purchases_between(now - Duration::minutes(1), now).len(), 3);
        assert!(ledger
            .purchases_between(now - Duration::days(2), now - Duration::days(1))
            .is_empty());
        assert_eq!(ledger.purchases()[0].notes.as_deref(), Some("weekly"));
    }
}
