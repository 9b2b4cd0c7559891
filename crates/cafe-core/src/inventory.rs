//! # Inventory Ledger
//!
//! Raw ingredient quantities and their reorder thresholds.
//!
//! ## Quantity Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Purchase created ──► increment(+20.0) ──┐                              │
//! │                                          ▼                              │
//! │                                   InventoryItem.quantity                │
//! │                                          │                              │
//! │  Order paid ──► decrement(usage × qty) ◄─┘  (may go below zero)         │
//! │                                                                         │
//! │  Stock take ──► set_quantity(12.5)                                      │
//! │                                                                         │
//! │  low_stock_items(): quantity <= min_quantity                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Decrements are not guarded: a sale is never refused because the ledger
//! thinks the café ran out of milk. The updated item is returned so the
//! caller can report a negative balance.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::InventoryItem;
use crate::validation::{
    normalize_optional, validate_amount, validate_name, validate_positive_amount, validate_price, MAX_AMOUNT,
};

// =============================================================================
// Inputs
// =============================================================================

/// Fields for a new ingredient. The ledger assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub name: String,
    pub category: String,
    pub unit: String,
    pub quantity: f64,
    pub min_quantity: f64,
    pub cost_per_unit: Money,
    #[serde(default)]
    pub supplier: Option<String>,
}

impl NewInventoryItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        unit: impl Into<String>,
        quantity: f64,
        min_quantity: f64,
        cost_per_unit: Money,
    ) -> Self {
        NewInventoryItem {
            name: name.into(),
            category: category.into(),
            unit: unit.into(),
            quantity,
            min_quantity,
            cost_per_unit,
            supplier: None,
        }
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }
}

/// Partial update for an ingredient. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<f64>,
    pub min_quantity: Option<f64>,
    pub cost_per_unit: Option<Money>,
    pub supplier: Option<String>,
}

// =============================================================================
// Inventory Ledger
// =============================================================================

/// The ingredient store. Persisted as one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLedger {
    items: Vec<InventoryItem>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, new: NewInventoryItem) -> CoreResult<InventoryItem> {
        let name = validate_name("name", &new.name)?;
        let category = validate_name("category", &new.category)?;
        let unit = validate_name("unit", &new.unit)?;
        validate_amount("quantity", new.quantity)?;
        validate_amount("minimum quantity", new.min_quantity)?;
        validate_price("cost per unit", new.cost_per_unit)?;

        let now = Utc::now();
        let item = InventoryItem {
            id: crate::generate_id(),
            name,
            category,
            unit,
            quantity: new.quantity,
            min_quantity: new.min_quantity,
            cost_per_unit: new.cost_per_unit,
            supplier: normalize_optional(new.supplier),
            last_restocked: None,
            created_at: now,
            updated_at: now,
        };

        self.items.push(item.clone());
        Ok(item)
    }

    /// Inserts an item with a caller-chosen id (sample data, imports).
    /// Replaces any existing item with the same id.
    pub fn upsert_item(&mut self, item: InventoryItem) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn update_item(&mut self, id: &str, patch: InventoryItemPatch) -> CoreResult<InventoryItem> {
        let name = patch.name.as_deref().map(|n| validate_name("name", n)).transpose()?;
        let category = patch
            .category
            .as_deref()
            .map(|c| validate_name("category", c))
            .transpose()?;
        let unit = patch.unit.as_deref().map(|u| validate_name("unit", u)).transpose()?;
        if let Some(quantity) = patch.quantity {
            validate_amount("quantity", quantity)?;
        }
        if let Some(min) = patch.min_quantity {
            validate_amount("minimum quantity", min)?;
        }
        if let Some(cost) = patch.cost_per_unit {
            validate_price("cost per unit", cost)?;
        }

        let item = self.get_mut(id)?;
        if let Some(name) = name {
            item.name = name;
        }
        if let Some(category) = category {
            item.category = category;
        }
        if let Some(unit) = unit {
            item.unit = unit;
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(min) = patch.min_quantity {
            item.min_quantity = min;
        }
        if let Some(cost) = patch.cost_per_unit {
            item.cost_per_unit = cost;
        }
        if patch.supplier.is_some() {
            item.supplier = normalize_optional(patch.supplier);
        }
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    pub fn delete_item(&mut self, id: &str) -> CoreResult<InventoryItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| CoreError::InventoryItemNotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Adds received stock and stamps `last_restocked`.
    ///
    /// The new on-hand amount may not exceed `MAX_AMOUNT`.
    pub fn increment(&mut self, id: &str, quantity: f64) -> CoreResult<InventoryItem> {
        validate_positive_amount("quantity", quantity)?;

        let item = self.get_mut(id)?;
        let total = item.quantity + quantity;
        if total > MAX_AMOUNT {
            return Err(ValidationError::TooLarge {
                field: format!("{} on hand", item.name),
            }
            .into());
        }

        let now = Utc::now();
        item.quantity = total;
        item.last_restocked = Some(now);
        item.updated_at = now;
        Ok(item.clone())
    }

    /// Removes consumed stock. The result may be negative, but never
    /// leaves the finite range.
    pub fn decrement(&mut self, id: &str, quantity: f64) -> CoreResult<InventoryItem> {
        let item = self.get_mut(id)?;
        let remaining = item.quantity - quantity;
        if !remaining.is_finite() {
            return Err(ValidationError::InvalidFormat {
                field: format!("{} on hand", item.name),
                reason: "must be a finite number".to_string(),
            }
            .into());
        }
        item.quantity = remaining;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    /// Overwrites the on-hand amount after a physical count.
    pub fn set_quantity(&mut self, id: &str, quantity: f64) -> CoreResult<InventoryItem> {
        validate_amount("quantity", quantity)?;

        let item = self.get_mut(id)?;
        item.quantity = quantity;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    pub fn get(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn get_mut(&mut self, id: &str) -> CoreResult<&mut InventoryItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::InventoryItemNotFound(id.to_string()))
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items at or below their minimum, in ledger order.
    pub fn low_stock_items(&self) -> Vec<&InventoryItem> {
        self.items.iter().filter(|i| i.is_low_stock()).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> NewInventoryItem {
        NewInventoryItem::new("Fresh Milk", "Dairy", "liters", 10.0, 3.0, Money::from_cents(9500))
            .with_supplier("Dairy Co")
    }

    #[test]
    fn test_add_item() {
        let mut ledger = InventoryLedger::new();
        let item = ledger.add_item(milk()).unwrap();

        assert_eq!(item.name, "Fresh Milk");
        assert_eq!(item.supplier.as_deref(), Some("Dairy Co"));
        assert!(item.last_restocked.is_none());
        assert_eq!(ledger.items().len(), 1);
    }

    #[test]
    fn test_add_item_rejects_negative_quantity() {
        let mut ledger = InventoryLedger::new();
        let mut bad = milk();
        bad.quantity = -1.0;
        assert!(matches!(ledger.add_item(bad), Err(CoreError::Validation(_))));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_quantities_stay_finite() {
        let mut ledger = InventoryLedger::new();
        let mut huge = milk();
        huge.quantity = 1e308;
        assert!(matches!(ledger.add_item(huge), Err(CoreError::Validation(_))));

        let mut full = milk();
        full.quantity = MAX_AMOUNT;
        let item = ledger.add_item(full).unwrap();

        let err = ledger.increment(&item.id, 1.0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::TooLarge { .. })));
        assert!(ledger.increment(&item.id, 1e308).is_err());
        assert_eq!(ledger.get(&item.id).unwrap().quantity, MAX_AMOUNT);
        assert!(ledger.get(&item.id).unwrap().last_restocked.is_none());

        assert!(ledger.decrement(&item.id, f64::INFINITY).is_err());
        assert_eq!(ledger.get(&item.id).unwrap().quantity, MAX_AMOUNT);
    }

    #[test]
    fn test_increment_stamps_last_restocked() {
        let mut ledger = InventoryLedger::new();
        let item = ledger.add_item(milk()).unwrap();

        let item = ledger.increment(&item.id, 20.0).unwrap();
        assert_eq!(item.quantity, 30.0);
        assert!(item.last_restocked.is_some());

        assert!(ledger.increment(&item.id, 0.0).is_err());
        assert!(matches!(
            ledger.increment("missing", 1.0),
            Err(CoreError::InventoryItemNotFound(_))
        ));
    }

    #[test]
    fn test_decrement_is_unguarded() {
        let mut ledger = InventoryLedger::new();
        let item = ledger.add_item(milk()).unwrap();

        let item = ledger.decrement(&item.id, 4.5).unwrap();
        assert!((item.quantity - 5.5).abs() < 1e-9);

        let item = ledger.decrement(&item.id, 6.0).unwrap();
        assert!(item.quantity < 0.0);
        assert!(item.last_restocked.is_none());
    }

    #[test]
    fn test_set_quantity() {
        let mut ledger = InventoryLedger::new();
        let item = ledger.add_item(milk()).unwrap();

        assert_eq!(ledger.set_quantity(&item.id, 2.5).unwrap().quantity, 2.5);
        assert!(ledger.set_quantity(&item.id, -1.0).is_err());
        assert_eq!(ledger.get(&item.id).unwrap().quantity, 2.5);
    }

    #[test]
    fn test_update_and_delete() {
        let mut ledger = InventoryLedger::new();
        let item = ledger.add_item(milk()).unwrap();

        let updated = ledger
            .update_item(
                &item.id,
                InventoryItemPatch {
                    min_quantity: Some(12.0),
                    supplier: Some("  ".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.min_quantity, 12.0);
        assert!(updated.supplier.is_none());

        ledger.delete_item(&item.id).unwrap();
        assert!(ledger.get(&item.id).is_none());
    }

    #[test]
    fn test_low_stock_items_inclusive_threshold() {
        let mut ledger = InventoryLedger::new();
        let milk = ledger.add_item(milk()).unwrap();
        let cups = ledger
            .add_item(NewInventoryItem::new("22oz Cup", "Packaging", "pieces", 100.0, 50.0, Money::from_cents(300)))
            .unwrap();

        assert!(ledger.low_stock_items().is_empty());

        ledger.set_quantity(&milk.id, 3.0).unwrap();
        let low: Vec<_> = ledger.low_stock_items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(low, vec![milk.id.clone()]);

        ledger.decrement(&cups.id, 60.0).unwrap();
        assert_eq!(ledger.low_stock_items().len(), 2);
    }
}
