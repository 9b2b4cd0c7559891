//! # Menu Catalog
//!
//! The sellable menu: items, their prices and size/flavor variants, their
//! stock counters, and the ordered list of categories shown as POS tabs.
//!
//! ## Stock Counter Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_item(stock: 50) ──► staff edits ──► set_stock(48)                 │
//! │                                              ▲                          │
//! │                                              │ order paid (× 2)         │
//! │  Order created ── no change ──► Order paid ──┘                          │
//! │                                                                         │
//! │  status() = Available iff stock > 0, recomputed on every read           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `set_stock` does not clamp. The order engine writes through it after
//! payment without re-checking, so a lost race between two orders shows up
//! as a negative counter rather than a rejected payment.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{IngredientUsage, MenuItem, VariantOption};
use crate::validation::{
    normalize_optional, validate_name, validate_positive_amount, validate_price, validate_stock,
    ValidationResult,
};

/// Categories a fresh install starts with, in tab order.
pub const DEFAULT_CATEGORIES: [&str; 6] = ["Coffee", "Waffle", "Beverage", "Soda", "Snack", "Rice Meal"];

// =============================================================================
// Category Set
// =============================================================================

/// Ordered set of category names: trimmed, non-empty, unique.
///
/// Deserializing an invalid list fails instead of silently repairing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CategorySet(Vec<String>);

impl CategorySet {
    /// Empty set.
    pub fn new() -> Self {
        CategorySet(Vec::new())
    }

    /// The first-run category tabs.
    pub fn with_defaults() -> Self {
        CategorySet(DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect())
    }

    /// Appends a category. Returns `false` if it was already present.
    pub fn insert(&mut self, name: &str) -> ValidationResult<bool> {
        let name = validate_name("category", name)?;
        if self.contains(&name) {
            return Ok(false);
        }
        self.0.push(name);
        Ok(true)
    }

    /// Removes a category. Returns `false` if it was not present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != name.trim());
        self.0.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for CategorySet {
    type Error = ValidationError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        let mut set = CategorySet::new();
        for name in names {
            let trimmed = validate_name("category", &name)?;
            if !set.insert(&trimmed)? {
                return Err(ValidationError::Duplicate {
                    field: "category".to_string(),
                    value: trimmed,
                });
            }
        }
        Ok(set)
    }
}

impl From<CategorySet> for Vec<String> {
    fn from(set: CategorySet) -> Self {
        set.0
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Fields for a new menu item. The catalog assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub name: String,
    pub category: String,
    pub price: Money,
    pub stock_quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sizes: Vec<VariantOption>,
    #[serde(default)]
    pub flavors: Vec<VariantOption>,
    #[serde(default)]
    pub ingredients: Vec<IngredientUsage>,
}

impl NewMenuItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: Money, stock_quantity: i64) -> Self {
        NewMenuItem {
            name: name.into(),
            category: category.into(),
            price,
            stock_quantity,
            description: None,
            sizes: Vec::new(),
            flavors: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_size(mut self, name: impl Into<String>, price: Money) -> Self {
        self.sizes.push(VariantOption::new(name, price));
        self
    }

    pub fn with_flavor(mut self, name: impl Into<String>, price: Money) -> Self {
        self.flavors.push(VariantOption::new(name, price));
        self
    }

    pub fn with_ingredient(mut self, ingredient_id: impl Into<String>, quantity_used: f64) -> Self {
        self.ingredients.push(IngredientUsage::new(ingredient_id, quantity_used));
        self
    }
}

/// Partial update for a menu item. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Money>,
    pub stock_quantity: Option<i64>,
    pub description: Option<String>,
    pub sizes: Option<Vec<VariantOption>>,
    pub flavors: Option<Vec<VariantOption>>,
    pub ingredients: Option<Vec<IngredientUsage>>,
}

fn validate_variants(field: &str, options: &[VariantOption]) -> ValidationResult<()> {
    for option in options {
        validate_name(field, &option.name)?;
        validate_price(field, option.price)?;
    }
    Ok(())
}

fn validate_ingredients(ingredients: &[IngredientUsage]) -> ValidationResult<()> {
    for usage in ingredients {
        validate_name("ingredient id", &usage.ingredient_id)?;
        validate_positive_amount("ingredient quantity", usage.quantity_used)?;
    }
    Ok(())
}

// =============================================================================
// Menu Catalog
// =============================================================================

/// The menu store. Persisted as one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
    categories: CategorySet,
}

impl MenuCatalog {
    /// Empty catalog with no categories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty catalog with the first-run category tabs.
    pub fn with_default_categories() -> Self {
        MenuCatalog {
            items: Vec::new(),
            categories: CategorySet::with_defaults(),
        }
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Adds a menu item and returns it with its assigned id.
    pub fn add_item(&mut self, new: NewMenuItem) -> CoreResult<MenuItem> {
        let name = validate_name("name", &new.name)?;
        let category = validate_name("category", &new.category)?;
        validate_price("price", new.price)?;
        validate_stock(new.stock_quantity)?;
        validate_variants("size", &new.sizes)?;
        validate_variants("flavor", &new.flavors)?;
        validate_ingredients(&new.ingredients)?;

        let now = Utc::now();
        let item = MenuItem {
            id: crate::generate_id(),
            name,
            category,
            price: new.price,
            stock_quantity: new.stock_quantity,
            description: normalize_optional(new.description),
            sizes: new.sizes,
            flavors: new.flavors,
            ingredients: new.ingredients,
            created_at: now,
            updated_at: now,
        };

        self.items.push(item.clone());
        Ok(item)
    }

    /// Inserts an item with a caller-chosen id (sample data, imports).
    /// Replaces any existing item with the same id.
    pub fn upsert_item(&mut self, item: MenuItem) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Merges the patch into the item and refreshes `updated_at`.
    pub fn update_item(&mut self, id: &str, patch: MenuItemPatch) -> CoreResult<MenuItem> {
        // Validate everything before touching the item.
        let name = patch.name.as_deref().map(|n| validate_name("name", n)).transpose()?;
        let category = patch
            .category
            .as_deref()
            .map(|c| validate_name("category", c))
            .transpose()?;
        if let Some(price) = patch.price {
            validate_price("price", price)?;
        }
        if let Some(stock) = patch.stock_quantity {
            validate_stock(stock)?;
        }
        if let Some(sizes) = &patch.sizes {
            validate_variants("size", sizes)?;
        }
        if let Some(flavors) = &patch.flavors {
            validate_variants("flavor", flavors)?;
        }
        if let Some(ingredients) = &patch.ingredients {
            validate_ingredients(ingredients)?;
        }

        let item = self.get_mut(id)?;
        if let Some(name) = name {
            item.name = name;
        }
        if let Some(category) = category {
            item.category = category;
        }
        if let Some(price) = patch.price {
            item.price = price;
        }
        if let Some(stock) = patch.stock_quantity {
            item.stock_quantity = stock;
        }
        if patch.description.is_some() {
            item.description = normalize_optional(patch.description);
        }
        if let Some(sizes) = patch.sizes {
            item.sizes = sizes;
        }
        if let Some(flavors) = patch.flavors {
            item.flavors = flavors;
        }
        if let Some(ingredients) = patch.ingredients {
            item.ingredients = ingredients;
        }
        item.updated_at = Utc::now();

        Ok(item.clone())
    }

    /// Removes the item. Orders keep their own name/price snapshot.
    pub fn delete_item(&mut self, id: &str) -> CoreResult<MenuItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| CoreError::MenuItemNotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    /// Sets the stock counter directly. Not clamped.
    pub fn set_stock(&mut self, id: &str, quantity: i64) -> CoreResult<MenuItem> {
        let item = self.get_mut(id)?;
        item.stock_quantity = quantity;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn get_mut(&mut self, id: &str) -> CoreResult<&mut MenuItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::MenuItemNotFound(id.to_string()))
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn items_in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a MenuItem> + 'a {
        self.items.iter().filter(move |i| i.category == category)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    /// Adds a category tab. Returns `false` if it already exists.
    pub fn add_category(&mut self, name: &str) -> CoreResult<bool> {
        Ok(self.categories.insert(name)?)
    }

    /// Removes a category tab; refused while any item still uses it.
    pub fn delete_category(&mut self, name: &str) -> CoreResult<bool> {
        let name = name.trim();
        let count = self.items.iter().filter(|i| i.category == name).count();
        if count > 0 {
            return Err(CoreError::CategoryInUse {
                category: name.to_string(),
                count,
            });
        }
        Ok(self.categories.remove(name))
    }

    /// Restores the first-run category tabs.
    pub fn reset_categories(&mut self) {
        self.categories = CategorySet::with_defaults();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MenuStatus;

    fn latte() -> NewMenuItem {
        NewMenuItem::new("Vanilla Latte", "Coffee", Money::from_cents(12000), 50)
            .with_description("Iced Coffee 22oz")
            .with_ingredient("beans", 0.02)
            .with_ingredient("milk", 0.15)
    }

    #[test]
    fn test_add_item_assigns_id_and_timestamps() {
        let mut catalog = MenuCatalog::with_default_categories();
        let item = catalog.add_item(latte()).unwrap();

        assert!(!item.id.is_empty());
        assert_eq!(item.created_at, item.updated_at);
        assert_eq!(item.status(), MenuStatus::Available);
        assert_eq!(catalog.get(&item.id), Some(&item));
    }

    #[test]
    fn test_add_item_rejects_invalid_fields() {
        let mut catalog = MenuCatalog::new();

        let blank = NewMenuItem::new("  ", "Coffee", Money::from_cents(100), 1);
        assert!(matches!(catalog.add_item(blank), Err(CoreError::Validation(_))));

        let negative = NewMenuItem::new("Soda", "Soda", Money::from_cents(-1), 1);
        assert!(catalog.add_item(negative).is_err());

        let bad_ingredient = latte().with_ingredient("ice", 0.0);
        assert!(catalog.add_item(bad_ingredient).is_err());

        assert!(catalog.is_empty());
    }

    #[test]
    fn test_update_item_merges_patch() {
        let mut catalog = MenuCatalog::new();
        let item = catalog.add_item(latte()).unwrap();

        let updated = catalog
            .update_item(
                &item.id,
                MenuItemPatch {
                    price: Some(Money::from_cents(13000)),
                    name: Some(" Vanilla Latte (Hot) ".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.price.cents(), 13000);
        assert_eq!(updated.name, "Vanilla Latte (Hot)");
        assert_eq!(updated.stock_quantity, 50);
        assert_eq!(updated.ingredients.len(), 2);
        assert!(updated.updated_at >= item.updated_at);
    }

    #[test]
    fn test_update_item_not_found() {
        let mut catalog = MenuCatalog::new();
        let err = catalog.update_item("missing", MenuItemPatch::default()).unwrap_err();
        assert!(matches!(err, CoreError::MenuItemNotFound(_)));
    }

    #[test]
    fn test_invalid_patch_leaves_item_unchanged() {
        let mut catalog = MenuCatalog::new();
        let item = catalog.add_item(latte()).unwrap();

        let result = catalog.update_item(
            &item.id,
            MenuItemPatch {
                name: Some("Renamed".into()),
                price: Some(Money::from_cents(-5)),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(catalog.get(&item.id).unwrap().name, "Vanilla Latte");
    }

    #[test]
    fn test_set_stock_recomputes_status_without_clamping() {
        let mut catalog = MenuCatalog::new();
        let item = catalog.add_item(latte()).unwrap();

        let item = catalog.set_stock(&item.id, 0).unwrap();
        assert_eq!(item.status(), MenuStatus::OutOfStock);

        let item = catalog.set_stock(&item.id, -3).unwrap();
        assert_eq!(item.stock_quantity, -3);
        assert_eq!(item.status(), MenuStatus::OutOfStock);

        let item = catalog.set_stock(&item.id, 4).unwrap();
        assert_eq!(item.status(), MenuStatus::Available);
    }

    #[test]
    fn test_delete_item() {
        let mut catalog = MenuCatalog::new();
        let item = catalog.add_item(latte()).unwrap();

        let removed = catalog.delete_item(&item.id).unwrap();
        assert_eq!(removed.id, item.id);
        assert!(catalog.get(&item.id).is_none());
        assert!(matches!(
            catalog.delete_item(&item.id),
            Err(CoreError::MenuItemNotFound(_))
        ));
    }

    #[test]
    fn test_items_in_category() {
        let mut catalog = MenuCatalog::with_default_categories();
        catalog.add_item(latte()).unwrap();
        catalog
            .add_item(NewMenuItem::new("Strawberry Waffle", "Waffle", Money::from_cents(6500), 10))
            .unwrap();

        let coffee: Vec<_> = catalog.items_in_category("Coffee").collect();
        assert_eq!(coffee.len(), 1);
        assert_eq!(coffee[0].name, "Vanilla Latte");
    }

    #[test]
    fn test_categories_default_and_add() {
        let mut catalog = MenuCatalog::with_default_categories();
        assert_eq!(catalog.categories().len(), 6);
        assert_eq!(catalog.categories().as_slice()[5], "Rice Meal");

        assert!(catalog.add_category("  Pastry ").unwrap());
        assert!(!catalog.add_category("Pastry").unwrap());
        assert!(catalog.add_category("   ").is_err());
        assert_eq!(catalog.categories().iter().last(), Some("Pastry"));
    }

    #[test]
    fn test_delete_category_in_use_is_rejected() {
        let mut catalog = MenuCatalog::with_default_categories();
        catalog.add_item(latte()).unwrap();

        let err = catalog.delete_category("Coffee").unwrap_err();
        assert!(matches!(err, CoreError::CategoryInUse { count: 1, .. }));
        assert!(catalog.categories().contains("Coffee"));

        assert!(catalog.delete_category("Soda").unwrap());
        assert!(!catalog.delete_category("Soda").unwrap());
    }

    #[test]
    fn test_reset_categories() {
        let mut catalog = MenuCatalog::new();
        catalog.add_category("Specials").unwrap();
        catalog.reset_categories();
        assert_eq!(catalog.categories(), &CategorySet::with_defaults());
    }

    #[test]
    fn test_category_set_rejects_invalid_lists_on_load() {
        let ok: CategorySet = serde_json::from_str(r#"["Coffee", " Snack "]"#).unwrap();
        assert_eq!(ok.as_slice(), ["Coffee".to_string(), "Snack".to_string()]);

        assert!(serde_json::from_str::<CategorySet>(r#"["Coffee", "Coffee"]"#).is_err());
        assert!(serde_json::from_str::<CategorySet>(r#"["Coffee", ""]"#).is_err());
    }

    #[test]
    fn test_catalog_snapshot_shape() {
        let mut catalog = MenuCatalog::with_default_categories();
        catalog.add_item(latte()).unwrap();

        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["categories"][0], "Coffee");
        assert_eq!(json["items"][0]["stockQuantity"], 50);

        let restored: MenuCatalog = serde_json::from_value(json).unwrap();
        assert_eq!(restored, catalog);
    }
}
