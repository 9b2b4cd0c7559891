//! # Sample Café Data
//!
//! The starter menu and ingredient list used by the `seed` binary.
//!
//! Sample entries keep short fixed ids ("101", "20", ...) so that seeding
//! is a merge: entries already present are left untouched (the owner may
//! have changed prices or stock) and only missing ids are added.

use cafe_core::catalog::MenuCatalog;
use cafe_core::inventory::InventoryLedger;
use cafe_core::{CoreResult, IngredientUsage, InventoryItem, MenuItem, Money, VariantOption};
use chrono::{DateTime, Utc};

struct SampleMenuItem {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    /// Whole pesos.
    price: i64,
    stock: i64,
    description: &'static str,
    sizes: &'static [(&'static str, i64)],
    flavors: &'static [(&'static str, i64)],
    ingredients: &'static [(&'static str, f64)],
}

struct SampleIngredient {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    unit: &'static str,
    quantity: f64,
    min_quantity: f64,
    /// Centavos per unit.
    cost_cents: i64,
    supplier: &'static str,
}

/// Iced drinks share the same cup, straw and lid.
const COLD_CUP: [(&str, f64); 3] = [("70", 1.0), ("71", 1.0), ("72", 1.0)];

const MENU: &[SampleMenuItem] = &[
    SampleMenuItem {
        id: "101",
        name: "Almond Macchiato",
        category: "Coffee",
        price: 120,
        stock: 50,
        description: "Iced Coffee 22oz - Rich almond macchiato",
        sizes: &[],
        flavors: &[],
        ingredients: &[("1", 0.02), ("2", 0.15), ("11", 0.03), ("3", 0.2), COLD_CUP[0], COLD_CUP[1], COLD_CUP[2]],
    },
    SampleMenuItem {
        id: "102",
        name: "Vanilla Latte",
        category: "Coffee",
        price: 120,
        stock: 50,
        description: "Iced Coffee 22oz - Smooth vanilla latte",
        sizes: &[],
        flavors: &[],
        ingredients: &[("1", 0.02), ("2", 0.15), ("10", 0.03), ("3", 0.2), COLD_CUP[0], COLD_CUP[1], COLD_CUP[2]],
    },
    SampleMenuItem {
        id: "103",
        name: "Hazelnut Coffee",
        category: "Coffee",
        price: 120,
        stock: 50,
        description: "Iced Coffee 22oz - Aromatic hazelnut coffee",
        sizes: &[],
        flavors: &[],
        ingredients: &[("1", 0.02), ("2", 0.15), ("12", 0.03), ("3", 0.2), COLD_CUP[0], COLD_CUP[1], COLD_CUP[2]],
    },
    SampleMenuItem {
        id: "104",
        name: "Iced Chocolate",
        category: "Coffee",
        price: 100,
        stock: 50,
        description: "22oz - Creamy iced chocolate drink",
        sizes: &[],
        flavors: &[],
        ingredients: &[("2", 0.2), ("13", 0.04), ("3", 0.2), COLD_CUP[0], COLD_CUP[1], COLD_CUP[2]],
    },
    SampleMenuItem {
        id: "20",
        name: "Strawberry Waffle",
        category: "Waffle",
        price: 35,
        stock: 50,
        description: "Classic Waffles - Fresh strawberry topping",
        sizes: &[],
        flavors: &[],
        ingredients: &[("20", 0.1), ("21", 1.0), ("22", 0.01), ("23", 0.05), ("15", 0.02), ("73", 1.0)],
    },
    SampleMenuItem {
        id: "21",
        name: "Chocolate Waffle",
        category: "Waffle",
        price: 35,
        stock: 50,
        description: "Classic Waffles - Rich chocolate sauce",
        sizes: &[],
        flavors: &[],
        ingredients: &[("20", 0.1), ("21", 1.0), ("22", 0.01), ("13", 0.03), ("73", 1.0)],
    },
    SampleMenuItem {
        id: "22",
        name: "Caramel Waffle",
        category: "Waffle",
        price: 35,
        stock: 50,
        description: "Classic Waffles - Sweet caramel drizzle",
        sizes: &[],
        flavors: &[],
        ingredients: &[("20", 0.1), ("21", 1.0), ("22", 0.01), ("14", 0.03), ("73", 1.0)],
    },
    SampleMenuItem {
        id: "26",
        name: "Waffle Stick",
        category: "Waffle",
        price: 20,
        stock: 50,
        description: "Waffle on a stick",
        sizes: &[],
        flavors: &[("Creamy Cheese", 20), ("Hotdog", 30)],
        ingredients: &[("20", 0.08), ("21", 1.0), ("22", 0.01), ("43", 1.0), ("73", 1.0)],
    },
    SampleMenuItem {
        id: "7",
        name: "Fresh Lemon",
        category: "Beverage",
        price: 50,
        stock: 50,
        description: "Fresh Lemonade Series 22oz - Refreshing fresh lemon drink",
        sizes: &[],
        flavors: &[],
        ingredients: &[("34", 0.1), ("37", 0.02), ("3", 0.2), COLD_CUP[0], COLD_CUP[1], COLD_CUP[2]],
    },
    SampleMenuItem {
        id: "30",
        name: "Green Apple Soda",
        category: "Soda",
        price: 28,
        stock: 60,
        description: "Soda Fruit Series - Crisp green apple flavor",
        sizes: &[("16oz", 28), ("22oz", 38)],
        flavors: &[],
        ingredients: &[("30", 0.3), ("31", 0.02), ("3", 0.15), COLD_CUP[0], COLD_CUP[1], COLD_CUP[2]],
    },
    SampleMenuItem {
        id: "31",
        name: "Strawberry Soda",
        category: "Soda",
        price: 28,
        stock: 60,
        description: "Soda Fruit Series - Sweet strawberry fizz",
        sizes: &[("16oz", 28), ("22oz", 38)],
        flavors: &[],
        ingredients: &[("30", 0.3), ("31", 0.02), ("3", 0.15), COLD_CUP[0], COLD_CUP[1], COLD_CUP[2]],
    },
    SampleMenuItem {
        id: "40",
        name: "Chicken Poppers",
        category: "Rice Meal",
        price: 55,
        stock: 40,
        description: "Rice meal - Crispy chicken poppers",
        sizes: &[],
        flavors: &[
            ("With Gravy", 55),
            ("Cheese", 80),
            ("Honey Butter", 80),
            ("Sweet Chili", 80),
            ("Soy Garlic", 80),
        ],
        ingredients: &[("47", 0.15), ("60", 0.15), ("52", 0.05), ("73", 1.0), ("75", 1.0)],
    },
    SampleMenuItem {
        id: "65",
        name: "Baby Fries",
        category: "Snack",
        price: 35,
        stock: 60,
        description: "Small portion crispy fries",
        sizes: &[],
        flavors: &[],
        ingredients: &[("51", 0.2), ("52", 0.1), ("80", 0.005), ("73", 1.0)],
    },
];

const INGREDIENTS: &[SampleIngredient] = &[
    ingredient("1", "Coffee Beans", "Coffee", "kg", 5.0, 1.0, 85000, "Bean Roasters Co"),
    ingredient("2", "Fresh Milk", "Dairy", "liters", 20.0, 5.0, 9500, "Dairy Co"),
    ingredient("3", "Ice", "Other", "kg", 30.0, 10.0, 2000, "Ice Plant"),
    ingredient("10", "Vanilla Syrup", "Syrup", "liters", 2.0, 0.5, 45000, "Syrup Depot"),
    ingredient("11", "Almond Syrup", "Syrup", "liters", 2.0, 0.5, 45000, "Syrup Depot"),
    ingredient("12", "Hazelnut Syrup", "Syrup", "liters", 2.0, 0.5, 45000, "Syrup Depot"),
    ingredient("13", "Chocolate Syrup", "Syrup", "liters", 3.0, 0.5, 38000, "Syrup Depot"),
    ingredient("14", "Caramel Syrup", "Syrup", "liters", 2.0, 0.5, 42000, "Syrup Depot"),
    ingredient("15", "Strawberry Syrup", "Syrup", "liters", 2.0, 0.5, 40000, "Syrup Depot"),
    ingredient("20", "Waffle Mix", "Baking", "kg", 10.0, 2.0, 12000, "Metro Supplier"),
    ingredient("21", "Eggs", "Dairy", "pieces", 90.0, 30.0, 900, "Metro Supplier"),
    ingredient("22", "Butter", "Dairy", "kg", 2.0, 0.5, 48000, "Dairy Co"),
    ingredient("23", "Strawberries", "Produce", "kg", 2.0, 0.5, 35000, "Fruit Stand"),
    ingredient("30", "Soda Water", "Beverage", "liters", 24.0, 6.0, 4500, "Metro Supplier"),
    ingredient("31", "Flavor Syrup", "Syrup", "liters", 3.0, 0.5, 36000, "Syrup Depot"),
    ingredient("34", "Lemons", "Produce", "kg", 5.0, 1.0, 16000, "Fruit Stand"),
    ingredient("37", "Sugar", "Baking", "kg", 10.0, 2.0, 7500, "Metro Supplier"),
    ingredient("43", "Cheese", "Dairy", "pieces", 40.0, 10.0, 1200, "Dairy Co"),
    ingredient("47", "Chicken Poppers", "Meat", "kg", 8.0, 2.0, 32000, "Frozen Foods Inc"),
    ingredient("51", "Potato Fries", "Frozen", "kg", 10.0, 3.0, 18000, "Frozen Foods Inc"),
    ingredient("52", "Cooking Oil", "Other", "liters", 10.0, 2.0, 14000, "Metro Supplier"),
    ingredient("60", "Rice", "Grains", "kg", 25.0, 5.0, 5500, "Metro Supplier"),
    ingredient("70", "22oz Cup", "Packaging", "pieces", 500.0, 100.0, 450, "Packaging Plus"),
    ingredient("71", "Straw", "Packaging", "pieces", 500.0, 100.0, 50, "Packaging Plus"),
    ingredient("72", "Lid", "Packaging", "pieces", 500.0, 100.0, 150, "Packaging Plus"),
    ingredient("73", "Takeout Box", "Packaging", "pieces", 300.0, 50.0, 800, "Packaging Plus"),
    ingredient("75", "Fork", "Packaging", "pieces", 300.0, 50.0, 100, "Packaging Plus"),
    ingredient("80", "Salt", "Seasoning", "kg", 2.0, 0.5, 3000, "Metro Supplier"),
];

#[allow(clippy::too_many_arguments)]
const fn ingredient(
    id: &'static str,
    name: &'static str,
    category: &'static str,
    unit: &'static str,
    quantity: f64,
    min_quantity: f64,
    cost_cents: i64,
    supplier: &'static str,
) -> SampleIngredient {
    SampleIngredient {
        id,
        name,
        category,
        unit,
        quantity,
        min_quantity,
        cost_cents,
        supplier,
    }
}

fn variants(options: &[(&str, i64)]) -> Vec<VariantOption> {
    options
        .iter()
        .map(|(name, price)| VariantOption::new(*name, Money::from_major(*price)))
        .collect()
}

/// The sample menu, stamped with `now`.
pub fn sample_menu(now: DateTime<Utc>) -> Vec<MenuItem> {
    MENU.iter()
        .map(|s| MenuItem {
            id: s.id.to_string(),
            name: s.name.to_string(),
            category: s.category.to_string(),
            price: Money::from_major(s.price),
            stock_quantity: s.stock,
            description: Some(s.description.to_string()),
            sizes: variants(s.sizes),
            flavors: variants(s.flavors),
            ingredients: s
                .ingredients
                .iter()
                .map(|(id, qty)| IngredientUsage::new(*id, *qty))
                .collect(),
            created_at: now,
            updated_at: now,
        })
        .collect()
}

/// The sample ingredient list, stamped with `now`.
pub fn sample_inventory(now: DateTime<Utc>) -> Vec<InventoryItem> {
    INGREDIENTS
        .iter()
        .map(|s| InventoryItem {
            id: s.id.to_string(),
            name: s.name.to_string(),
            category: s.category.to_string(),
            unit: s.unit.to_string(),
            quantity: s.quantity,
            min_quantity: s.min_quantity,
            cost_per_unit: Money::from_cents(s.cost_cents),
            supplier: Some(s.supplier.to_string()),
            last_restocked: None,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

/// What a seeding pass added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub menu_items_added: usize,
    pub ingredients_added: usize,
    pub categories_added: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        *self == SeedSummary::default()
    }
}

/// Adds every sample entry whose id is not already present.
///
/// Existing entries are never overwritten. Categories used by the sample
/// menu are added to the catalog when missing.
pub fn seed_stores(catalog: &mut MenuCatalog, inventory: &mut InventoryLedger) -> CoreResult<SeedSummary> {
    let now = Utc::now();
    let mut summary = SeedSummary::default();

    for item in sample_menu(now) {
        if catalog.add_category(&item.category)? {
            summary.categories_added += 1;
        }
        if catalog.get(&item.id).is_none() {
            catalog.upsert_item(item);
            summary.menu_items_added += 1;
        }
    }

    for item in sample_inventory(now) {
        if inventory.get(&item.id).is_none() {
            inventory.upsert_item(item);
            summary.ingredients_added += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_core::catalog::MenuItemPatch;
    use std::collections::HashSet;

    #[test]
    fn test_every_recipe_ingredient_is_stocked() {
        let now = Utc::now();
        let stocked: HashSet<String> = sample_inventory(now).into_iter().map(|i| i.id).collect();

        for item in sample_menu(now) {
            for usage in &item.ingredients {
                assert!(
                    stocked.contains(&usage.ingredient_id),
                    "{} uses unknown ingredient {}",
                    item.name,
                    usage.ingredient_id
                );
            }
        }
    }

    #[test]
    fn test_sample_ids_are_unique() {
        let now = Utc::now();
        let menu: HashSet<String> = sample_menu(now).into_iter().map(|i| i.id).collect();
        let stock: HashSet<String> = sample_inventory(now).into_iter().map(|i| i.id).collect();
        assert_eq!(menu.len(), MENU.len());
        assert_eq!(stock.len(), INGREDIENTS.len());
    }

    #[test]
    fn test_seed_into_empty_stores() {
        let mut catalog = MenuCatalog::with_default_categories();
        let mut inventory = InventoryLedger::new();

        let summary = seed_stores(&mut catalog, &mut inventory).unwrap();
        assert_eq!(summary.menu_items_added, MENU.len());
        assert_eq!(summary.ingredients_added, INGREDIENTS.len());
        assert_eq!(summary.categories_added, 0);

        let latte = catalog.get("102").unwrap();
        assert_eq!(latte.price, Money::from_cents(12000));
        assert_eq!(latte.stock_quantity, 50);

        let soda = catalog.get("30").unwrap();
        assert_eq!(soda.price_for(Some("22oz"), None).unwrap(), Money::from_cents(3800));
    }

    #[test]
    fn test_seed_preserves_existing_entries() {
        let mut catalog = MenuCatalog::new();
        let mut inventory = InventoryLedger::new();
        seed_stores(&mut catalog, &mut inventory).unwrap();

        catalog
            .update_item(
                "102",
                MenuItemPatch {
                    price: Some(Money::from_cents(13500)),
                    ..Default::default()
                },
            )
            .unwrap();
        catalog.delete_item("65").unwrap();

        let summary = seed_stores(&mut catalog, &mut inventory).unwrap();
        assert_eq!(summary.menu_items_added, 1);
        assert_eq!(summary.ingredients_added, 0);
        assert_eq!(catalog.get("102").unwrap().price, Money::from_cents(13500));
        assert!(catalog.get("65").is_some());
    }

    #[test]
    fn test_seed_adds_missing_categories() {
        let mut catalog = MenuCatalog::new();
        let mut inventory = InventoryLedger::new();

        let summary = seed_stores(&mut catalog, &mut inventory).unwrap();
        assert_eq!(summary.categories_added, 6);
        assert!(catalog.categories().contains("Rice Meal"));

        let again = seed_stores(&mut catalog, &mut inventory).unwrap();
        assert!(again.is_empty());
    }
}
