//! # Sample Data Seeder
//!
//! Loads the sample café menu and ingredient list into a database.
//!
//! ## Usage
//! ```bash
//! # Seed the development database
//! cargo run -p cafe-db --bin seed
//!
//! # Specify database path
//! cargo run -p cafe-db --bin seed -- --db ./data/cafe.db
//! ```
//!
//! Seeding merges: items the database already has (by id) are left as
//! they are, so running it twice is harmless.

use std::env;

use cafe_core::catalog::MenuCatalog;
use cafe_core::inventory::InventoryLedger;
use cafe_db::sample::seed_stores;
use cafe_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cafe_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Cafe POS Sample Data Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cafe_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Cafe POS Sample Data Seeder");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let snapshots = db.snapshots();
    let mut catalog = snapshots
        .load::<MenuCatalog>()
        .await?
        .unwrap_or_else(MenuCatalog::with_default_categories);
    let mut inventory = snapshots.load::<InventoryLedger>().await?.unwrap_or_default();

    println!(
        "  Existing: {} menu items, {} ingredients",
        catalog.items().len(),
        inventory.items().len()
    );

    let summary = seed_stores(&mut catalog, &mut inventory)?;
    if summary.is_empty() {
        println!("⚠ Sample data already present, nothing to add.");
        return Ok(());
    }

    snapshots.save(&catalog).await?;
    snapshots.save(&inventory).await?;

    println!();
    println!("✓ Added {} menu items", summary.menu_items_added);
    println!("✓ Added {} ingredients", summary.ingredients_added);
    if summary.categories_added > 0 {
        println!("✓ Added {} categories", summary.categories_added);
    }

    let low = inventory.low_stock_items();
    if !low.is_empty() {
        println!();
        println!("⚠ {} ingredients start at or below their minimum:", low.len());
        for item in low {
            println!("  - {} ({} {})", item.name, item.quantity, item.unit);
        }
    }

    db.close().await;
    println!();
    println!("Done.");
    Ok(())
}
