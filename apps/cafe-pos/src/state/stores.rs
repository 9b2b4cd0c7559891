//! # Store State
//!
//! The four café stores behind one lock, plus background persistence.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  mark_paid command                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock ─► orders.mark_paid(&mut catalog, &mut inventory) ─► Ok           │
//! │       │                                                                 │
//! │       ├── encode touched stores (menu, inventory, orders) to JSON       │
//! │       ├── enqueue on the snapshot writer (still under the lock)         │
//! │       ▼                                                                 │
//! │  unlock                       writer task ─► save_raw(...) in order     │
//! │                                                 │                       │
//! │                                                 └── on error: warn!,    │
//! │                                                     the change stays    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A single mutex covers all four stores so a payment sees the catalog
//! and the inventory it deducts from in one consistent state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cafe_core::catalog::MenuCatalog;
use cafe_core::inventory::InventoryLedger;
use cafe_core::orders::OrderBook;
use cafe_core::purchases::PurchaseLedger;
use cafe_db::{Database, DbResult, PersistedStore};
use tracing::{debug, info, warn};

use super::writer::{Payloads, SnapshotWriter};

/// Identifies one persisted store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Menu,
    Inventory,
    Orders,
    Purchases,
}

impl StoreKind {
    pub const ALL: [StoreKind; 4] = [
        StoreKind::Menu,
        StoreKind::Inventory,
        StoreKind::Orders,
        StoreKind::Purchases,
    ];

    pub fn namespace(&self) -> &'static str {
        match self {
            StoreKind::Menu => MenuCatalog::NAMESPACE,
            StoreKind::Inventory => InventoryLedger::NAMESPACE,
            StoreKind::Orders => OrderBook::NAMESPACE,
            StoreKind::Purchases => PurchaseLedger::NAMESPACE,
        }
    }
}

/// The four stores the café runs on.
#[derive(Debug, Clone, Default)]
pub struct CafeStores {
    pub catalog: MenuCatalog,
    pub inventory: InventoryLedger,
    pub orders: OrderBook,
    pub purchases: PurchaseLedger,
}

impl CafeStores {
    /// Fresh stores for a first run: empty, with the default category tabs.
    pub fn first_run() -> Self {
        CafeStores {
            catalog: MenuCatalog::with_default_categories(),
            ..CafeStores::default()
        }
    }

    fn encode(&self, kind: StoreKind) -> serde_json::Result<String> {
        match kind {
            StoreKind::Menu => serde_json::to_string(&self.catalog),
            StoreKind::Inventory => serde_json::to_string(&self.inventory),
            StoreKind::Orders => serde_json::to_string(&self.orders),
            StoreKind::Purchases => serde_json::to_string(&self.purchases),
        }
    }
}

/// Shared store state.
///
/// Cloning shares the same stores and database.
#[derive(Debug, Clone)]
pub struct StoreState {
    stores: Arc<Mutex<CafeStores>>,
    writer: Option<SnapshotWriter>,
}

impl StoreState {
    /// In-memory stores with no persistence (tests, demos).
    pub fn new(stores: CafeStores) -> Self {
        StoreState {
            stores: Arc::new(Mutex::new(stores)),
            writer: None,
        }
    }

    /// Stores that write a snapshot after every change.
    ///
    /// Spawns the snapshot writer, so it must be called inside a Tokio
    /// runtime.
    pub fn with_database(stores: CafeStores, db: Database) -> Self {
        StoreState {
            stores: Arc::new(Mutex::new(stores)),
            writer: Some(SnapshotWriter::spawn(db)),
        }
    }

    /// Loads every store from the database.
    ///
    /// ## Startup Steps
    /// 1. Missing stores start empty; a missing catalog gets the default
    ///    category tabs
    /// 2. Orders that are paid but not completed are repaired and the
    ///    repaired order store is written back
    ///
    /// A payload that fails to decode aborts startup rather than being
    /// overwritten by an empty store.
    pub async fn load(db: Database) -> DbResult<Self> {
        let snapshots = db.snapshots();

        let catalog = match snapshots.load::<MenuCatalog>().await? {
            Some(catalog) => catalog,
            None => {
                info!("No saved menu, starting with default categories");
                MenuCatalog::with_default_categories()
            }
        };
        let inventory = snapshots.load::<InventoryLedger>().await?.unwrap_or_default();
        let mut orders = snapshots.load::<OrderBook>().await?.unwrap_or_default();
        let purchases = snapshots.load::<PurchaseLedger>().await?.unwrap_or_default();

        let repaired = orders.fix_inconsistent_orders();
        if repaired > 0 {
            warn!(repaired, "Repaired paid orders that were not completed");
            snapshots.save(&orders).await?;
        }

        info!(
            menu_items = catalog.items().len(),
            ingredients = inventory.items().len(),
            orders = orders.len(),
            purchases = purchases.purchases().len(),
            "Stores loaded"
        );

        Ok(StoreState::with_database(
            CafeStores {
                catalog,
                inventory,
                orders,
                purchases,
            },
            db,
        ))
    }

    fn lock(&self) -> MutexGuard<'_, CafeStores> {
        self.stores.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the stores.
    pub fn with_stores<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CafeStores) -> R,
    {
        let stores = self.lock();
        f(&stores)
    }

    /// Executes a fallible mutation and persists the `touched` stores if
    /// it succeeds.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let order = stores.mutate(&[StoreKind::Orders], |s| {
    ///     s.orders.create_order(&s.catalog, new)
    /// })?;
    /// ```
    pub fn mutate<F, R, E>(&self, touched: &[StoreKind], f: F) -> Result<R, E>
    where
        F: FnOnce(&mut CafeStores) -> Result<R, E>,
    {
        let mut stores = self.lock();
        let result = f(&mut stores)?;
        if let Some(writer) = &self.writer {
            writer.enqueue(encode_all(&stores, touched));
        }
        Ok(result)
    }

    /// Writes every store, waiting until all earlier saves are done too.
    pub async fn flush(&self) -> DbResult<()> {
        let Some(writer) = &self.writer else {
            return Ok(());
        };
        let done = {
            let stores = self.lock();
            writer.flush(encode_all(&stores, &StoreKind::ALL))
        };
        done.await?;
        debug!("All stores flushed");
        Ok(())
    }
}

fn encode_all(stores: &CafeStores, kinds: &[StoreKind]) -> Payloads {
    kinds
        .iter()
        .filter_map(|kind| match stores.encode(*kind) {
            Ok(payload) => Some((kind.namespace(), payload)),
            Err(e) => {
                warn!(namespace = kind.namespace(), error = %e, "Failed to encode store snapshot");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_core::catalog::NewMenuItem;
    use cafe_core::orders::{NewOrder, OrderLineRequest};
    use cafe_core::{Actor, CoreError, Money, OrderStatus, PaymentMethod};
    use cafe_db::DbConfig;
    use std::time::Duration;

    fn latte_stores() -> (CafeStores, String) {
        let mut stores = CafeStores::first_run();
        let latte = stores
            .catalog
            .add_item(NewMenuItem::new("Vanilla Latte", "Coffee", Money::from_cents(12000), 5))
            .unwrap();
        (stores, latte.id)
    }

    #[test]
    fn test_failed_mutation_returns_error() {
        let (stores, latte) = latte_stores();
        let state = StoreState::new(stores);

        let result: Result<_, CoreError> = state.mutate(&[StoreKind::Orders], |s| {
            s.orders.create_order(
                &s.catalog,
                NewOrder::new(
                    vec![OrderLineRequest::new(&latte, 10)],
                    PaymentMethod::Cash,
                    Actor::new("u1", "Ana"),
                ),
            )
        });

        assert!(matches!(result, Err(CoreError::InsufficientStock { .. })));
        assert!(state.with_stores(|s| s.orders.is_empty()));
    }

    #[test]
    fn test_clones_share_stores() {
        let (stores, latte) = latte_stores();
        let state = StoreState::new(stores);
        let other = state.clone();

        other
            .mutate(&[StoreKind::Menu], |s| s.catalog.set_stock(&latte, 9))
            .unwrap();
        assert_eq!(state.with_stores(|s| s.catalog.get(&latte).unwrap().stock_quantity), 9);
    }

    #[tokio::test]
    async fn test_mutation_is_persisted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (stores, latte) = latte_stores();
        let state = StoreState::with_database(stores, db.clone());

        state
            .mutate(&[StoreKind::Menu], |s| s.catalog.set_stock(&latte, 42))
            .unwrap();

        // The write runs on the writer task.
        let mut saved = None;
        for _ in 0..50 {
            saved = db.snapshots().load::<MenuCatalog>().await.unwrap();
            if saved.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(saved.unwrap().get(&latte).unwrap().stock_quantity, 42);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_rapid_mutations_land_in_order() {
        let path = std::env::temp_dir().join(format!("cafe-pos-{}.db", cafe_core::generate_id()));
        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let (stores, latte) = latte_stores();
        let state = StoreState::with_database(stores, db.clone());

        for round in 0..5 {
            for stock in 0..50 {
                state
                    .mutate(&[StoreKind::Menu], |s| s.catalog.set_stock(&latte, round * 100 + stock))
                    .unwrap();
            }

            // Nothing new to write: only waits for the queued saves.
            state.writer.as_ref().unwrap().flush(Vec::new()).await.unwrap();

            let saved: MenuCatalog = db.snapshots().load().await.unwrap().unwrap();
            assert_eq!(saved.get(&latte).unwrap().stock_quantity, round * 100 + 49);
        }

        db.close().await;
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_load_first_run_and_repair() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let state = StoreState::load(db.clone()).await.unwrap();
        assert_eq!(state.with_stores(|s| s.catalog.categories().len()), 6);

        // A paid order that never reached completed, as left by an older build.
        let (stores, latte) = latte_stores();
        let seeded = StoreState::with_database(stores, db.clone());
        let order = seeded
            .mutate(&[], |s| {
                s.orders.create_order(
                    &s.catalog,
                    NewOrder::new(
                        vec![OrderLineRequest::new(&latte, 1)],
                        PaymentMethod::Cash,
                        Actor::new("u1", "Ana"),
                    ),
                )
            })
            .unwrap();
        let mut orders = seeded.with_stores(|s| s.orders.orders().to_vec());
        orders[0].is_paid = true;
        orders[0].status = OrderStatus::Served;
        let mut book = OrderBook::new();
        book.replace_all(orders);
        db.snapshots().save(&book).await.unwrap();

        let reloaded = StoreState::load(db.clone()).await.unwrap();
        let status = reloaded.with_stores(|s| s.orders.get(&order.id).unwrap().status);
        assert_eq!(status, OrderStatus::Completed);

        let saved: OrderBook = db.snapshots().load().await.unwrap().unwrap();
        assert_eq!(saved.get(&order.id).unwrap().status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_flush_writes_every_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = StoreState::with_database(CafeStores::first_run(), db.clone());

        state.flush().await.unwrap();
        assert_eq!(db.snapshots().namespaces().await.unwrap().len(), 4);
    }
}
