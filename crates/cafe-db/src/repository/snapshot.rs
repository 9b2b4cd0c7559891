//! # Snapshot Repository
//!
//! Loads and saves whole stores as JSON documents, one row per namespace.
//!
//! ## Storage Layout
//! ```text
//! store_snapshots
//! ┌────────────────────┬──────────────────────────────┬─────────┬────────────┐
//! │ namespace (PK)     │ payload                      │ version │ updated_at │
//! ├────────────────────┼──────────────────────────────┼─────────┼────────────┤
//! │ menu-storage       │ {"items":[...],"categories"} │ 14      │ 2026-...   │
//! │ inventory-storage  │ {"items":[...]}              │ 9       │ 2026-...   │
//! │ order-storage      │ {"orders":[...]}             │ 31      │ 2026-...   │
//! │ purchase-storage   │ {"purchases":[...]}          │ 3       │ 2026-...   │
//! └────────────────────┴──────────────────────────────┴─────────┴────────────┘
//! ```
//!
//! A save replaces the whole payload. There is no cross-namespace
//! transaction: a payment that touches three stores issues three saves.

use cafe_core::catalog::MenuCatalog;
use cafe_core::inventory::InventoryLedger;
use cafe_core::orders::OrderBook;
use cafe_core::purchases::PurchaseLedger;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

// =============================================================================
// Persisted Stores
// =============================================================================

/// A store that is persisted as a single snapshot under a fixed key.
pub trait PersistedStore: Serialize + DeserializeOwned {
    /// Key of the store's row in `store_snapshots`.
    const NAMESPACE: &'static str;
}

impl PersistedStore for MenuCatalog {
    const NAMESPACE: &'static str = "menu-storage";
}

impl PersistedStore for InventoryLedger {
    const NAMESPACE: &'static str = "inventory-storage";
}

impl PersistedStore for OrderBook {
    const NAMESPACE: &'static str = "order-storage";
}

impl PersistedStore for PurchaseLedger {
    const NAMESPACE: &'static str = "purchase-storage";
}

/// Raw row from `store_snapshots`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    pub namespace: String,
    pub payload: String,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for store snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Loads and decodes a store. `Ok(None)` when it was never saved.
    pub async fn load<S: PersistedStore>(&self) -> DbResult<Option<S>> {
        match self.load_raw(S::NAMESPACE).await? {
            Some(row) => {
                debug!(namespace = S::NAMESPACE, version = row.version, "Loaded snapshot");
                Ok(Some(serde_json::from_str(&row.payload)?))
            }
            None => Ok(None),
        }
    }

    /// Encodes and saves a store. Returns the new version number.
    pub async fn save<S: PersistedStore>(&self, store: &S) -> DbResult<i64> {
        let payload = serde_json::to_string(store)?;
        self.save_raw(S::NAMESPACE, &payload).await
    }

    pub async fn load_raw(&self, namespace: &str) -> DbResult<Option<SnapshotRow>> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT namespace, payload, version, updated_at
            FROM store_snapshots
            WHERE namespace = ?1
            "#,
        )
        .bind(namespace)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Upserts an already-encoded payload.
    ///
    /// Used by the app, which encodes under its state lock and writes
    /// from its snapshot writer task.
    pub async fn save_raw(&self, namespace: &str, payload: &str) -> DbResult<i64> {
        let version: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO store_snapshots (namespace, payload, version, updated_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(namespace) DO UPDATE SET
                payload = excluded.payload,
                version = store_snapshots.version + 1,
                updated_at = excluded.updated_at
            RETURNING version
            "#,
        )
        .bind(namespace)
        .bind(payload)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(namespace, version, bytes = payload.len(), "Saved snapshot");
        Ok(version)
    }

    /// Removes a namespace. Returns whether a row existed.
    pub async fn delete(&self, namespace: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM store_snapshots WHERE namespace = ?1")
            .bind(namespace)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Namespaces that currently have a snapshot, sorted.
    pub async fn namespaces(&self) -> DbResult<Vec<String>> {
        let names = sqlx::query_scalar("SELECT namespace FROM store_snapshots ORDER BY namespace")
            .fetch_all(&self.pool)
            .await?;

        Ok(names)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use cafe_core::catalog::NewMenuItem;
    use cafe_core::inventory::NewInventoryItem;
    use cafe_core::Money;

    async fn repo() -> SnapshotRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().snapshots()
    }

    #[tokio::test]
    async fn test_load_missing_store() {
        let repo = repo().await;
        let catalog: Option<MenuCatalog> = repo.load().await.unwrap();
        assert!(catalog.is_none());
        assert!(repo.namespaces().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_catalog() {
        let repo = repo().await;
        let mut catalog = MenuCatalog::with_default_categories();
        catalog
            .add_item(NewMenuItem::new("Vanilla Latte", "Coffee", Money::from_cents(12000), 50))
            .unwrap();

        assert_eq!(repo.save(&catalog).await.unwrap(), 1);

        let loaded: MenuCatalog = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded, catalog);
    }

    #[tokio::test]
    async fn test_save_bumps_version_and_replaces_payload() {
        let repo = repo().await;
        let mut inventory = InventoryLedger::new();
        assert_eq!(repo.save(&inventory).await.unwrap(), 1);

        inventory
            .add_item(NewInventoryItem::new("Milk", "Dairy", "liters", 10.0, 3.0, Money::from_cents(9500)))
            .unwrap();
        assert_eq!(repo.save(&inventory).await.unwrap(), 2);

        let row = repo.load_raw(InventoryLedger::NAMESPACE).await.unwrap().unwrap();
        assert_eq!(row.version, 2);
        assert!(row.payload.contains("Milk"));

        let loaded: InventoryLedger = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded.items().len(), 1);
    }

    #[tokio::test]
    async fn test_namespaces_are_independent() {
        let repo = repo().await;
        repo.save(&OrderBook::new()).await.unwrap();
        repo.save(&PurchaseLedger::new()).await.unwrap();

        assert_eq!(
            repo.namespaces().await.unwrap(),
            vec!["order-storage".to_string(), "purchase-storage".to_string()]
        );

        assert!(repo.delete(OrderBook::NAMESPACE).await.unwrap());
        assert!(!repo.delete(OrderBook::NAMESPACE).await.unwrap());
        assert!(repo.load::<OrderBook>().await.unwrap().is_none());
        assert!(repo.load::<PurchaseLedger>().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_serialization_error() {
        let repo = repo().await;
        repo.save_raw(MenuCatalog::NAMESPACE, "{\"items\": 42}").await.unwrap();

        let err = repo.load::<MenuCatalog>().await.unwrap_err();
        assert!(matches!(err, DbError::Serialization(_)));
    }
}
