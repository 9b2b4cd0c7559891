//! # cafe-db: Persistence Layer for Cafe POS
//!
//! Keeps the four café stores in a local SQLite file, one JSON snapshot
//! per store, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cafe POS Data Flow                               │
//! │                                                                         │
//! │  App command (create_purchase)                                          │
//! │       │ mutates stores in memory, then spawns snapshot writes          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cafe-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ (snapshot.rs)  │    │  (embedded)  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   sample.rs: starter menu + ingredients for the seed binary     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/cafe-pos/cafe.db                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Snapshot repository and the `PersistedStore` trait
//! - [`sample`] - Sample café data
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cafe_core::catalog::MenuCatalog;
//! use cafe_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("cafe.db")).await?;
//! let catalog: MenuCatalog = db.snapshots().load().await?.unwrap_or_default();
//! db.snapshots().save(&catalog).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sample;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::snapshot::{PersistedStore, SnapshotRepository, SnapshotRow};
