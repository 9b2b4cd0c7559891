//! # Repository Module
//!
//! Database repositories for the café stores.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  App command (e.g. mark_paid)                                          │
//! │       │                                                                 │
//! │       │  db.snapshots().save_raw("order-storage", json)                │
//! │       ▼                                                                 │
//! │  SnapshotRepository                                                    │
//! │  ├── load::<S>() / save(&S)      typed, via PersistedStore             │
//! │  ├── load_raw / save_raw         pre-encoded payloads                  │
//! │  └── delete / namespaces                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store_snapshots table                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SnapshotRepository`](snapshot::SnapshotRepository) - Whole-store JSON snapshots

pub mod snapshot;
