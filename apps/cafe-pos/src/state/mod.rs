//! # State Module
//!
//! Application state shared by every command.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                      App (lib.rs)                               │    │
//! │  │  App { config, stores, cart }                                   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                        │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐               │
//! │  │  StoreState  │  │  CartState   │  │   ConfigState    │               │
//! │  │              │  │              │  │                  │               │
//! │  │  Arc<Mutex<  │  │  Arc<Mutex<  │  │  store_name      │               │
//! │  │  CafeStores  │  │    Cart      │  │  currency        │               │
//! │  │  >> + writer │  │  >>          │  │  utc offset      │               │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘               │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • StoreState: one mutex over all four stores, one ordered writer       │
//! │  • CartState: Protected by Arc<Mutex<T>> for exclusive access           │
//! │  • ConfigState: Read-only after initialization                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod stores;
mod writer;

pub use cart::{line_id, Cart, CartItem, CartState, CartTotals};
pub use config::ConfigState;
pub use stores::{CafeStores, StoreKind, StoreState};
