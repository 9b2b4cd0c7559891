//! # Cafe POS Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cafe POS                                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Mobile UI                                   │  │
//! │  │  • POS grid / cart       • Orders & payment                      │  │
//! │  │  • Inventory & purchases • Dashboard & sales report              │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                     {"command": ..., "args": ...}  (stdin / stdout)     │
//! │  ┌──────────────────────────────▼───────────────────────────────────┐  │
//! │  │                    Rust Backend (this crate)                     │  │
//! │  │                                                                  │  │
//! │  │  main.rs ────► Starts the runtime                               │  │
//! │  │  lib.rs ─────► Logging, database, state, request loop           │  │
//! │  │  commands/ ──► create_order, mark_order_paid, get_dashboard ... │  │
//! │  │  state/ ─────► StoreState, CartState, ConfigState               │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │  ┌──────────────────────────────▼───────────────────────────────────┐  │
//! │  │                         SQLite Database                          │  │
//! │  │  cafe.db (local file, WAL mode, one JSON snapshot per store)     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The actual setup is in lib.rs for better testability
    cafe_pos::run().await
}
