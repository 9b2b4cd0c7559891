//! # Cafe POS Library
//!
//! The application shell for the café point of sale: state, commands and
//! startup. The UI talks to it one JSON request per line on stdin and
//! reads one JSON response per line on stdout. Logs go to stderr.
//!
//! ## Module Organization
//! ```text
//! cafe_pos/
//! ├── lib.rs          ◄─── You are here (startup & request loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── stores.rs   ◄─── The four stores + snapshot persistence
//! │   ├── cart.rs     ◄─── Cart state management
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── mod.rs      ◄─── Request routing
//! │   ├── menu.rs     ◄─── Menu and category commands
//! │   ├── inventory.rs◄─── Ingredient commands
//! │   ├── order.rs    ◄─── Order lifecycle commands
//! │   ├── purchase.rs ◄─── Supplier purchase commands
//! │   ├── report.rs   ◄─── Dashboard and sales report
//! │   ├── cart.rs     ◄─── Cart manipulation commands
//! │   └── config.rs   ◄─── Configuration retrieval
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod state;

use directories::ProjectDirs;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cafe_db::sample::seed_stores;
use cafe_db::{Database, DbConfig};
use commands::{Request, Response};
use error::ApiError;
use state::{CartState, ConfigState, StoreKind, StoreState};

/// Everything a command can ask for.
#[derive(Debug, Clone)]
pub struct App {
    pub config: ConfigState,
    pub stores: StoreState,
    pub cart: CartState,
}

impl App {
    pub fn new(config: ConfigState, stores: StoreState) -> Self {
        App {
            config,
            stores,
            cart: CartState::new(),
        }
    }
}

/// Runs the application until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, writing to stderr             │
/// │     • Default: info,cafe=debug,sqlx=warn; override with RUST_LOG        │
/// │                                                                         │
/// │  2. Determine Database Path ──────────────────────────────────────────► │
/// │     • CAFE_DB_PATH, else the platform data dir (cafe.db)                │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  4. Load Stores ──────────────────────────────────────────────────────► │
/// │     • menu, inventory, orders, purchases snapshots                      │
/// │     • sample data on an empty database                                  │
/// │     • repair paid orders that were never completed                      │
/// │                                                                         │
/// │  5. Serve Requests ───────────────────────────────────────────────────► │
/// │     • one JSON request per stdin line until EOF                         │
/// │     • flush every store, close the pool                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting Cafe POS");

    let config = ConfigState::from_env();
    let db_path = get_database_path()?;
    info!(?db_path, store = %config.store_name, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;
    info!("Database connected and migrations applied");

    let stores = StoreState::load(db.clone()).await?;
    let app = App::new(config, stores);
    if app.config.seed_sample_data {
        seed_if_empty(&app)?;
    }
    info!("State initialized");

    let stdin = BufReader::new(tokio::io::stdin());
    let handled = serve(&app, stdin, tokio::io::stdout()).await?;
    info!(requests = handled, "Input closed, shutting down");

    app.stores.flush().await?;
    db.close().await;
    Ok(())
}

/// Loads the sample menu and ingredients into a brand-new database.
fn seed_if_empty(app: &App) -> Result<(), ApiError> {
    let summary = app.stores.mutate(&[StoreKind::Menu, StoreKind::Inventory], |s| {
        if !s.catalog.is_empty() || !s.inventory.is_empty() {
            return Ok(None);
        }
        seed_stores(&mut s.catalog, &mut s.inventory).map(Some)
    })?;

    if let Some(summary) = summary {
        info!(
            menu_items = summary.menu_items_added,
            ingredients = summary.ingredients_added,
            "Sample data loaded"
        );
    }
    Ok(())
}

/// Answers requests from `input` until it ends.
///
/// ## Returns
/// Number of requests handled
pub async fn serve<R, W>(app: &App, input: R, mut output: W) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                debug!(command = %request.command, "Request received");
                let id = request.id.clone();
                let result = commands::dispatch(app, request);
                if let Err(e) = &result {
                    debug!(error = %e, "Command failed");
                }
                Response::new(id, result)
            }
            Err(e) => {
                warn!(error = %e, "Malformed request");
                Response::new(None, Err(ApiError::validation(format!("Malformed request: {}", e))))
            }
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
        output.flush().await?;
        handled += 1;
    }

    Ok(handled)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cafe=trace` - Show trace for cafe crates only
/// - Default: `info,cafe=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cafe=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.cafe.pos/cafe.db`
/// - **Windows**: `%APPDATA%\cafe\pos\data\cafe.db`
/// - **Linux**: `~/.local/share/pos/cafe.db`
///
/// ## Development Override
/// Set `CAFE_DB_PATH` environment variable to use a custom path.
fn get_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Ok(path) = std::env::var("CAFE_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("com", "cafe", "pos").ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("cafe.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CafeStores;
    use serde_json::Value;

    fn app() -> App {
        App::new(ConfigState::default(), StoreState::new(CafeStores::first_run()))
    }

    #[tokio::test]
    async fn test_serve_answers_each_line() {
        let app = app();
        let input = concat!(
            "{\"id\":1,\"command\":\"list_categories\"}\n",
            "\n",
            "not json\n",
            "{\"id\":\"x\",\"command\":\"get_order\",\"args\":{\"id\":\"missing\"}}\n",
        );
        let mut output = Vec::new();

        let handled = serve(&app, input.as_bytes(), &mut output).await.unwrap();
        assert_eq!(handled, 3);

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["ok"], true);
        assert_eq!(responses[1]["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(responses[2]["id"], "x");
        assert_eq!(responses[2]["error"]["code"], "NOT_FOUND");
    }

    #[test]
    fn test_seed_only_on_empty_database() {
        let app = app();
        seed_if_empty(&app).unwrap();
        let seeded = app.stores.with_stores(|s| (s.catalog.items().len(), s.inventory.items().len()));
        assert!(seeded.0 > 0 && seeded.1 > 0);

        let first_id = app.stores.with_stores(|s| s.catalog.items()[0].id.clone());
        app.stores
            .mutate(&[StoreKind::Menu], |s| s.catalog.delete_item(&first_id))
            .unwrap();

        seed_if_empty(&app).unwrap();
        assert_eq!(app.stores.with_stores(|s| s.catalog.items().len()), seeded.0 - 1);
    }
}
