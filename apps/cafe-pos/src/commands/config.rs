//! # Config Commands
//!
//! Read-only access to the application configuration.

use tracing::debug;

use crate::state::ConfigState;

/// Gets the current application configuration.
///
/// ## When Used
/// - App startup (store name in the header)
/// - Currency formatting on every screen
///
/// ## Returns
/// Complete configuration state (read-only)
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}
