//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CAFE_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use cafe_core::Money;
use chrono::{FixedOffset, Local, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (shown on the dashboard header)
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Show the low-stock panel on the dashboard
    pub low_stock_alerts: bool,

    /// Offset of the café's local time from UTC, in minutes.
    /// Defines where "today", "this week" and report days begin.
    pub utc_offset_minutes: i32,

    /// Load the sample menu and ingredients when both stores are empty
    pub seed_sample_data: bool,
}

impl Default for ConfigState {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "Cafe POS Dev Store"
    /// - Currency: PHP (₱), 2 decimals
    /// - Low-stock alerts: on
    /// - Time zone: the machine's current offset
    /// - Sample data: seeded on an empty database
    fn default() -> Self {
        ConfigState {
            store_name: "Cafe POS Dev Store".to_string(),
            currency_code: "PHP".to_string(),
            currency_symbol: "₱".to_string(),
            currency_decimals: 2,
            low_stock_alerts: true,
            utc_offset_minutes: Local::now().offset().fix().local_minus_utc() / 60,
            seed_sample_data: true,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `CAFE_STORE_NAME`: Override store name
    /// - `CAFE_CURRENCY_SYMBOL`: Override currency symbol
    /// - `CAFE_CURRENCY_CODE`: Override currency code
    /// - `CAFE_LOW_STOCK_ALERTS`: "false" or "0" hides low-stock alerts
    /// - `CAFE_UTC_OFFSET_MINUTES`: Override local time offset (e.g. "480")
    /// - `CAFE_SEED_SAMPLE`: "false" or "0" starts with an empty menu
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Ok(store_name) = std::env::var("CAFE_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(symbol) = std::env::var("CAFE_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Ok(code) = std::env::var("CAFE_CURRENCY_CODE") {
            config.currency_code = code;
        }

        if let Ok(flag) = std::env::var("CAFE_LOW_STOCK_ALERTS") {
            config.low_stock_alerts = !matches!(flag.trim(), "0" | "false" | "off");
        }

        if let Ok(flag) = std::env::var("CAFE_SEED_SAMPLE") {
            config.seed_sample_data = !matches!(flag.trim(), "0" | "false" | "off");
        }

        if let Ok(offset) = std::env::var("CAFE_UTC_OFFSET_MINUTES") {
            if let Ok(minutes) = offset.trim().parse::<i32>() {
                if offset_from_minutes(minutes).is_some() {
                    config.utc_offset_minutes = minutes;
                }
            }
        }

        config
    }

    /// The café's local time zone. UTC if the offset is out of range.
    pub fn timezone(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes).unwrap_or_else(|| Utc.fix())
    }

    /// Formats an amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(12050)), "₱120.50");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

/// `None` unless strictly within ±24 hours.
fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_positive() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_cents(12050)), "₱120.50");
        assert_eq!(config.format_currency(Money::from_cents(100)), "₱1.00");
        assert_eq!(config.format_currency(Money::from_cents(1)), "₱0.01");
        assert_eq!(config.format_currency(Money::zero()), "₱0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_cents(-5000)), "-₱50.00");
    }

    #[test]
    fn test_format_currency_without_decimals() {
        let config = ConfigState {
            currency_decimals: 0,
            currency_symbol: "¥".into(),
            ..ConfigState::default()
        };
        assert_eq!(config.format_currency(Money::from_cents(1200)), "¥1200");
    }

    #[test]
    fn test_timezone_from_offset() {
        let config = ConfigState {
            utc_offset_minutes: 480,
            ..ConfigState::default()
        };
        assert_eq!(config.timezone().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        assert!(offset_from_minutes(-600).is_some());
        assert!(offset_from_minutes(24 * 60).is_none());
        assert!(offset_from_minutes(i32::MAX).is_none());
        assert!(offset_from_minutes(i32::MIN).is_none());

        let config = ConfigState {
            utc_offset_minutes: i32::MAX,
            ..ConfigState::default()
        };
        assert_eq!(config.timezone().local_minus_utc(), 0);
    }
}
