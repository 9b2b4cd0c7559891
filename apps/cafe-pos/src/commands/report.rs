//! # Report Commands
//!
//! Dashboard numbers and the date-range sales report. Days, weeks and
//! months are the café's local ones (`ConfigState::timezone`).

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, StoreState};
use cafe_core::reporting::{self, local_day_bounds, DashboardSummary, SalesReport};

/// Home screen summary as of now.
///
/// The low-stock panel is left empty when alerts are turned off.
pub fn get_dashboard(stores: &StoreState, config: &ConfigState) -> DashboardSummary {
    debug!("get_dashboard command");

    let now = Utc::now().with_timezone(&config.timezone());
    let mut summary = stores.with_stores(|s| reporting::dashboard_summary(s.orders.orders(), &s.inventory, now));

    if !config.low_stock_alerts {
        summary.low_stock_items.clear();
    }

    debug!(
        today = %config.format_currency(summary.today_revenue),
        today_orders = summary.today_orders,
        low_stock = summary.low_stock_items.len(),
        "Dashboard computed"
    );
    summary
}

/// Sales from the start of `start_date` to the end of `end_date`, both
/// local calendar days.
pub fn get_sales_report(
    stores: &StoreState,
    config: &ConfigState,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<SalesReport, ApiError> {
    debug!(start = %start_date, end = %end_date, "get_sales_report command");

    let (start, end) = local_date_range(config, start_date, end_date)?;
    let report = stores.with_stores(|s| reporting::sales_report(s.orders.orders(), start, end));

    info!(
        start = %start_date,
        end = %end_date,
        revenue = %config.format_currency(report.total_revenue),
        orders = report.total_orders,
        "Sales report generated"
    );
    Ok(report)
}

/// Inclusive instants covering whole local days `start_date..=end_date`.
pub(crate) fn local_date_range(
    config: &ConfigState,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), ApiError> {
    if start_date > end_date {
        return Err(ApiError::validation(format!(
            "Start date {} is after end date {}",
            start_date, end_date
        )));
    }

    let tz = config.timezone();
    let (start, _) = local_day_bounds(start_date, &tz);
    let (_, next_day) = local_day_bounds(end_date, &tz);
    let end = next_day - Duration::milliseconds(1);

    Ok((start.with_timezone(&tz), end.with_timezone(&tz)))
}
