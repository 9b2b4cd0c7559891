//! # Reporting Aggregator
//!
//! Dashboard and sales-report numbers derived from the order history and
//! the inventory ledger. Everything here is a pure function of its inputs;
//! the caller supplies `now` and the time zone that defines "today".
//!
//! ## What Counts as Revenue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   all orders ──► is_paid && status == Completed ──► bucket by          │
//! │                  (pending, served, cancelled and      completed_at      │
//! │                   inconsistent orders excluded)       (time of payment) │
//! │                                                                         │
//! │   today  = [start of local day,   ...)                                  │
//! │   week   = [start of local week (Sunday), ...)                          │
//! │   month  = [first of local month, ...)                                  │
//! │   top 5  = trailing 30 days, ranked by quantity                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Recent orders are the exception: the ten newest by `created_at`, any status.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::inventory::InventoryLedger;
use crate::money::Money;
use crate::types::{InventoryItem, Order};
use crate::{RECENT_ORDERS_LIMIT, TOP_SELLING_LIMIT, TOP_SELLING_WINDOW_DAYS};

// =============================================================================
// Report Types
// =============================================================================

/// A menu item ranked by units sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    pub menu_item_id: String,
    /// Name as it appeared on the first matching order line.
    pub menu_item_name: String,
    pub quantity_sold: i64,
    pub revenue: Money,
}

/// Numbers for the home screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today_revenue: Money,
    pub week_revenue: Money,
    pub month_revenue: Money,
    pub today_orders: usize,
    pub low_stock_items: Vec<InventoryItem>,
    pub top_selling_items: Vec<PopularItem>,
    pub recent_orders: Vec<Order>,
}

/// One calendar day of a sales report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub revenue: Money,
    pub order_count: usize,
    pub items_sold: i64,
}

impl DailySales {
    fn empty(date: NaiveDate) -> Self {
        DailySales {
            date,
            revenue: Money::zero(),
            order_count: 0,
            items_sold: 0,
        }
    }
}

/// Sales over an inclusive date-time range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,
    pub total_revenue: Money,
    pub total_orders: usize,
    pub total_items_sold: i64,
    /// One row per calendar day in the range, empty days included.
    pub daily_sales: Vec<DailySales>,
    /// Every item sold in the range, best sellers first.
    pub popular_items: Vec<PopularItem>,
    /// Revenue / orders, rounded to the centavo; zero with no orders.
    pub average_order_value: Money,
}

// =============================================================================
// Local Calendar Helpers
// =============================================================================

/// The instant the given calendar day begins in `tz`.
///
/// If midnight does not exist (a DST jump at 00:00) the day starts at the
/// first valid hour after it.
pub fn start_of_local_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = day.and_time(NaiveTime::MIN);
    (0..=2)
        .find_map(|h| tz.from_local_datetime(&(midnight + Duration::hours(h))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// `[start, end)` of the given calendar day in `tz`, as UTC instants.
pub fn local_day_bounds<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = day.succ_opt().unwrap_or(day);
    (start_of_local_day(day, tz), start_of_local_day(next, tz))
}

/// Sunday on or before `day`.
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_sunday() as i64)
}

/// First day of `day`'s month.
pub fn start_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

// =============================================================================
// Aggregation
// =============================================================================

/// Paid + completed orders with a completion stamp.
fn settled<'a>(orders: &'a [Order]) -> impl Iterator<Item = (&'a Order, DateTime<Utc>)> + 'a {
    orders
        .iter()
        .filter(|o| o.is_settled())
        .filter_map(|o| o.completed_at.map(|at| (o, at)))
}

/// Sums units and revenue per menu item, best sellers first.
///
/// Ties keep the order in which items were first encountered.
fn rank_items<'a>(orders: impl Iterator<Item = &'a Order>) -> Vec<PopularItem> {
    let mut ranked: Vec<PopularItem> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for order in orders {
        for line in &order.items {
            match index.get(line.menu_item_id.as_str()) {
                Some(&i) => {
                    ranked[i].quantity_sold += line.quantity;
                    ranked[i].revenue += line.subtotal;
                }
                None => {
                    index.insert(line.menu_item_id.as_str(), ranked.len());
                    ranked.push(PopularItem {
                        menu_item_id: line.menu_item_id.clone(),
                        menu_item_name: line.menu_item_name.clone(),
                        quantity_sold: line.quantity,
                        revenue: line.subtotal,
                    });
                }
            }
        }
    }

    // sort_by is stable
    ranked.sort_by(|a, b| b.quantity_sold.cmp(&a.quantity_sold));
    ranked
}

/// Builds the dashboard as of `now` in `now`'s time zone.
///
/// ## Example
/// ```rust
/// use cafe_core::inventory::InventoryLedger;
/// use cafe_core::reporting::dashboard_summary;
/// use chrono::Utc;
///
/// let summary = dashboard_summary(&[], &InventoryLedger::new(), Utc::now());
/// assert!(summary.today_revenue.is_zero());
/// assert!(summary.recent_orders.is_empty());
/// ```
pub fn dashboard_summary<Tz: TimeZone>(
    orders: &[Order],
    inventory: &InventoryLedger,
    now: DateTime<Tz>,
) -> DashboardSummary {
    let tz = now.timezone();
    let today = now.date_naive();
    let today_start = start_of_local_day(today, &tz);
    let week_start = start_of_local_day(start_of_week(today), &tz);
    let month_start = start_of_local_day(start_of_month(today), &tz);
    let window_start = now.with_timezone(&Utc) - Duration::days(TOP_SELLING_WINDOW_DAYS);

    let mut today_revenue = Money::zero();
    let mut week_revenue = Money::zero();
    let mut month_revenue = Money::zero();
    let mut today_orders = 0;

    for (order, completed_at) in settled(orders) {
        if completed_at >= today_start {
            today_revenue += order.total;
            today_orders += 1;
        }
        if completed_at >= week_start {
            week_revenue += order.total;
        }
        if completed_at >= month_start {
            month_revenue += order.total;
        }
    }

    let mut top_selling_items = rank_items(
        settled(orders)
            .filter(|(_, at)| *at >= window_start)
            .map(|(o, _)| o),
    );
    top_selling_items.truncate(TOP_SELLING_LIMIT);

    let mut recent_orders: Vec<Order> = orders.to_vec();
    recent_orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent_orders.truncate(RECENT_ORDERS_LIMIT);

    DashboardSummary {
        today_revenue,
        week_revenue,
        month_revenue,
        today_orders,
        low_stock_items: inventory.low_stock_items().into_iter().cloned().collect(),
        top_selling_items,
        recent_orders,
    }
}

/// Builds a sales report over `[start, end]`.
///
/// Orders are attributed to the local day of their `completed_at`. The
/// daily rows cover every calendar day from `start` to `end` in the
/// range's time zone.
pub fn sales_report<Tz: TimeZone>(orders: &[Order], start: DateTime<Tz>, end: DateTime<Tz>) -> SalesReport {
    let tz = start.timezone();
    let start_utc = start.with_timezone(&Utc);
    let end_utc = end.with_timezone(&Utc);

    let in_range: Vec<(&Order, DateTime<Utc>)> = settled(orders)
        .filter(|(_, at)| *at >= start_utc && *at <= end_utc)
        .collect();

    let mut daily_sales: Vec<DailySales> = start
        .date_naive()
        .iter_days()
        .take_while(|d| *d <= end.date_naive())
        .map(DailySales::empty)
        .collect();
    let day_index: HashMap<NaiveDate, usize> = daily_sales
        .iter()
        .enumerate()
        .map(|(i, row)| (row.date, i))
        .collect();

    let mut total_revenue = Money::zero();
    let mut total_items_sold = 0;

    for (order, completed_at) in &in_range {
        let items = order.item_count();
        total_revenue += order.total;
        total_items_sold += items;

        let day = completed_at.with_timezone(&tz).date_naive();
        if let Some(&i) = day_index.get(&day) {
            let row = &mut daily_sales[i];
            row.revenue += order.total;
            row.order_count += 1;
            row.items_sold += items;
        }
    }

    let total_orders = in_range.len();

    SalesReport {
        start_date: start_utc,
        end_date: end_utc,
        total_revenue,
        total_orders,
        total_items_sold,
        daily_sales,
        popular_items: rank_items(in_range.iter().map(|(o, _)| *o)),
        average_order_value: total_revenue.divide_rounded(total_orders as i64),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
