//! Revenue bucketing for the admin dashboard.
//!
//! Pure and stateless: a set of orders in, a chronologically ascending
//! series of `(label, summed total)` points out. Weekly buckets use ISO-week
//! semantics (Monday-start, the week containing the year's first Thursday is
//! week 1); truncation keeps the most recent `limit` buckets.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, IsoWeek, Utc};

use toolkart_core::{Granularity, Order, SalesPoint};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Bucket `orders` into a revenue series at the given granularity, keeping
/// the most recent `limit` buckets in chronological order.
#[must_use]
pub fn bucket_orders(orders: &[Order], granularity: Granularity, limit: usize) -> Vec<SalesPoint> {
    // Sort key is derived from (year, period) so BTreeMap iteration is
    // already chronological.
    let mut buckets: BTreeMap<i64, (String, f64)> = BTreeMap::new();

    for order in orders {
        let (sort_key, label) = bucket_for(order.created_at, granularity);
        let entry = buckets.entry(sort_key).or_insert_with(|| (label, 0.0));
        entry.1 += safe_total(order.total);
    }

    let skip = buckets.len().saturating_sub(limit);
    buckets
        .into_values()
        .skip(skip)
        .map(|(label, value)| SalesPoint {
            label,
            value: round2(value),
        })
        .collect()
}

fn bucket_for(created_at: DateTime<Utc>, granularity: Granularity) -> (i64, String) {
    match granularity {
        Granularity::Weekly => {
            let iso: IsoWeek = created_at.iso_week();
            let (year, week) = (i64::from(iso.year()), i64::from(iso.week()));
            (year * 100 + week, week_label(iso.year(), iso.week()))
        }
        Granularity::Monthly => {
            let (year, month) = (created_at.year(), created_at.month());
            (
                i64::from(year) * 100 + i64::from(month),
                month_label(year, month),
            )
        }
        Granularity::Quarterly => {
            let year = created_at.year();
            let quarter = created_at.month().div_ceil(3);
            (
                i64::from(year) * 10 + i64::from(quarter),
                quarter_label(year, quarter),
            )
        }
    }
}

/// `W<2-digit-week> <year>`, e.g. `W01 2024`.
#[must_use]
pub fn week_label(year: i32, week: u32) -> String {
    format!("W{week:02} {year}")
}

/// 3-letter month abbreviation plus year, e.g. `Jan 2024`.
#[must_use]
pub fn month_label(year: i32, month: u32) -> String {
    let name = MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("Jan");
    format!("{name} {year}")
}

/// `Q<quarter> <year>`, e.g. `Q3 2024`.
#[must_use]
pub fn quarter_label(year: i32, quarter: u32) -> String {
    format!("Q{quarter} {year}")
}

/// Round a monetary sum to 2 decimal places for output.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn safe_total(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
