//! # Analytics Module
//!
//! Pure, read-only derivations over a snapshot of the sale ledger and the
//! catalog. Nothing here touches the ledger store or the clock; callers
//! pass slices, a date, and (where randomness is involved) an `Rng`.
//!
//! ## Failure Semantics
//! Analytics never fail. Insufficient data degrades to empty vectors,
//! zero totals, or the `None` forecast sentinel, so a dashboard render can
//! never be blocked by an error path.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   sale ledger snapshot (newest-first) ──┬──► daily_totals               │
//! │                                         ├──► forecast (rng injected)    │
//! │                                         ├──► product_affinity           │
//! │                                         ├──► growth_rate                │
//! │   catalog snapshot ─────────────────────┴──► restock_recommendations    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{PaymentMethod, Product, SaleRecord};
use crate::{FORECAST_MIN_SALES, LOW_STOCK_THRESHOLD, RESTOCK_FLAG_DAYS};

// =============================================================================
// Snapshot Filtering
// =============================================================================

/// Filters a ledger snapshot by store and/or time range.
///
/// Relative order (newest-first) is preserved; the ledger prepends on
/// write so no re-sorting happens here.
pub fn filter_sales(
    sales: &[SaleRecord],
    store_id: Option<&str>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Vec<SaleRecord> {
    sales
        .iter()
        .filter(|s| store_id.is_none_or(|id| s.store_id == id))
        .filter(|s| from.is_none_or(|f| s.timestamp >= f))
        .filter(|s| to.is_none_or(|t| s.timestamp <= t))
        .cloned()
        .collect()
}

// =============================================================================
// Daily Totals
// =============================================================================

/// Per-payment-method aggregate for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodBreakdown {
    pub method: PaymentMethod,
    pub sale_count: usize,
    pub amount_cents: i64,
}

/// Aggregate of all sales within one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub sale_count: usize,
    pub item_count: i64,
    pub total_cents: i64,
    /// One entry per payment method seen that day, in Cash/Card/Mobile order.
    pub methods: Vec<MethodBreakdown>,
}

/// Partitions sales falling within [00:00:00, 23:59:59.999] of `date`
/// (UTC) and aggregates count and amount per payment method plus total
/// item count.
pub fn daily_totals(sales: &[SaleRecord], date: NaiveDate, store_id: Option<&str>) -> DailyTotals {
    let day_sales: Vec<&SaleRecord> = sales
        .iter()
        .filter(|s| store_id.is_none_or(|id| s.store_id == id))
        .filter(|s| s.timestamp.date_naive() == date)
        .collect();

    let mut methods: Vec<MethodBreakdown> = Vec::new();
    for method in [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Mobile] {
        let matching: Vec<&&SaleRecord> = day_sales
            .iter()
            .filter(|s| s.payment_method == method)
            .collect();
        if matching.is_empty() {
            continue;
        }
        methods.push(MethodBreakdown {
            method,
            sale_count: matching.len(),
            amount_cents: matching.iter().map(|s| s.total_cents).sum(),
        });
    }

    DailyTotals {
        date,
        sale_count: day_sales.len(),
        item_count: day_sales.iter().map(|s| s.item_count()).sum(),
        total_cents: day_sales.iter().map(|s| s.total_cents).sum(),
        methods,
    }
}

// =============================================================================
// Forecast
// =============================================================================

/// A naive revenue projection from the sales window.
///
/// This is explicitly a moving-average-with-jitter model, not a fitted
/// time series: `average_daily_cents` is the arithmetic mean of per-day
/// revenue buckets, `predicted_weekly_cents` is that mean times seven,
/// and `series_cents` is seven points of the mean with a bounded ±10%
/// perturbation from the injected rng.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    pub average_daily_cents: i64,
    pub predicted_weekly_cents: i64,
    pub series_cents: Vec<i64>,
}

/// Computes a revenue forecast over the given sales window.
///
/// Returns `None` when the window holds fewer than
/// [`FORECAST_MIN_SALES`] sales - the "insufficient data" sentinel, not
/// an error.
///
/// The rng is injected so tests can pass a seeded `StdRng` and assert
/// deterministic output.
pub fn forecast<R: Rng>(sales: &[SaleRecord], rng: &mut R) -> Option<Forecast> {
    if sales.len() < FORECAST_MIN_SALES {
        return None;
    }

    // Per-day revenue buckets. BTreeMap keeps day iteration stable.
    let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for sale in sales {
        *buckets.entry(sale.timestamp.date_naive()).or_insert(0) += sale.total_cents;
    }

    let average_daily = buckets.values().sum::<i64>() as f64 / buckets.len() as f64;

    let series_cents = (0..7)
        .map(|_| {
            let jitter: f64 = rng.random_range(-0.10..=0.10);
            (average_daily * (1.0 + jitter)).round() as i64
        })
        .collect();

    Some(Forecast {
        average_daily_cents: average_daily.round() as i64,
        predicted_weekly_cents: (average_daily * 7.0).round() as i64,
        series_cents,
    })
}

// =============================================================================
// Product Affinity
// =============================================================================

/// Two product names observed together in the same sale, ranked by
/// co-occurrence count across the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityPair {
    pub first: String,
    pub second: String,
    pub count: usize,
}

/// For every sale with at least two distinct line items, forms all
/// unordered product-name pairs and returns the top 5 by co-occurrence
/// count descending. Ties break on pair names for determinism.
pub fn product_affinity(sales: &[SaleRecord]) -> Vec<AffinityPair> {
    let mut counts: HashMap<(String, String), usize> = HashMap::new();

    for sale in sales {
        // Distinct names only: two lines of the same product are not a pair.
        let mut names: Vec<&str> = sale
            .items
            .iter()
            .map(|i| i.name.as_str())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        if names.len() < 2 {
            continue;
        }
        names.sort_unstable();

        for i in 0..names.len() {
            for j in (i + 1)..names.len() {
                *counts
                    .entry((names[i].to_string(), names[j].to_string()))
                    .or_insert(0) += 1;
            }
        }
    }

    let mut pairs: Vec<AffinityPair> = counts
        .into_iter()
        .map(|((first, second), count)| AffinityPair {
            first,
            second,
            count,
        })
        .collect();

    pairs.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.first.cmp(&b.first))
            .then_with(|| a.second.cmp(&b.second))
    });
    pairs.truncate(5);
    pairs
}

// =============================================================================
// Restock Recommendations
// =============================================================================

/// A product flagged as running out, with a suggested reorder quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestockRecommendation {
    pub barcode: String,
    pub name: String,
    pub current_stock: i64,
    pub units_sold: i64,
    /// Units sold per day over the observation window.
    pub daily_velocity: f64,
    /// Projected days of inventory left; infinite when velocity is zero.
    pub days_remaining: f64,
    /// 2× the units sold in the window.
    pub suggested_quantity: i64,
}

/// Flags products projected to run out soon.
///
/// For each product sold in the window: daily velocity = units sold /
/// `window_days`; days remaining = stock / velocity (infinite at zero
/// velocity). A product is flagged when days remaining drop below
/// [`RESTOCK_FLAG_DAYS`] OR stock is below [`LOW_STOCK_THRESHOLD`].
/// Results are sorted ascending by days remaining (most urgent first).
pub fn restock_recommendations(
    sales: &[SaleRecord],
    products: &[Product],
    window_days: i64,
) -> Vec<RestockRecommendation> {
    let mut units_sold: HashMap<&str, i64> = HashMap::new();
    for sale in sales {
        for item in &sale.items {
            *units_sold.entry(item.barcode.as_str()).or_insert(0) += item.quantity;
        }
    }

    let window_days = window_days.max(1) as f64;

    let mut recommendations: Vec<RestockRecommendation> = products
        .iter()
        .filter_map(|product| {
            let sold = *units_sold.get(product.barcode.as_str())?;
            let velocity = sold as f64 / window_days;
            let days_remaining = if velocity > 0.0 {
                product.stock as f64 / velocity
            } else {
                f64::INFINITY
            };

            if days_remaining < RESTOCK_FLAG_DAYS || product.stock < LOW_STOCK_THRESHOLD {
                Some(RestockRecommendation {
                    barcode: product.barcode.clone(),
                    name: product.name.clone(),
                    current_stock: product.stock,
                    units_sold: sold,
                    daily_velocity: velocity,
                    days_remaining,
                    suggested_quantity: sold * 2,
                })
            } else {
                None
            }
        })
        .collect();

    recommendations.sort_by(|a, b| {
        a.days_remaining
            .partial_cmp(&b.days_remaining)
            .unwrap_or(Ordering::Equal)
    });
    recommendations
}

// =============================================================================
// Growth Rate & Dashboard
// =============================================================================

/// Splits the newest-first sale list at its midpoint and compares the
/// revenue of the newer half against the older half as a percentage
/// change. A coarse trend signal, not a validated growth metric.
///
/// Fewer than two sales, or a zero-revenue older half with a zero-revenue
/// newer half, yield 0.0; a zero-revenue older half with newer revenue
/// yields 100.0.
pub fn growth_rate(sales: &[SaleRecord]) -> f64 {
    if sales.len() < 2 {
        return 0.0;
    }

    let mid = sales.len() / 2;
    let newer_revenue: i64 = sales[..mid].iter().map(|s| s.total_cents).sum();
    let older_revenue: i64 = sales[mid..].iter().map(|s| s.total_cents).sum();

    if older_revenue == 0 {
        return if newer_revenue > 0 { 100.0 } else { 0.0 };
    }

    (newer_revenue - older_revenue) as f64 / older_revenue as f64 * 100.0
}

/// Headline dashboard statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_revenue_cents: i64,
    pub sale_count: usize,
    pub items_sold: i64,
    pub low_stock_count: usize,
    pub growth_rate_pct: f64,
}

/// Derives the headline numbers from ledger and catalog snapshots.
pub fn dashboard_stats(sales: &[SaleRecord], products: &[Product]) -> DashboardStats {
    DashboardStats {
        total_revenue_cents: sales.iter().map(|s| s.total_cents).sum(),
        sale_count: sales.len(),
        items_sold: sales.iter().map(|s| s.item_count()).sum(),
        low_stock_count: products
            .iter()
            .filter(|p| p.is_active && p.stock < LOW_STOCK_THRESHOLD)
            .count(),
        growth_rate_pct: growth_rate(sales),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
