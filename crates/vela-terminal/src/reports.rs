//! # Reports
//!
//! Back-office analytics facade. All math lives in `vela_core::analytics`
//! over plain slices; this layer only loads collections, applies the
//! store/window filters and forwards. Reports never fail on thin data:
//! an empty ledger yields zeroed stats, not errors.

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vela_core::analytics::{
    self, AffinityPair, DailyTotals, DashboardStats, Forecast, RestockRecommendation,
};
use vela_core::{Product, SaleRecord};
use vela_ledger::{collections, Ledger};

use crate::config::TerminalConfig;
use crate::error::TerminalResult;

/// The analytics component.
#[derive(Clone)]
pub struct Reports {
    ledger: Ledger,
    config: TerminalConfig,
}

impl Reports {
    pub fn new(ledger: Ledger, config: TerminalConfig) -> Self {
        Reports { ledger, config }
    }

    /// Headline numbers for the dashboard, optionally scoped to a store.
    pub fn dashboard(&self, store_id: Option<&str>) -> TerminalResult<DashboardStats> {
        let sales = self.sales_for(store_id)?;
        let products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;
        Ok(analytics::dashboard_stats(&sales, &products))
    }

    /// One day's totals with the per-payment-method breakdown.
    pub fn daily(&self, date: NaiveDate, store_id: Option<&str>) -> TerminalResult<DailyTotals> {
        let sales: Vec<SaleRecord> = self.ledger.get_all(collections::SALES)?;
        Ok(analytics::daily_totals(&sales, date, store_id))
    }

    /// Seven-day revenue projection. `None` until enough sales exist to
    /// project from.
    pub fn forecast(&self, store_id: Option<&str>) -> TerminalResult<Option<Forecast>> {
        self.forecast_with_rng(store_id, &mut StdRng::from_os_rng())
    }

    /// [`forecast`](Self::forecast) with an injected RNG for the jitter,
    /// so tests get a stable series.
    pub fn forecast_with_rng<R: Rng>(
        &self,
        store_id: Option<&str>,
        rng: &mut R,
    ) -> TerminalResult<Option<Forecast>> {
        let sales = self.sales_for(store_id)?;
        Ok(analytics::forecast(&sales, rng))
    }

    /// Top product pairs bought together.
    pub fn affinity(&self, store_id: Option<&str>) -> TerminalResult<Vec<AffinityPair>> {
        let sales = self.sales_for(store_id)?;
        Ok(analytics::product_affinity(&sales))
    }

    /// Restock suggestions based on sales velocity over the configured
    /// window, most urgent first.
    pub fn restock(&self, store_id: Option<&str>) -> TerminalResult<Vec<RestockRecommendation>> {
        let window_days = self.config.restock_window_days();
        let cutoff = Utc::now() - Duration::days(window_days);

        let sales: Vec<SaleRecord> = self.ledger.get_all(collections::SALES)?;
        let windowed = analytics::filter_sales(&sales, store_id, Some(cutoff), None);
        let products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;

        Ok(analytics::restock_recommendations(
            &windowed,
            &products,
            window_days,
        ))
    }

    /// Revenue growth of the newer half of sales over the older half, as
    /// a percentage.
    pub fn growth(&self, store_id: Option<&str>) -> TerminalResult<f64> {
        let sales = self.sales_for(store_id)?;
        Ok(analytics::growth_rate(&sales))
    }

    fn sales_for(&self, store_id: Option<&str>) -> TerminalResult<Vec<SaleRecord>> {
        let sales: Vec<SaleRecord> = self.ledger.get_all(collections::SALES)?;
        Ok(analytics::filter_sales(&sales, store_id, None, None))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
