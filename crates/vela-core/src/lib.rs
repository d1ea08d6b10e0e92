//! # vela-core: Pure Business Logic for Vela POS
//!
//! This crate is the **heart** of Vela POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Vela POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     UI event handlers                           │    │
//! │  │    Scan ──► Cart ──► Tender ──► Receipt / Back-office tables    │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                     vela-terminal                               │    │
//! │  │    catalog, stock engine, checkout pipeline, reports            │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                ★ vela-core (THIS CRATE) ★                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐   │    │
//! │  │   │   types   │  │   money   │  │ analytics  │  │ validation│   │    │
//! │  │   │  Product  │  │   Money   │  │  forecast  │  │   rules   │   │    │
//! │  │   │SaleRecord │  │  TaxRate  │  │  affinity  │  │   checks  │   │    │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘   │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO LEDGER • NO NETWORK • PURE FUNCTIONS              │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                     vela-ledger                                 │    │
//! │  │         key/value JSON ledger store (one blob, one writer)      │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, SaleRecord, StockTransfer, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error taxonomy
//! - [`validation`] - Business rule validation
//! - [`analytics`] - Pure derivations over the sale ledger snapshot
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Deterministic - randomness is injected by caller
//! 2. **No I/O**: Ledger, file system, network access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed; analytics never fail,
//!    they degrade to empty/zero results

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct line items allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and keeps receipt rendering bounded.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Minimum number of sales in the window before a forecast is produced.
/// Below this the forecast returns the "insufficient data" sentinel.
pub const FORECAST_MIN_SALES: usize = 7;

/// Observation window, in days, for restock velocity calculations.
pub const RESTOCK_WINDOW_DAYS: i64 = 30;

/// A product is flagged for restock when projected days of inventory
/// remaining drop below this.
pub const RESTOCK_FLAG_DAYS: f64 = 14.0;

/// A product is flagged for restock outright when stock falls below this,
/// regardless of velocity.
pub const LOW_STOCK_THRESHOLD: i64 = 10;
