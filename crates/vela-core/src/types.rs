//! # Domain Types
//!
//! Core domain types used throughout Vela POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Domain Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │    Product      │   │   SaleRecord    │   │    StockLog     │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │        │
//! │  │  barcode (biz)  │   │  receipt_number │   │  barcode        │        │
//! │  │  price_cents    │   │  items (frozen) │   │  before/after   │        │
//! │  │  stock          │   │  totals/change  │   │  quantity_added │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │  StockTransfer  │   │     Staff       │   │     Store       │        │
//! │  │  pending/done/  │   │  cashier or     │   │  code (biz key) │        │
//! │  │  cancelled      │   │  manager        │   │  is_active      │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every persisted entity has:
//! - `id`: UUID v4 - immutable, used for relations
//! - Business key: (barcode, store code, receipt number, staff business_id)
//!   - human-readable, what the UI searches and scans by

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000. The terminal ships with a zero
/// placeholder rate; it is configurable, not computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// Product category shown in catalog filters and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Beverages,
    Snacks,
    Groceries,
    Household,
    PersonalCare,
    Electronics,
    Other,
}

impl Default for ProductCategory {
    fn default() -> Self {
        ProductCategory::Other
    }
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode - the business key, globally unique across the catalog.
    pub barcode: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Category for catalog filtering.
    pub category: ProductCategory,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` more units can be sold.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Stock Log
// =============================================================================

/// Immutable audit record of a restock operation.
///
/// Created only by the stock engine; read-only afterward. The log is
/// newest-first: new entries are prepended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLog {
    pub id: String,
    pub barcode: String,
    /// Product name at time of restock (frozen).
    pub product_name: String,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub quantity_added: i64,
    pub performed_by: String,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Mobile wallet / QR payment.
    Mobile,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Mobile => write!(f, "mobile"),
        }
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// A line item in a completed sale.
///
/// Snapshot pattern: product data is frozen at time of sale so historical
/// receipts stay accurate even if price or name later change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub barcode: String,
    /// Product name at time of sale (frozen).
    pub name: String,
    /// Unit price in cents at time of sale (frozen).
    pub price_cents: i64,
    pub quantity: i64,
    /// Line total (price × quantity), frozen.
    pub total_cents: i64,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A completed sale transaction. Immutable once appended to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRecord {
    pub id: String,
    /// Short human-readable unique identifier printed on the receipt.
    pub receipt_number: String,
    /// Frozen line item snapshots, in scan order.
    pub items: Vec<SaleItem>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub amount_paid_cents: i64,
    pub change_cents: i64,
    pub cashier_name: String,
    pub store_id: String,
    pub store_name: String,
    pub timestamp: DateTime<Utc>,
}

impl SaleRecord {
    /// Total number of units across all line items.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Stock Transfer
// =============================================================================

/// The status of a stock transfer between stores.
///
/// State machine: created as `Pending`; transitions to `Completed` or
/// `Cancelled` only from `Pending`; terminal otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Completed,
    Cancelled,
}

impl Default for TransferStatus {
    fn default() -> Self {
        TransferStatus::Pending
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStatus::Pending => write!(f, "pending"),
            TransferStatus::Completed => write!(f, "completed"),
            TransferStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A stock transfer request between two stores.
///
/// Quantity is requested, not reserved: stock is global rather than
/// store-partitioned, so completion changes status only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransfer {
    pub id: String,
    pub from_store_id: String,
    pub to_store_id: String,
    pub barcode: String,
    /// Product name at time of request (frozen).
    pub product_name: String,
    pub quantity: i64,
    pub status: TransferStatus,
    pub requested_by: String,
    pub timestamp: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Staff
// =============================================================================

/// Staff role. Cashiers run the register; managers run the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Cashier,
    Manager,
}

/// A cashier or manager profile.
///
/// Soft-deleted via `is_active`. The password is stored as an argon2 hash
/// only; the plaintext never reaches the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    /// Business identifier used for login (unique per role collection).
    pub business_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: StaffRole,
    pub is_active: bool,
    pub assigned_store_id: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
}

// =============================================================================
// Store
// =============================================================================

/// A retail store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    /// Store code - the business key, unique across stores.
    pub code: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub is_active: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================
