//! # Cart State
//!
//! The ephemeral, session-scoped cart built during a checkout flow.
//! Lives only in memory; it is never persisted to the ledger.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cart State Operations                               │
//! │                                                                         │
//! │  Register Action         Terminal Call             Cart Change          │
//! │  ───────────────         ─────────────             ───────────          │
//! │  Scan barcode ─────────► checkout.scan() ────────► qty += 1 / push      │
//! │  +/- on a line ────────► checkout.update_qty() ──► qty ± n / remove     │
//! │  Remove line ──────────► cart.remove() ──────────► items.retain(..)     │
//! │  Void sale ────────────► cart.clear() ───────────► items.clear()        │
//! │                                                                         │
//! │  Every stock-aware mutation validates against the product snapshot      │
//! │  BEFORE touching the cart: a rejected scan leaves the cart as-is.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use vela_core::error::{CoreError, CoreResult};
use vela_core::validation::{validate_cart_size, validate_quantity};
use vela_core::{Product, SaleItem};

/// A line item in the cart.
///
/// ## Price Freezing
/// The price is captured when the item is first scanned. A catalog price
/// change mid-transaction does not reprice lines already on the receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Barcode of the product (cart lines are unique by barcode).
    pub barcode: String,

    /// Product name at time of scan (frozen).
    pub name: String,

    /// Price in cents at time of scan (frozen).
    pub price_cents: i64,

    /// Quantity in cart.
    pub quantity: i64,
}

impl CartItem {
    /// Creates a cart line from a product snapshot.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            price_cents: product.price_cents,
            quantity,
        }
    }

    /// Line total (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.price_cents * self.quantity
    }

    /// Freezes this line into an immutable sale item snapshot.
    pub fn to_sale_item(&self) -> SaleItem {
        SaleItem {
            barcode: self.barcode.clone(),
            name: self.name.clone(),
            price_cents: self.price_cents,
            quantity: self.quantity,
            total_cents: self.line_total_cents(),
        }
    }
}

/// The cart.
///
/// ## Invariants
/// - Lines are unique by barcode (scanning the same product increments)
/// - Quantity per line never exceeds the product's stock at scan time
/// - A line's quantity is always > 0 (dropping to zero removes it)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Scans one unit of a product into the cart.
    ///
    /// ## Behavior
    /// - Line already at or above the product's stock →
    ///   [`CoreError::StockLimitExceeded`], cart unchanged
    /// - No line and the product is out of stock → [`CoreError::OutOfStock`]
    /// - Otherwise increments the existing line or appends one with qty 1
    pub fn scan(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(item) = self.items.iter_mut().find(|i| i.barcode == product.barcode) {
            if item.quantity >= product.stock {
                return Err(CoreError::StockLimitExceeded {
                    name: product.name.clone(),
                    available: product.stock,
                });
            }
            item.quantity += 1;
            return Ok(());
        }

        if product.stock == 0 {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
            });
        }

        validate_cart_size(self.items.len())?;
        self.items.push(CartItem::from_product(product, 1));
        Ok(())
    }

    /// Adjusts a line's quantity by `delta`.
    ///
    /// ## Behavior
    /// - New quantity <= 0 → the line is removed
    /// - New quantity > product stock → [`CoreError::StockLimitExceeded`],
    ///   line unchanged
    /// - New quantity over the per-line cap → validation error
    /// - Otherwise the quantity is set
    pub fn update_quantity(&mut self, product: &Product, delta: i64) -> CoreResult<()> {
        let Some(index) = self.items.iter().position(|i| i.barcode == product.barcode) else {
            return Err(CoreError::not_found("Cart item", &product.barcode));
        };

        let new_quantity = self.items[index].quantity + delta;

        if new_quantity <= 0 {
            self.items.remove(index);
            return Ok(());
        }

        if new_quantity > product.stock {
            return Err(CoreError::StockLimitExceeded {
                name: product.name.clone(),
                available: product.stock,
            });
        }
        validate_quantity(new_quantity)?;

        self.items[index].quantity = new_quantity;
        Ok(())
    }

    /// Removes a line by barcode.
    pub fn remove(&mut self, barcode: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.barcode != barcode);

        if self.items.len() == initial_len {
            Err(CoreError::not_found("Cart item", barcode))
        } else {
            Ok(())
        }
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The lines, in scan order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Subtotal before tax.
    pub fn subtotal_cents(&self) -> i64 {
        self.items.iter().map(|i| i.line_total_cents()).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
