//! # Checkout Terminal
//!
//! The sale pipeline: barcode scans feed a cart, and `process_sale`
//! turns the cart into a persisted receipt. Stock is re-checked against
//! the ledger at payment time, after the cart was built, so a sale never
//! commits partially: either every line's deduction applies or none do.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use uuid::Uuid;

use vela_core::error::CoreError;
use vela_core::validation::validate_payment_amount;
use vela_core::{Money, PaymentMethod, Product, SaleRecord};
use vela_ledger::{collections, Ledger};

use crate::cart::Cart;
use crate::config::TerminalConfig;
use crate::error::TerminalResult;
use crate::session::SessionContext;

/// The checkout component. One instance per till; the cart itself is
/// owned by the caller so an abandoned cart never touches the ledger.
#[derive(Clone)]
pub struct CheckoutTerminal {
    ledger: Ledger,
    config: TerminalConfig,
}

impl CheckoutTerminal {
    pub fn new(ledger: Ledger, config: TerminalConfig) -> Self {
        CheckoutTerminal { ledger, config }
    }

    /// Scans a barcode into the cart. Unknown barcodes are reported as
    /// unregistered rather than not-found: at the till the distinction
    /// between "no such row" and "never entered in the catalog" is moot.
    pub fn scan(&self, cart: &mut Cart, barcode: &str) -> TerminalResult<()> {
        let product = self.fetch(barcode)?;
        cart.scan(&product)?;
        debug!(barcode, lines = cart.line_count(), "Barcode scanned");
        Ok(())
    }

    /// Adjusts a cart line's quantity by `delta`, clamped to the
    /// product's current stock. A result of zero or less removes the line.
    pub fn update_quantity(&self, cart: &mut Cart, barcode: &str, delta: i64) -> TerminalResult<()> {
        let product = self.fetch(barcode)?;
        cart.update_quantity(&product, delta)?;
        Ok(())
    }

    /// Running totals for the cart under the configured tax rate:
    /// (subtotal, tax, total), all in cents.
    pub fn totals(&self, cart: &Cart) -> (i64, i64, i64) {
        let subtotal = Money::from_cents(cart.subtotal_cents());
        let tax = subtotal.calculate_tax(self.config.tax_rate());
        let total = subtotal + tax;
        (subtotal.cents(), tax.cents(), total.cents())
    }

    /// Finalizes the sale: validates payment, re-checks every line
    /// against current stock, deducts, writes the receipt and clears the
    /// cart. On any error the cart and the ledger are left untouched.
    pub fn process_sale(
        &self,
        cart: &mut Cart,
        payment_method: PaymentMethod,
        amount_paid_cents: i64,
        session: &SessionContext,
    ) -> TerminalResult<SaleRecord> {
        self.process_sale_with_rng(
            cart,
            payment_method,
            amount_paid_cents,
            session,
            &mut StdRng::from_os_rng(),
        )
    }

    /// Same as [`process_sale`](Self::process_sale) with an injected RNG
    /// for the receipt suffix, so tests get stable receipt numbers.
    pub fn process_sale_with_rng<R: Rng>(
        &self,
        cart: &mut Cart,
        payment_method: PaymentMethod,
        amount_paid_cents: i64,
        session: &SessionContext,
        rng: &mut R,
    ) -> TerminalResult<SaleRecord> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        validate_payment_amount(amount_paid_cents)?;

        let (subtotal_cents, tax_cents, total_cents) = self.totals(cart);
        if amount_paid_cents < total_cents {
            return Err(CoreError::InsufficientPayment {
                total_cents,
                paid_cents: amount_paid_cents,
            }
            .into());
        }

        // Pre-check every line against current stock before mutating
        // anything, so a mid-cart failure cannot leave a partial deduction.
        let mut products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;
        let mut deductions: Vec<(usize, i64)> = Vec::with_capacity(cart.line_count());
        for item in cart.items() {
            let index = products
                .iter()
                .position(|p| p.barcode == item.barcode)
                .ok_or_else(|| CoreError::not_found("Product", &item.barcode))?;
            let product = &products[index];
            if product.stock < item.quantity {
                return Err(CoreError::InsufficientStock {
                    name: product.name.clone(),
                    available: product.stock,
                    requested: item.quantity,
                }
                .into());
            }
            deductions.push((index, item.quantity));
        }

        let now = Utc::now();
        for (index, quantity) in deductions {
            products[index].stock -= quantity;
            products[index].updated_at = now;
        }

        let record = SaleRecord {
            id: Uuid::new_v4().to_string(),
            receipt_number: self.receipt_number(now.timestamp_millis(), rng),
            items: cart.items().iter().map(|i| i.to_sale_item()).collect(),
            subtotal_cents,
            tax_cents,
            total_cents,
            payment_method,
            amount_paid_cents,
            change_cents: amount_paid_cents - total_cents,
            cashier_name: session.cashier_name.clone(),
            store_id: session.store_id.clone(),
            store_name: session.store_name.clone(),
            timestamp: now,
        };

        let mut sales: Vec<SaleRecord> = self.ledger.get_all(collections::SALES)?;
        sales.insert(0, record.clone());

        // One backend write: the deduction and the receipt land together
        self.ledger.put_all_pair(
            (collections::PRODUCTS, &products),
            (collections::SALES, &sales),
        )?;

        cart.clear();
        info!(
            receipt = %record.receipt_number,
            total_cents = record.total_cents,
            items = record.item_count(),
            store = %record.store_name,
            "Sale completed"
        );
        Ok(record)
    }

    /// Sales history, newest first, optionally narrowed to one store.
    pub fn sales(&self, store_id: Option<&str>) -> TerminalResult<Vec<SaleRecord>> {
        let sales: Vec<SaleRecord> = self.ledger.get_all(collections::SALES)?;
        Ok(match store_id {
            Some(store_id) => sales
                .into_iter()
                .filter(|s| s.store_id == store_id)
                .collect(),
            None => sales,
        })
    }

    /// Looks up a sale by its receipt number.
    pub fn find_receipt(&self, receipt_number: &str) -> TerminalResult<Option<SaleRecord>> {
        let sales: Vec<SaleRecord> = self.ledger.get_all(collections::SALES)?;
        Ok(sales.into_iter().find(|s| s.receipt_number == receipt_number))
    }

    fn fetch(&self, barcode: &str) -> TerminalResult<Product> {
        let products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;
        products
            .into_iter()
            .find(|p| p.barcode == barcode)
            .ok_or_else(|| {
                CoreError::NotRegistered {
                    barcode: barcode.to_string(),
                }
                .into()
            })
    }

    /// Receipt numbers: `<prefix>-<millis in base 36, uppercase>-<3 random
    /// alphanumerics>`. Milliseconds give ordering, the suffix breaks
    /// same-millisecond collisions.
    fn receipt_number<R: Rng>(&self, millis: i64, rng: &mut R) -> String {
        const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let mut value = millis.max(0) as u64;
        let mut base36 = Vec::new();
        loop {
            base36.push(ALPHABET[(value % 36) as usize]);
            value /= 36;
            if value == 0 {
                break;
            }
        }
        base36.reverse();
        let suffix: String = (0..3)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        format!(
            "{}-{}-{}",
            self.config.receipt_prefix(),
            String::from_utf8_lossy(&base36),
            suffix
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{Catalog, NewProduct};
    use crate::stock::StockEngine;
    use vela_core::ProductCategory;
    use vela_ledger::{LedgerBackend, LedgerError, LedgerResult, MemoryBackend};

    /// Backend that rejects any write touching the sales collection.
    struct SalesWriteFails(MemoryBackend);

    impl LedgerBackend for SalesWriteFails {
        fn read(&self, key: &str) -> LedgerResult<Option<String>> {
            self.0.read(key)
        }

        fn write(&self, key: &str, value: &str) -> LedgerResult<()> {
            if key == collections::SALES {
                return Err(LedgerError::Poisoned);
            }
            self.0.write(key, value)
        }

        fn write_many(&self, entries: &[(&str, &str)]) -> LedgerResult<()> {
            if entries.iter().any(|(key, _)| *key == collections::SALES) {
                return Err(LedgerError::Poisoned);
            }
            self.0.write_many(entries)
        }

        fn remove(&self, key: &str) -> LedgerResult<()> {
            self.0.remove(key)
        }
    }

    fn setup(tax_bps: u32) -> (Ledger, CheckoutTerminal) {
        let ledger = Ledger::in_memory();
        let catalog = Catalog::new(ledger.clone());
        catalog
            .add(NewProduct {
                barcode: "123".to_string(),
                name: "Cola".to_string(),
                price_cents: 250,
                stock: 5,
                category: ProductCategory::Beverages,
            })
            .unwrap();
        catalog
            .add(NewProduct {
                barcode: "456".to_string(),
                name: "Chips".to_string(),
                price_cents: 150,
                stock: 3,
                category: ProductCategory::Snacks,
            })
            .unwrap();
        let config = TerminalConfig::default().with_tax_rate_bps(tax_bps);
        let terminal = CheckoutTerminal::new(ledger.clone(), config);
        (ledger, terminal)
    }

    fn session() -> SessionContext {
        SessionContext::from_parts("st1", "Downtown", "alice")
    }

    #[test]
    fn test_scan_unknown_barcode() {
        let (_, terminal) = setup(0);
        let mut cart = Cart::new();
        let err = terminal.scan(&mut cart, "999").unwrap_err();
        assert_eq!(err.to_string(), "Product not registered: 999");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_with_tax() {
        // 8.75% on $10.00 rounds half-up to $0.88
        let (_, terminal) = setup(875);
        let mut cart = Cart::new();
        terminal.scan(&mut cart, "123").unwrap();
        terminal.update_quantity(&mut cart, "123", 3).unwrap(); // qty 4 = 1000c

        let (subtotal, tax, total) = terminal.totals(&cart);
        assert_eq!(subtotal, 1000);
        assert_eq!(tax, 88);
        assert_eq!(total, 1088);
    }

    #[test]
    fn test_process_sale_happy_path() {
        let (ledger, terminal) = setup(0);
        let mut cart = Cart::new();
        terminal.scan(&mut cart, "123").unwrap();
        terminal.scan(&mut cart, "123").unwrap();
        terminal.scan(&mut cart, "456").unwrap();

        let record = terminal
            .process_sale_with_rng(
                &mut cart,
                PaymentMethod::Cash,
                1000,
                &session(),
                &mut StdRng::seed_from_u64(7),
            )
            .unwrap();

        assert_eq!(record.subtotal_cents, 650);
        assert_eq!(record.total_cents, 650);
        assert_eq!(record.change_cents, 350);
        assert_eq!(record.items.len(), 2);
        assert_eq!(record.cashier_name, "alice");
        assert!(record.receipt_number.starts_with("RCP-"));
        assert!(cart.is_empty());

        let products: Vec<Product> = ledger.get_all(collections::PRODUCTS).unwrap();
        assert_eq!(products[0].stock, 3); // Cola 5 - 2
        assert_eq!(products[1].stock, 2); // Chips 3 - 1

        let sales: Vec<SaleRecord> = ledger.get_all(collections::SALES).unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].receipt_number, record.receipt_number);
    }

    #[test]
    fn test_process_sale_empty_cart() {
        let (_, terminal) = setup(0);
        let mut cart = Cart::new();
        let err = terminal
            .process_sale(&mut cart, PaymentMethod::Cash, 1000, &session())
            .unwrap_err();
        assert_eq!(err.to_string(), "Cart is empty");
    }

    #[test]
    fn test_process_sale_insufficient_payment() {
        let (_, terminal) = setup(0);
        let mut cart = Cart::new();
        terminal.scan(&mut cart, "123").unwrap();

        let err = terminal
            .process_sale(&mut cart, PaymentMethod::Card, 200, &session())
            .unwrap_err();
        assert!(err.to_string().contains("Insufficient payment"));
        // Cart survives a failed payment
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_process_sale_is_all_or_nothing() {
        let (ledger, terminal) = setup(0);
        let mut cart = Cart::new();
        terminal.scan(&mut cart, "123").unwrap();
        terminal.scan(&mut cart, "456").unwrap();
        terminal.update_quantity(&mut cart, "456", 2).unwrap(); // qty 3, all stock

        // Another till drains Chips stock between scan and payment
        let mut products: Vec<Product> = ledger.get_all(collections::PRODUCTS).unwrap();
        products[1].stock = 1;
        ledger.put_all(collections::PRODUCTS, &products).unwrap();

        let err = terminal
            .process_sale(&mut cart, PaymentMethod::Cash, 10_000, &session())
            .unwrap_err();
        assert!(err.to_string().contains("Insufficient stock"));

        // Nothing was deducted, not even the line that had enough stock
        let products: Vec<Product> = ledger.get_all(collections::PRODUCTS).unwrap();
        assert_eq!(products[0].stock, 5);
        assert_eq!(products[1].stock, 1);
        let sales: Vec<SaleRecord> = ledger.get_all(collections::SALES).unwrap();
        assert!(sales.is_empty());
    }

    #[test]
    fn test_failed_receipt_write_deducts_nothing() {
        let ledger = Ledger::new(Arc::new(SalesWriteFails(MemoryBackend::new())));
        Catalog::new(ledger.clone())
            .add(NewProduct {
                barcode: "123".to_string(),
                name: "Cola".to_string(),
                price_cents: 250,
                stock: 5,
                category: ProductCategory::Beverages,
            })
            .unwrap();
        let terminal = CheckoutTerminal::new(ledger.clone(), TerminalConfig::default());

        let mut cart = Cart::new();
        terminal.scan(&mut cart, "123").unwrap();
        assert!(terminal
            .process_sale(&mut cart, PaymentMethod::Cash, 250, &session())
            .is_err());

        // The deduction and the receipt land together or not at all
        let products: Vec<Product> = ledger.get_all(collections::PRODUCTS).unwrap();
        assert_eq!(products[0].stock, 5);
        assert!(!cart.is_empty());
    }

    #[test]
    fn test_stock_conserved_across_restocks_and_sales() {
        let (ledger, terminal) = setup(0);
        let engine = StockEngine::new(ledger.clone());

        let sell = |qty: i64| {
            let mut cart = Cart::new();
            terminal.scan(&mut cart, "123").unwrap();
            if qty > 1 {
                terminal.update_quantity(&mut cart, "123", qty - 1).unwrap();
            }
            terminal
                .process_sale(&mut cart, PaymentMethod::Cash, 10_000, &session())
                .unwrap();
        };

        // Cola starts at 5; interleave restocks and sales
        engine.restock("123", 10, "alice").unwrap(); // 15
        sell(3); // 12
        engine.restock("123", 2, "alice").unwrap(); // 14
        sell(4); // 10

        let products: Vec<Product> = ledger.get_all(collections::PRODUCTS).unwrap();
        assert_eq!(products[0].stock, 5 + 10 + 2 - 3 - 4);

        // Every movement is accounted for: two logs, two receipts
        assert_eq!(engine.history(Some("123")).unwrap().len(), 2);
        let sold: i64 = terminal
            .sales(None)
            .unwrap()
            .iter()
            .flat_map(|s| s.items.iter())
            .map(|i| i.quantity)
            .sum();
        assert_eq!(sold, 7);
    }

    #[test]
    fn test_sales_newest_first_and_store_filter() {
        let (_, terminal) = setup(0);

        for store in ["st1", "st2", "st1"] {
            let mut cart = Cart::new();
            terminal.scan(&mut cart, "123").unwrap();
            terminal
                .process_sale(
                    &mut cart,
                    PaymentMethod::Cash,
                    250,
                    &SessionContext::from_parts(store, "Store", "alice"),
                )
                .unwrap();
        }

        let all = terminal.sales(None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].store_id, "st1"); // last sale is first

        assert_eq!(terminal.sales(Some("st1")).unwrap().len(), 2);
        assert_eq!(terminal.sales(Some("st2")).unwrap().len(), 1);
    }

    #[test]
    fn test_find_receipt() {
        let (_, terminal) = setup(0);
        let mut cart = Cart::new();
        terminal.scan(&mut cart, "123").unwrap();
        let record = terminal
            .process_sale(&mut cart, PaymentMethod::Mobile, 250, &session())
            .unwrap();

        let found = terminal.find_receipt(&record.receipt_number).unwrap();
        assert_eq!(found.map(|s| s.id), Some(record.id));
        assert!(terminal.find_receipt("RCP-NOPE").unwrap().is_none());
    }

    #[test]
    fn test_receipt_numbers_distinct_within_one_millisecond() {
        let (_, terminal) = setup(0);
        let mut rng = StdRng::seed_from_u64(42);

        let numbers: std::collections::HashSet<String> = (0..10)
            .map(|_| terminal.receipt_number(1_700_000_000_000, &mut rng))
            .collect();
        // Same millisecond, ten draws: the random suffix keeps them apart
        assert_eq!(numbers.len(), 10);
    }

    #[test]
    fn test_receipt_number_format() {
        let (_, terminal) = setup(0);
        let number = terminal.receipt_number(1_700_000_000_000, &mut StdRng::seed_from_u64(1));
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "RCP");
        assert!(parts[1].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(parts[2].len(), 3);
    }
}
