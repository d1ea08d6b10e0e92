//! # Product Catalog
//!
//! CRUD, uniqueness rules and search/sort over the product collection.
//! The ledger below never validates; every rule is enforced here so it
//! holds regardless of which screen performs the mutation.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use vela_core::error::CoreError;
use vela_core::validation::{
    validate_barcode, validate_price_cents, validate_product_name, validate_search_query,
    validate_stock,
};
use vela_core::{Product, ProductCategory, SaleRecord, ValidationError};
use vela_ledger::{collections, Ledger};

use crate::error::TerminalResult;

/// Sort keys for catalog tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortKey {
    Name,
    Price,
    Stock,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    pub price_cents: i64,
    pub stock: i64,
    pub category: ProductCategory,
}

/// Partial update for an existing product. `None` fields are untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// Renaming the barcode re-checks uniqueness.
    pub barcode: Option<String>,
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub category: Option<ProductCategory>,
}

/// The product catalog component.
#[derive(Clone)]
pub struct Catalog {
    ledger: Ledger,
}

impl Catalog {
    pub fn new(ledger: Ledger) -> Self {
        Catalog { ledger }
    }

    /// Adds a product. The barcode must be globally unique.
    pub fn add(&self, new: NewProduct) -> TerminalResult<Product> {
        validate_barcode(&new.barcode)?;
        validate_product_name(&new.name)?;
        validate_price_cents(new.price_cents)?;
        validate_stock(new.stock)?;

        let mut products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;

        if products.iter().any(|p| p.barcode == new.barcode) {
            return Err(ValidationError::duplicate("barcode", &new.barcode).into());
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            barcode: new.barcode,
            name: new.name,
            price_cents: new.price_cents,
            stock: new.stock,
            category: new.category,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        products.push(product.clone());
        self.ledger.put_all(collections::PRODUCTS, &products)?;

        info!(barcode = %product.barcode, name = %product.name, "Product added");
        Ok(product)
    }

    /// Applies a partial update to the product with the given barcode.
    pub fn update(&self, barcode: &str, update: ProductUpdate) -> TerminalResult<Product> {
        let mut products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;

        let index = products
            .iter()
            .position(|p| p.barcode == barcode)
            .ok_or_else(|| CoreError::not_found("Product", barcode))?;

        if let Some(new_barcode) = &update.barcode {
            validate_barcode(new_barcode)?;
            if new_barcode != barcode && products.iter().any(|p| &p.barcode == new_barcode) {
                return Err(ValidationError::duplicate("barcode", new_barcode).into());
            }
        }
        if let Some(name) = &update.name {
            validate_product_name(name)?;
        }
        if let Some(price) = update.price_cents {
            validate_price_cents(price)?;
        }
        if let Some(stock) = update.stock {
            validate_stock(stock)?;
        }

        let product = &mut products[index];
        if let Some(new_barcode) = update.barcode {
            product.barcode = new_barcode;
        }
        if let Some(name) = update.name {
            product.name = name;
        }
        if let Some(price) = update.price_cents {
            product.price_cents = price;
        }
        if let Some(stock) = update.stock {
            product.stock = stock;
        }
        if let Some(category) = update.category {
            product.category = category;
        }
        product.updated_at = Utc::now();

        let updated = product.clone();
        self.ledger.put_all(collections::PRODUCTS, &products)?;

        debug!(barcode = %updated.barcode, "Product updated");
        Ok(updated)
    }

    /// Deletes a product.
    ///
    /// Fails when any sale references the barcode: historical receipts
    /// snapshot product data, but the referenced catalog row is kept so
    /// back-office drill-downs keep resolving.
    pub fn delete(&self, barcode: &str) -> TerminalResult<()> {
        let mut products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;

        if !products.iter().any(|p| p.barcode == barcode) {
            return Err(CoreError::not_found("Product", barcode).into());
        }

        let sales: Vec<SaleRecord> = self.ledger.get_all(collections::SALES)?;
        let referencing = sales
            .iter()
            .filter(|s| s.items.iter().any(|i| i.barcode == barcode))
            .count();
        if referencing > 0 {
            return Err(CoreError::state(format!(
                "Product {barcode} is referenced by {referencing} sales"
            ))
            .into());
        }

        products.retain(|p| p.barcode != barcode);
        self.ledger.put_all(collections::PRODUCTS, &products)?;

        info!(barcode, "Product deleted");
        Ok(())
    }

    /// Looks up a product by barcode.
    pub fn get(&self, barcode: &str) -> TerminalResult<Option<Product>> {
        let products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;
        Ok(products.into_iter().find(|p| p.barcode == barcode))
    }

    /// Returns the whole catalog in stored order.
    pub fn list(&self) -> TerminalResult<Vec<Product>> {
        Ok(self.ledger.get_all(collections::PRODUCTS)?)
    }

    /// Case-insensitive substring search over name and barcode. An empty
    /// query lists everything.
    pub fn search(&self, query: &str) -> TerminalResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        let products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;

        if query.is_empty() {
            return Ok(products);
        }

        let needle = query.to_lowercase();
        Ok(products
            .into_iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.barcode.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Returns the catalog sorted by the given key (ascending; name sort
    /// is case-insensitive).
    pub fn list_sorted(&self, key: ProductSortKey) -> TerminalResult<Vec<Product>> {
        let mut products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;
        match key {
            ProductSortKey::Name => {
                products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            }
            ProductSortKey::Price => products.sort_by_key(|p| p.price_cents),
            ProductSortKey::Stock => products.sort_by_key(|p| p.stock),
        }
        Ok(products)
    }

    /// Active products with stock below `threshold`.
    pub fn low_stock(&self, threshold: i64) -> TerminalResult<Vec<Product>> {
        let products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;
        Ok(products
            .into_iter()
            .filter(|p| p.is_active && p.stock < threshold)
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::PaymentMethod;
    use vela_core::SaleItem;

    fn catalog() -> Catalog {
        Catalog::new(Ledger::in_memory())
    }

    fn new_product(barcode: &str, name: &str, price_cents: i64, stock: i64) -> NewProduct {
        NewProduct {
            barcode: barcode.to_string(),
            name: name.to_string(),
            price_cents,
            stock,
            category: ProductCategory::Groceries,
        }
    }

    #[test]
    fn test_add_and_get() {
        let catalog = catalog();
        catalog.add(new_product("123", "Cola", 250, 5)).unwrap();

        let product = catalog.get("123").unwrap().unwrap();
        assert_eq!(product.name, "Cola");
        assert_eq!(product.stock, 5);
        assert!(product.is_active);
    }

    #[test]
    fn test_add_rejects_duplicate_barcode() {
        let catalog = catalog();
        catalog.add(new_product("123", "Cola", 250, 5)).unwrap();

        let err = catalog.add(new_product("123", "Other", 100, 1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: barcode '123' already exists"
        );
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let catalog = catalog();
        assert!(catalog.add(new_product("", "Cola", 250, 5)).is_err());
        assert!(catalog.add(new_product("123", "", 250, 5)).is_err());
        assert!(catalog.add(new_product("123", "Cola", 0, 5)).is_err());
        assert!(catalog.add(new_product("123", "Cola", 250, -1)).is_err());
    }

    #[test]
    fn test_update_fields_and_barcode_uniqueness() {
        let catalog = catalog();
        catalog.add(new_product("123", "Cola", 250, 5)).unwrap();
        catalog.add(new_product("456", "Chips", 150, 3)).unwrap();

        let updated = catalog
            .update(
                "123",
                ProductUpdate {
                    price_cents: Some(300),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price_cents, 300);

        // Renaming onto an existing barcode is rejected
        let err = catalog
            .update(
                "123",
                ProductUpdate {
                    barcode: Some("456".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_update_unknown_barcode() {
        let catalog = catalog();
        let err = catalog.update("nope", ProductUpdate::default()).unwrap_err();
        assert_eq!(err.to_string(), "Product not found: nope");
    }

    #[test]
    fn test_delete_blocked_by_sale_reference() {
        let ledger = Ledger::in_memory();
        let catalog = Catalog::new(ledger.clone());
        catalog.add(new_product("123", "Cola", 250, 5)).unwrap();

        let sale = SaleRecord {
            id: "s1".to_string(),
            receipt_number: "RCP-1".to_string(),
            items: vec![SaleItem {
                barcode: "123".to_string(),
                name: "Cola".to_string(),
                price_cents: 250,
                quantity: 1,
                total_cents: 250,
            }],
            subtotal_cents: 250,
            tax_cents: 0,
            total_cents: 250,
            payment_method: PaymentMethod::Cash,
            amount_paid_cents: 250,
            change_cents: 0,
            cashier_name: "alice".to_string(),
            store_id: "st1".to_string(),
            store_name: "Downtown".to_string(),
            timestamp: Utc::now(),
        };
        ledger.put_all(collections::SALES, &[sale]).unwrap();

        let err = catalog.delete("123").unwrap_err();
        assert!(err.to_string().contains("referenced by 1 sales"));
        assert!(catalog.get("123").unwrap().is_some());
    }

    #[test]
    fn test_delete_unreferenced_product() {
        let catalog = catalog();
        catalog.add(new_product("123", "Cola", 250, 5)).unwrap();

        catalog.delete("123").unwrap();
        assert!(catalog.get("123").unwrap().is_none());
        assert!(catalog.delete("123").is_err());
    }

    #[test]
    fn test_search_matches_name_and_barcode() {
        let catalog = catalog();
        catalog.add(new_product("1001", "Cola 330ml", 250, 5)).unwrap();
        catalog.add(new_product("1002", "Diet Cola", 250, 5)).unwrap();
        catalog.add(new_product("2001", "Chips", 150, 3)).unwrap();

        assert_eq!(catalog.search("cola").unwrap().len(), 2);
        assert_eq!(catalog.search("100").unwrap().len(), 2);
        assert_eq!(catalog.search("").unwrap().len(), 3);
        assert!(catalog.search("zzz").unwrap().is_empty());
    }

    #[test]
    fn test_list_sorted() {
        let catalog = catalog();
        catalog.add(new_product("1", "banana", 300, 2)).unwrap();
        catalog.add(new_product("2", "Apple", 100, 9)).unwrap();

        let by_name = catalog.list_sorted(ProductSortKey::Name).unwrap();
        assert_eq!(by_name[0].name, "Apple");

        let by_price = catalog.list_sorted(ProductSortKey::Price).unwrap();
        assert_eq!(by_price[0].price_cents, 100);

        let by_stock = catalog.list_sorted(ProductSortKey::Stock).unwrap();
        assert_eq!(by_stock[0].stock, 2);
    }

    #[test]
    fn test_low_stock() {
        let catalog = catalog();
        catalog.add(new_product("1", "A", 100, 2)).unwrap();
        catalog.add(new_product("2", "B", 100, 50)).unwrap();

        let low = catalog.low_stock(10).unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].barcode, "1");
    }
}
