//! # Typed Ledger Facade
//!
//! [`Ledger`] is what the terminal layer actually holds: a cheaply
//! cloneable handle that serializes domain types in and out of a
//! [`LedgerBackend`]. It performs no validation - a `put_all` stores
//! whatever it is given, the way the storage contract demands.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::backend::{FileBackend, LedgerBackend, MemoryBackend};
use crate::error::{LedgerError, LedgerResult};

/// Collection key constants - one record collection per key.
pub mod collections {
    /// Array of Product, keyed by barcode uniqueness (enforced above).
    pub const PRODUCTS: &str = "products";
    /// Array of SaleRecord, newest-first.
    pub const SALES: &str = "sales";
    /// Array of StockLog, newest-first.
    pub const STOCK_LOGS: &str = "stock_logs";
    /// Array of Staff with the cashier role.
    pub const CASHIERS: &str = "cashiers";
    /// Array of Staff with the manager role.
    pub const MANAGERS: &str = "managers";
    /// Array of Store.
    pub const STORES: &str = "stores";
    /// Array of StockTransfer.
    pub const STOCK_TRANSFERS: &str = "stock_transfers";
    /// Singleton: id of the currently selected store.
    pub const CURRENT_STORE: &str = "current_store";
    /// Singleton: the logged-in back-office user, if any.
    pub const CURRENT_USER: &str = "current_user";
}

/// Typed handle over a shared backend.
#[derive(Clone)]
pub struct Ledger {
    backend: Arc<dyn LedgerBackend>,
}

impl Ledger {
    /// Wraps an existing backend.
    pub fn new(backend: Arc<dyn LedgerBackend>) -> Self {
        Ledger { backend }
    }

    /// Creates a ledger over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Ledger::new(Arc::new(MemoryBackend::new()))
    }

    /// Opens a ledger backed by a single JSON file.
    pub fn open_file(path: impl AsRef<std::path::Path>) -> LedgerResult<Self> {
        Ok(Ledger::new(Arc::new(FileBackend::open(path)?)))
    }

    /// Reads a whole collection. A missing key is an empty collection,
    /// not an error - a fresh ledger has no keys at all.
    pub fn get_all<T: DeserializeOwned>(&self, collection: &str) -> LedgerResult<Vec<T>> {
        match self.backend.read(collection)? {
            None => Ok(Vec::new()),
            Some(text) => {
                let items: Vec<T> = serde_json::from_str(&text)
                    .map_err(|e| LedgerError::deserialize(collection, e))?;
                debug!(collection, count = items.len(), "Ledger read");
                Ok(items)
            }
        }
    }

    /// Replaces a whole collection.
    pub fn put_all<T: Serialize>(&self, collection: &str, items: &[T]) -> LedgerResult<()> {
        let text =
            serde_json::to_string(items).map_err(|e| LedgerError::serialize(collection, e))?;
        debug!(collection, count = items.len(), "Ledger write");
        self.backend.write(collection, &text)
    }

    /// Replaces two collections in one backend step. Callers mutating a
    /// pair together (stock plus its audit log, catalog plus the sale
    /// that consumed it) use this so no failure exposes one without the
    /// other.
    pub fn put_all_pair<A: Serialize, B: Serialize>(
        &self,
        first: (&str, &[A]),
        second: (&str, &[B]),
    ) -> LedgerResult<()> {
        let (first_key, first_items) = first;
        let (second_key, second_items) = second;

        let first_text = serde_json::to_string(first_items)
            .map_err(|e| LedgerError::serialize(first_key, e))?;
        let second_text = serde_json::to_string(second_items)
            .map_err(|e| LedgerError::serialize(second_key, e))?;

        debug!(first = first_key, second = second_key, "Ledger pair write");
        self.backend
            .write_many(&[(first_key, &first_text), (second_key, &second_text)])
    }

    /// Reads a singleton key (e.g., `current_store`).
    pub fn get_one<T: DeserializeOwned>(&self, key: &str) -> LedgerResult<Option<T>> {
        match self.backend.read(key)? {
            None => Ok(None),
            Some(text) => {
                let value: T =
                    serde_json::from_str(&text).map_err(|e| LedgerError::deserialize(key, e))?;
                Ok(Some(value))
            }
        }
    }

    /// Writes a singleton key.
    pub fn put_one<T: Serialize>(&self, key: &str, value: &T) -> LedgerResult<()> {
        let text = serde_json::to_string(value).map_err(|e| LedgerError::serialize(key, e))?;
        self.backend.write(key, &text)
    }

    /// Clears a singleton key (logout, store deselection).
    pub fn clear_one(&self, key: &str) -> LedgerResult<()> {
        self.backend.remove(key)
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: String,
        qty: i64,
    }

    #[test]
    fn test_missing_collection_is_empty() {
        let ledger = Ledger::in_memory();
        let widgets: Vec<Widget> = ledger.get_all("widgets").unwrap();
        assert!(widgets.is_empty());
    }

    #[test]
    fn test_collection_roundtrip() {
        let ledger = Ledger::in_memory();
        let widgets = vec![
            Widget {
                id: "a".to_string(),
                qty: 1,
            },
            Widget {
                id: "b".to_string(),
                qty: 2,
            },
        ];

        ledger.put_all("widgets", &widgets).unwrap();
        let loaded: Vec<Widget> = ledger.get_all("widgets").unwrap();
        assert_eq!(loaded, widgets);
    }

    #[test]
    fn test_pair_write_stores_both_collections() {
        let ledger = Ledger::in_memory();
        let widgets = vec![Widget {
            id: "a".to_string(),
            qty: 1,
        }];
        let gadgets = vec![Widget {
            id: "g".to_string(),
            qty: 9,
        }];

        ledger
            .put_all_pair(("widgets", &widgets), ("gadgets", &gadgets))
            .unwrap();

        assert_eq!(ledger.get_all::<Widget>("widgets").unwrap(), widgets);
        assert_eq!(ledger.get_all::<Widget>("gadgets").unwrap(), gadgets);
    }

    #[test]
    fn test_singleton_roundtrip() {
        let ledger = Ledger::in_memory();

        assert_eq!(
            ledger.get_one::<String>(collections::CURRENT_STORE).unwrap(),
            None
        );

        ledger
            .put_one(collections::CURRENT_STORE, &"store-1".to_string())
            .unwrap();
        assert_eq!(
            ledger
                .get_one::<String>(collections::CURRENT_STORE)
                .unwrap()
                .as_deref(),
            Some("store-1")
        );

        ledger.clear_one(collections::CURRENT_STORE).unwrap();
        assert_eq!(
            ledger.get_one::<String>(collections::CURRENT_STORE).unwrap(),
            None
        );
    }

    #[test]
    fn test_clones_share_the_backend() {
        let ledger = Ledger::in_memory();
        let clone = ledger.clone();

        ledger
            .put_all(
                "widgets",
                &[Widget {
                    id: "a".to_string(),
                    qty: 1,
                }],
            )
            .unwrap();

        let seen: Vec<Widget> = clone.get_all("widgets").unwrap();
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_corrupt_collection_reports_deserialize_error() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("widgets", "not json").unwrap();

        let ledger = Ledger::new(backend);
        let err = ledger.get_all::<Widget>("widgets").unwrap_err();
        assert!(matches!(err, LedgerError::Deserialize { .. }));
    }
}
