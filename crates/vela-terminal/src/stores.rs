//! Store registry and current-store selection.

use tracing::info;
use uuid::Uuid;

use vela_core::error::CoreError;
use vela_core::validation::validate_business_key;
use vela_core::{Store, ValidationError};
use vela_ledger::{collections, Ledger};

use crate::error::TerminalResult;

/// Input for registering a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    /// Short store code shown on receipts, unique across the chain.
    pub code: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// The store management component.
#[derive(Clone)]
pub struct StoreDirectory {
    ledger: Ledger,
}

impl StoreDirectory {
    pub fn new(ledger: Ledger) -> Self {
        StoreDirectory { ledger }
    }

    /// Registers a store. The code must be unique.
    pub fn add(&self, new: NewStore) -> TerminalResult<Store> {
        validate_business_key("code", &new.code)?;
        validate_business_key("name", &new.name)?;

        let mut stores: Vec<Store> = self.ledger.get_all(collections::STORES)?;
        if stores.iter().any(|s| s.code == new.code) {
            return Err(ValidationError::duplicate("code", &new.code).into());
        }

        let store = Store {
            id: Uuid::new_v4().to_string(),
            code: new.code,
            name: new.name,
            address: new.address,
            phone: new.phone,
            email: new.email,
            is_active: true,
        };

        stores.push(store.clone());
        self.ledger.put_all(collections::STORES, &stores)?;

        info!(code = %store.code, name = %store.name, "Store registered");
        Ok(store)
    }

    pub fn list(&self) -> TerminalResult<Vec<Store>> {
        Ok(self.ledger.get_all(collections::STORES)?)
    }

    pub fn get(&self, code: &str) -> TerminalResult<Option<Store>> {
        let stores: Vec<Store> = self.ledger.get_all(collections::STORES)?;
        Ok(stores.into_iter().find(|s| s.code == code))
    }

    /// Makes a store the terminal's current store. Inactive stores
    /// cannot be selected.
    pub fn select_current(&self, code: &str) -> TerminalResult<Store> {
        let store = self
            .get(code)?
            .ok_or_else(|| CoreError::not_found("Store", code))?;
        if !store.is_active {
            return Err(CoreError::state(format!("Store {code} is inactive")).into());
        }

        self.ledger.put_one(collections::CURRENT_STORE, &store)?;
        info!(code, "Current store selected");
        Ok(store)
    }

    /// The store this terminal is operating as, if one was selected.
    pub fn current(&self) -> TerminalResult<Option<Store>> {
        Ok(self.ledger.get_one(collections::CURRENT_STORE)?)
    }

    /// Reactivates a previously deactivated store.
    pub fn reactivate(&self, code: &str) -> TerminalResult<Store> {
        let mut stores: Vec<Store> = self.ledger.get_all(collections::STORES)?;
        let store = stores
            .iter_mut()
            .find(|s| s.code == code)
            .ok_or_else(|| CoreError::not_found("Store", code))?;

        store.is_active = true;
        let updated = store.clone();
        self.ledger.put_all(collections::STORES, &stores)?;

        info!(code, "Store reactivated");
        Ok(updated)
    }

    /// Deactivates a store. Historical receipts keep its snapshot; if it
    /// was the current store the selection is cleared.
    pub fn deactivate(&self, code: &str) -> TerminalResult<Store> {
        let mut stores: Vec<Store> = self.ledger.get_all(collections::STORES)?;
        let store = stores
            .iter_mut()
            .find(|s| s.code == code)
            .ok_or_else(|| CoreError::not_found("Store", code))?;

        store.is_active = false;
        let updated = store.clone();
        self.ledger.put_all(collections::STORES, &stores)?;

        if let Some(current) = self.current()? {
            if current.code == code {
                self.ledger.clear_one(collections::CURRENT_STORE)?;
            }
        }

        info!(code, "Store deactivated");
        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
