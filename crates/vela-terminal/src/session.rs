//! # Session Context
//!
//! The explicit context object passed into checkout and report calls.
//!
//! There is no ambient "current store" read inside the pipeline: callers
//! build a context at login / store selection and hand it to each
//! operation, which keeps the core UI-framework-agnostic and testable.

use serde::{Deserialize, Serialize};

use vela_core::{Staff, Store};

/// Who is operating which store right now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub store_id: String,
    pub store_name: String,
    pub cashier_name: String,
}

impl SessionContext {
    /// Builds a session from a selected store and a logged-in cashier.
    pub fn new(store: &Store, cashier: &Staff) -> Self {
        SessionContext {
            store_id: store.id.clone(),
            store_name: store.name.clone(),
            cashier_name: cashier.name.clone(),
        }
    }

    /// Builds a session from raw parts (tests, kiosk setups without a
    /// staff directory).
    pub fn from_parts(
        store_id: impl Into<String>,
        store_name: impl Into<String>,
        cashier_name: impl Into<String>,
    ) -> Self {
        SessionContext {
            store_id: store_id.into(),
            store_name: store_name.into(),
            cashier_name: cashier_name.into(),
        }
    }
}
