//! # vela-terminal: Orchestration Layer for Vela POS
//!
//! Everything a register or back-office screen calls lives here. Each
//! component holds a clone of the same [`vela_ledger::Ledger`] handle and
//! exposes synchronous operations that either complete or fail with a
//! typed error; the worst case is a no-op on persisted state.
//!
//! ## Components
//!
//! - [`catalog`] - product CRUD, uniqueness rules, search/sort
//! - [`stock`] - restock with audit log, store-to-store transfer workflow
//! - [`cart`] - the ephemeral in-memory cart with stock-aware scanning
//! - [`checkout`] - the sale transaction pipeline (the core)
//! - [`reports`] - analytics facade over ledger snapshots
//! - [`staff`] - cashier/manager directory and authentication
//! - [`stores`] - store directory and current-store selection
//! - [`session`] - explicit session context passed into sale/report calls
//! - [`auth`] - credential hashing boundary (argon2)
//! - [`config`] - terminal configuration (tax rate, receipt prefix, ...)
//!
//! ## Error Handling
//! All fallible operations return [`TerminalResult`]. UI code branches on
//! the error and displays its `Display` text verbatim; nothing here
//! panics on bad input.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod reports;
pub mod session;
pub mod staff;
pub mod stock;
pub mod stores;

pub use auth::{ArgonHasher, CredentialHasher};
pub use cart::{Cart, CartItem};
pub use catalog::{Catalog, NewProduct, ProductSortKey, ProductUpdate};
pub use checkout::CheckoutTerminal;
pub use config::TerminalConfig;
pub use error::{TerminalError, TerminalResult};
pub use reports::Reports;
pub use session::SessionContext;
pub use staff::{NewStaff, StaffDirectory, StaffUpdate};
pub use stock::{StockEngine, TransferRequest};
pub use stores::{NewStore, StoreDirectory};
