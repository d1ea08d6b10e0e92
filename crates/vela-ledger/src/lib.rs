//! # vela-ledger: Ledger Store for Vela POS
//!
//! Key/value persistence over the POS collections: one blob of JSON
//! arrays keyed by collection name, synchronous reads and writes, at
//! most one writer at a time.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Vela POS Data Flow                                │
//! │                                                                         │
//! │  vela-terminal (catalog / stock / checkout / reports)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   vela-ledger (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐        ┌──────────────────────────────┐     │    │
//! │  │   │    Ledger     │        │        LedgerBackend         │     │    │
//! │  │   │  (store.rs)   │───────►│  MemoryBackend │ FileBackend │     │    │
//! │  │   │ typed get/put │        │   (HashMap)    │ (JSON file) │     │    │
//! │  │   └───────────────┘        └──────────────────────────────┘     │    │
//! │  │                                                                 │    │
//! │  │   NO VALIDATION - serialize in, deserialize out                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - The `LedgerBackend` trait and its two implementations
//! - [`store`] - The typed `Ledger` facade and collection key constants
//! - [`error`] - Persistence error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod error;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::{FileBackend, LedgerBackend, MemoryBackend};
pub use error::{LedgerError, LedgerResult};
pub use store::{collections, Ledger};
