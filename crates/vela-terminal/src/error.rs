//! # Terminal Error Type
//!
//! The error the UI layer sees: either a business rule violation from
//! vela-core or a persistence failure from vela-ledger. Both carry a
//! user-displayable `Display` message.

use thiserror::Error;

use vela_core::CoreError;
use vela_ledger::LedgerError;

/// Top-level error for terminal operations.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Business rule violation (insufficient stock, empty cart, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Persistence failure (serialization, I/O).
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<vela_core::ValidationError> for TerminalError {
    fn from(err: vela_core::ValidationError) -> Self {
        TerminalError::Core(CoreError::Validation(err))
    }
}

/// Result type for terminal operations.
pub type TerminalResult<T> = Result<T, TerminalError>;
