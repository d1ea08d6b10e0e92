//! # Ledger Error Types
//!
//! Error types for persistence operations.
//!
//! ## Error Flow
//! ```text
//! serde_json::Error / std::io::Error
//!        │
//!        ▼
//! LedgerError (this module) ← adds the collection key as context
//!        │
//!        ▼
//! TerminalError (vela-terminal) ← what the UI layer branches on
//! ```

use thiserror::Error;

/// Persistence operation errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A collection failed to serialize before write.
    #[error("Failed to serialize collection '{collection}': {source}")]
    Serialize {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored collection failed to deserialize.
    ///
    /// ## When This Occurs
    /// - Blob written by an incompatible version
    /// - Hand-edited storage file
    #[error("Failed to deserialize collection '{collection}': {source}")]
    Deserialize {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    /// Underlying file I/O failed (FileBackend only).
    #[error("Ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing mutex was poisoned by a panicking writer.
    #[error("Ledger backend lock poisoned")]
    Poisoned,
}

impl LedgerError {
    pub(crate) fn serialize(collection: &str, source: serde_json::Error) -> Self {
        LedgerError::Serialize {
            collection: collection.to_string(),
            source,
        }
    }

    pub(crate) fn deserialize(collection: &str, source: serde_json::Error) -> Self {
        LedgerError::Deserialize {
            collection: collection.to_string(),
            source,
        }
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
