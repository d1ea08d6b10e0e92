//! # Terminal Configuration
//!
//! Configuration for one register terminal, loadable from a TOML file
//! with sensible defaults for every field.
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! [pricing]
//! tax_rate_bps = 0       # placeholder rate; 825 = 8.25%
//!
//! [receipts]
//! prefix = "RCP"
//!
//! [restock]
//! window_days = 30
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use vela_core::{TaxRate, RESTOCK_WINDOW_DAYS};

/// Configuration load/parse errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct PricingSection {
    tax_rate_bps: u32,
}

impl Default for PricingSection {
    fn default() -> Self {
        // The placeholder rate the system ships with
        PricingSection { tax_rate_bps: 0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ReceiptSection {
    prefix: String,
}

impl Default for ReceiptSection {
    fn default() -> Self {
        ReceiptSection {
            prefix: "RCP".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct RestockSection {
    window_days: i64,
}

impl Default for RestockSection {
    fn default() -> Self {
        RestockSection {
            window_days: RESTOCK_WINDOW_DAYS,
        }
    }
}

/// Terminal configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pricing: PricingSection,
    receipts: ReceiptSection,
    restock: RestockSection,
}

impl TerminalConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.as_ref().display(), "Loaded terminal config");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// The tax rate applied at checkout.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.pricing.tax_rate_bps)
    }

    /// The receipt number prefix.
    pub fn receipt_prefix(&self) -> &str {
        &self.receipts.prefix
    }

    /// The restock observation window in days.
    pub fn restock_window_days(&self) -> i64 {
        self.restock.window_days
    }

    /// Builder-style override, mostly for tests and embedded setups.
    pub fn with_tax_rate_bps(mut self, bps: u32) -> Self {
        self.pricing.tax_rate_bps = bps;
        self
    }

    /// Builder-style override for the receipt prefix.
    pub fn with_receipt_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.receipts.prefix = prefix.into();
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
