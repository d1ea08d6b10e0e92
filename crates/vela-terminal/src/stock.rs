//! # Stock Engine
//!
//! Restocks with an append-only audit trail, plus inter-store transfer
//! requests. Every stock mutation records who performed it and the
//! before/after levels so shrinkage investigations have a paper trail.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use vela_core::error::CoreError;
use vela_core::{Product, StockLog, StockTransfer, TransferStatus, ValidationError};
use vela_ledger::{collections, Ledger};

use crate::error::TerminalResult;

/// Input for an inter-store transfer request.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from_store_id: String,
    pub to_store_id: String,
    pub barcode: String,
    pub quantity: i64,
    pub requested_by: String,
}

/// The stock mutation component.
#[derive(Clone)]
pub struct StockEngine {
    ledger: Ledger,
}

impl StockEngine {
    pub fn new(ledger: Ledger) -> Self {
        StockEngine { ledger }
    }

    /// Adds `quantity` units to the product's stock and appends an audit
    /// log entry. The quantity must be strictly positive.
    pub fn restock(
        &self,
        barcode: &str,
        quantity: i64,
        performed_by: &str,
    ) -> TerminalResult<StockLog> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let mut products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;
        let product = products
            .iter_mut()
            .find(|p| p.barcode == barcode)
            .ok_or_else(|| CoreError::not_found("Product", barcode))?;

        let previous_stock = product.stock;
        product.stock += quantity;
        product.updated_at = Utc::now();

        let log = StockLog {
            id: Uuid::new_v4().to_string(),
            barcode: product.barcode.clone(),
            product_name: product.name.clone(),
            previous_stock,
            new_stock: product.stock,
            quantity_added: quantity,
            performed_by: performed_by.to_string(),
            timestamp: Utc::now(),
        };

        let mut logs: Vec<StockLog> = self.ledger.get_all(collections::STOCK_LOGS)?;
        logs.insert(0, log.clone());

        // One backend write: stock never moves without its audit entry
        self.ledger.put_all_pair(
            (collections::PRODUCTS, &products),
            (collections::STOCK_LOGS, &logs),
        )?;

        info!(
            barcode,
            quantity,
            new_stock = log.new_stock,
            performed_by,
            "Stock added"
        );
        Ok(log)
    }

    /// Returns the audit trail, newest first. A barcode filter narrows it
    /// to one product's history.
    pub fn history(&self, barcode: Option<&str>) -> TerminalResult<Vec<StockLog>> {
        let logs: Vec<StockLog> = self.ledger.get_all(collections::STOCK_LOGS)?;
        Ok(match barcode {
            Some(barcode) => logs.into_iter().filter(|l| l.barcode == barcode).collect(),
            None => logs,
        })
    }

    /// Records a transfer request between stores. The product must exist;
    /// stock does not move until the receiving side completes the
    /// transfer through its own restock flow.
    pub fn create_transfer(&self, request: TransferRequest) -> TerminalResult<StockTransfer> {
        if request.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        if request.from_store_id == request.to_store_id {
            return Err(CoreError::state("Transfer source and destination are the same").into());
        }

        let products: Vec<Product> = self.ledger.get_all(collections::PRODUCTS)?;
        let product = products
            .iter()
            .find(|p| p.barcode == request.barcode)
            .ok_or_else(|| CoreError::not_found("Product", &request.barcode))?;

        let transfer = StockTransfer {
            id: Uuid::new_v4().to_string(),
            from_store_id: request.from_store_id,
            to_store_id: request.to_store_id,
            barcode: product.barcode.clone(),
            product_name: product.name.clone(),
            quantity: request.quantity,
            status: TransferStatus::Pending,
            requested_by: request.requested_by,
            timestamp: Utc::now(),
            completed_at: None,
        };

        let mut transfers: Vec<StockTransfer> =
            self.ledger.get_all(collections::STOCK_TRANSFERS)?;
        transfers.insert(0, transfer.clone());
        self.ledger.put_all(collections::STOCK_TRANSFERS, &transfers)?;

        info!(id = %transfer.id, barcode = %transfer.barcode, "Transfer requested");
        Ok(transfer)
    }

    /// Marks a pending transfer completed.
    pub fn complete_transfer(&self, id: &str) -> TerminalResult<StockTransfer> {
        self.set_transfer_status(id, TransferStatus::Completed)
    }

    /// Cancels a pending transfer.
    pub fn cancel_transfer(&self, id: &str) -> TerminalResult<StockTransfer> {
        self.set_transfer_status(id, TransferStatus::Cancelled)
    }

    /// Lists transfers, optionally only those touching a given store.
    pub fn transfers(&self, store_id: Option<&str>) -> TerminalResult<Vec<StockTransfer>> {
        let transfers: Vec<StockTransfer> = self.ledger.get_all(collections::STOCK_TRANSFERS)?;
        Ok(match store_id {
            Some(store_id) => transfers
                .into_iter()
                .filter(|t| t.from_store_id == store_id || t.to_store_id == store_id)
                .collect(),
            None => transfers,
        })
    }

    fn set_transfer_status(
        &self,
        id: &str,
        status: TransferStatus,
    ) -> TerminalResult<StockTransfer> {
        let mut transfers: Vec<StockTransfer> = self.ledger.get_all(collections::STOCK_TRANSFERS)?;
        let transfer = transfers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("Transfer", id))?;

        if transfer.status != TransferStatus::Pending {
            return Err(CoreError::state(format!(
                "Transfer {id} is already {}",
                transfer.status
            ))
            .into());
        }

        transfer.status = status;
        if status == TransferStatus::Completed {
            transfer.completed_at = Some(Utc::now());
        }

        let updated = transfer.clone();
        self.ledger.put_all(collections::STOCK_TRANSFERS, &transfers)?;

        debug!(id, status = %updated.status, "Transfer status changed");
        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
