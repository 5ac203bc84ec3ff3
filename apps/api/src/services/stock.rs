//! Manual stock movements: receiving, write-offs and count corrections.
//!
//! Each movement runs in its own unit of work and reclassifies the product.
//! Alerts go out after commit.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use teknoroma_core::validation::{validate_stock_level, validate_stock_quantity};
use teknoroma_core::CoreError;
use teknoroma_db::{Database, ProductRepository, StockChange};

use crate::error::ServiceResult;
use crate::services::notification::{publish_stock_alerts, Notifier};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockMovementRequest {
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockAdjustmentRequest {
    /// Absolute count on hand after the correction.
    pub units: i64,
}

#[derive(Clone)]
pub struct StockService {
    db: Database,
    notifier: Arc<dyn Notifier>,
}

impl StockService {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        StockService { db, notifier }
    }

    pub async fn increase(&self, product_id: &str, quantity: i64) -> ServiceResult<StockChange> {
        validate_stock_quantity("quantity", quantity)?;

        let mut uow = self.db.begin().await?;
        let change = ProductRepository::increment_stock_in(uow.conn(), product_id, quantity).await?;
        uow.commit().await?;

        info!(product_id = %product_id, quantity = quantity, units = change.units_in_stock, "Stock increased");
        Ok(self.published(change))
    }

    /// Fails with `InsufficientStock` instead of going below zero.
    pub async fn decrease(&self, product_id: &str, quantity: i64) -> ServiceResult<StockChange> {
        validate_stock_quantity("quantity", quantity)?;

        let mut uow = self.db.begin().await?;
        let product = ProductRepository::get_active_in(uow.conn(), product_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        let change = ProductRepository::decrement_stock_in(uow.conn(), product_id, quantity)
            .await?
            .ok_or_else(|| CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.units_in_stock,
                requested: quantity,
            })?;
        uow.commit().await?;

        info!(product_id = %product_id, quantity = quantity, units = change.units_in_stock, "Stock decreased");
        Ok(self.published(change))
    }

    pub async fn adjust(&self, product_id: &str, units: i64) -> ServiceResult<StockChange> {
        validate_stock_level("units", units)?;

        let mut uow = self.db.begin().await?;
        let change = ProductRepository::adjust_stock_in(uow.conn(), product_id, units).await?;
        uow.commit().await?;

        info!(
            product_id = %product_id,
            from = change.previous_units,
            to = change.units_in_stock,
            "Stock adjusted"
        );
        Ok(self.published(change))
    }

    fn published(&self, change: StockChange) -> StockChange {
        publish_stock_alerts(self.notifier.as_ref(), [&change]);
        change
    }
}
