//! Supplier deliveries: a numbered purchase record plus the stock it brings in,
//! committed together.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use tracing::info;

use teknoroma_core::validation::{validate_date_range, validate_price, validate_stock_quantity};
use teknoroma_core::{CoreError, DocumentKind, Money, SupplierTransaction, ValidationError, Visibility};
use teknoroma_db::repository::new_id;
use teknoroma_db::{
    Database, ProductRepository, SequenceRepository, StockChange, SupplierTransactionFilter,
    SupplierTransactionRepository,
};

use crate::error::ServiceResult;
use crate::services::catalog::clean;
use crate::services::notification::{publish_stock_alerts, Notifier};

#[derive(Debug, Clone, Deserialize)]
pub struct RecordDeliveryRequest {
    pub supplier_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub invoice_number: Option<String>,
    /// Defaults to now.
    pub transaction_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Delivery {
    pub transaction: SupplierTransaction,
    pub stock: StockChange,
}

#[derive(Clone)]
pub struct SupplierDeliveryService {
    db: Database,
    notifier: Arc<dyn Notifier>,
}

impl SupplierDeliveryService {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        SupplierDeliveryService { db, notifier }
    }

    pub async fn record(&self, req: RecordDeliveryRequest) -> ServiceResult<Delivery> {
        validate_stock_quantity("quantity", req.quantity)?;
        validate_price("unit_price", req.unit_price_cents)?;

        // the supplier lookup uses the pool, so it must run before the unit of work opens
        self.db
            .suppliers()
            .get_by_id(&req.supplier_id, Visibility::Active)
            .await?
            .ok_or_else(|| CoreError::not_found("Supplier", &req.supplier_id))?;

        let now = Utc::now();
        let date = req.transaction_date.unwrap_or(now);
        let total = Money::from_cents(req.unit_price_cents)
            .multiply_quantity(req.quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total".to_string(),
                min: 0,
                max: i64::MAX,
            })?;

        let mut uow = self.db.begin().await?;

        let transaction = SupplierTransaction {
            id: new_id(),
            transaction_number: SequenceRepository::next_in(uow.conn(), DocumentKind::SupplierTransaction, date.year())
                .await?,
            supplier_id: req.supplier_id,
            product_id: req.product_id,
            quantity: req.quantity,
            unit_price_cents: req.unit_price_cents,
            total_cents: total.cents(),
            transaction_date: date,
            invoice_number: clean(req.invoice_number),
            is_paid: false,
            is_deleted: false,
            created_at: now,
            modified_at: None,
        };

        let stock = ProductRepository::increment_stock_in(uow.conn(), &transaction.product_id, transaction.quantity)
            .await?;
        SupplierTransactionRepository::insert_in(uow.conn(), &transaction).await?;
        uow.commit().await?;

        info!(
            number = %transaction.transaction_number,
            product_id = %transaction.product_id,
            quantity = transaction.quantity,
            units = stock.units_in_stock,
            "Supplier delivery recorded"
        );
        publish_stock_alerts(self.notifier.as_ref(), [&stock]);

        Ok(Delivery { transaction, stock })
    }

    pub async fn get(&self, id: &str, visibility: Visibility) -> ServiceResult<SupplierTransaction> {
        Ok(self
            .db
            .supplier_transactions()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("SupplierTransaction", id))?)
    }

    pub async fn list(&self, filter: &SupplierTransactionFilter) -> ServiceResult<Vec<SupplierTransaction>> {
        validate_date_range(filter.from, filter.to)?;
        Ok(self.db.supplier_transactions().list(filter).await?)
    }

    pub async fn mark_paid(&self, id: &str) -> ServiceResult<SupplierTransaction> {
        if self.db.supplier_transactions().mark_paid(id).await? {
            info!(id = %id, "Supplier transaction paid");
        }
        self.get(id, Visibility::Active).await
    }
}
