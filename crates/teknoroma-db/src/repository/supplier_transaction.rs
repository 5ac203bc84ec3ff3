//! # Supplier Transaction Repository

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::{SupplierTransaction, Visibility};

#[derive(Debug, Clone, Default)]
pub struct SupplierTransactionFilter {
    pub supplier_id: Option<String>,
    pub product_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone)]
pub struct SupplierTransactionRepository {
    pool: SqlitePool,
}

impl SupplierTransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierTransactionRepository { pool }
    }

    pub async fn insert_in(conn: &mut SqliteConnection, tx: &SupplierTransaction) -> DbResult<()> {
        debug!(id = %tx.id, number = %tx.transaction_number, "Recording supplier transaction");

        sqlx::query(
            r#"
            INSERT INTO supplier_transactions (
                id, transaction_number, supplier_id, product_id, quantity,
                unit_price_cents, total_cents, transaction_date, invoice_number,
                is_paid, is_deleted, created_at, modified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tx.id)
        .bind(&tx.transaction_number)
        .bind(&tx.supplier_id)
        .bind(&tx.product_id)
        .bind(tx.quantity)
        .bind(tx.unit_price_cents)
        .bind(tx.total_cents)
        .bind(tx.transaction_date)
        .bind(&tx.invoice_number)
        .bind(tx.is_paid)
        .bind(tx.is_deleted)
        .bind(tx.created_at)
        .bind(tx.modified_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<SupplierTransaction>> {
        let tx = sqlx::query_as::<_, SupplierTransaction>(
            "SELECT * FROM supplier_transactions WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(tx)
    }

    pub async fn list(&self, filter: &SupplierTransactionFilter) -> DbResult<Vec<SupplierTransaction>> {
        let txs = sqlx::query_as::<_, SupplierTransaction>(
            r#"
            SELECT * FROM supplier_transactions
            WHERE (? OR is_deleted = 0)
              AND (? IS NULL OR supplier_id = ?)
              AND (? IS NULL OR product_id = ?)
              AND (? IS NULL OR substr(transaction_date, 1, 10) >= ?)
              AND (? IS NULL OR substr(transaction_date, 1, 10) <= ?)
            ORDER BY transaction_date DESC
            "#,
        )
        .bind(filter.visibility.includes_deleted())
        .bind(&filter.supplier_id)
        .bind(&filter.supplier_id)
        .bind(&filter.product_id)
        .bind(&filter.product_id)
        .bind(filter.from)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(txs)
    }

    /// Marks an unpaid transaction as paid. `Ok(false)` if it already was.
    pub async fn mark_paid(&self, id: &str) -> DbResult<bool> {
        if self.get_by_id(id, Visibility::Active).await?.is_none() {
            return Err(DbError::not_found("SupplierTransaction", id));
        }

        let result = sqlx::query(
            r#"
            UPDATE supplier_transactions SET is_paid = 1, modified_at = ?
            WHERE id = ? AND is_deleted = 0 AND is_paid = 0
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
