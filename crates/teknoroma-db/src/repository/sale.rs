//! # Sale Repository
//!
//! Database operations for sales and sale details.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (one unit of work)                                          │
//! │     └── SequenceRepository::next_in()  → S-2024-00042                  │
//! │     └── insert_in()                    → Sale { status: Pending }      │
//! │     └── insert_detail_in() × N         → name/price snapshots          │
//! │     └── ProductRepository::decrement_stock_in() × N                    │
//! │                                                                         │
//! │  2. CONFIRM PAYMENT                                                    │
//! │     └── transition_in(Pending → Preparing)                             │
//! │                                                                         │
//! │  3. COMPLETE                                                           │
//! │     └── transition_in(Preparing → Completed)                           │
//! │                                                                         │
//! │  4. (OPTIONAL) CANCEL (one unit of work)                               │
//! │     └── transition_in(Pending|Preparing → Cancelled, reason)           │
//! │     └── ProductRepository::increment_stock_in() × N                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status updates are guarded by the expected current status, so two
//! concurrent cancellations cannot both restore stock.

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::{Sale, SaleDetail, SaleStatus, SaleWithDetails, Visibility};

/// Optional filters for listing sales. Dates are inclusive calendar days.
#[derive(Debug, Clone, Default)]
pub struct SaleFilter {
    pub store_id: Option<String>,
    pub employee_id: Option<String>,
    pub customer_id: Option<String>,
    pub status: Option<SaleStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub visibility: Visibility,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    pub async fn get_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>("SELECT * FROM sales WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(sale)
    }

    /// Gets a sale by its human-readable number.
    pub async fn get_by_number(&self, sale_number: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            "SELECT * FROM sales WHERE sale_number = ? AND is_deleted = 0",
        )
        .bind(sale_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale together with its lines.
    pub async fn get_with_details(&self, id: &str) -> DbResult<Option<SaleWithDetails>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let details = self.details(&sale.id).await?;
        Ok(Some(SaleWithDetails { sale, details }))
    }

    /// Lists sales matching the filter, newest first.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT * FROM sales
            WHERE (? OR is_deleted = 0)
              AND (? IS NULL OR store_id = ?)
              AND (? IS NULL OR employee_id = ?)
              AND (? IS NULL OR customer_id = ?)
              AND (? IS NULL OR status = ?)
              AND (? IS NULL OR substr(sale_date, 1, 10) >= ?)
              AND (? IS NULL OR substr(sale_date, 1, 10) <= ?)
            ORDER BY sale_date DESC, sale_number DESC
            "#,
        )
        .bind(filter.visibility.includes_deleted())
        .bind(&filter.store_id)
        .bind(&filter.store_id)
        .bind(&filter.employee_id)
        .bind(&filter.employee_id)
        .bind(&filter.customer_id)
        .bind(&filter.customer_id)
        .bind(filter.status)
        .bind(filter.status)
        .bind(filter.from)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets all lines of a sale, in insertion order.
    pub async fn details(&self, sale_id: &str) -> DbResult<Vec<SaleDetail>> {
        let details = sqlx::query_as::<_, SaleDetail>(
            "SELECT * FROM sale_details WHERE sale_id = ? ORDER BY created_at, rowid",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(details)
    }

    pub async fn details_in(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleDetail>> {
        let details = sqlx::query_as::<_, SaleDetail>(
            "SELECT * FROM sale_details WHERE sale_id = ? ORDER BY created_at, rowid",
        )
        .bind(sale_id)
        .fetch_all(conn)
        .await?;

        Ok(details)
    }

    /// Inserts a sale header.
    pub async fn insert_in(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, sale_number = %sale.sale_number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, sale_date, customer_id, employee_id, store_id,
                status, payment_type,
                subtotal_cents, tax_cents, discount_cents, total_cents,
                cancellation_reason, notes, is_deleted, created_at, modified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.sale_number)
        .bind(sale.sale_date)
        .bind(&sale.customer_id)
        .bind(&sale.employee_id)
        .bind(&sale.store_id)
        .bind(sale.status)
        .bind(sale.payment_type)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(&sale.cancellation_reason)
        .bind(&sale.notes)
        .bind(sale.is_deleted)
        .bind(sale.created_at)
        .bind(sale.modified_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts one sale line.
    ///
    /// ## Snapshot Pattern
    /// Product name and unit price are copied onto the line, so the sale
    /// history survives later catalog edits.
    pub async fn insert_detail_in(conn: &mut SqliteConnection, detail: &SaleDetail) -> DbResult<()> {
        debug!(sale_id = %detail.sale_id, product_id = %detail.product_id, "Adding sale detail");

        sqlx::query(
            r#"
            INSERT INTO sale_details (
                id, sale_id, product_id, product_name, unit_price_cents, quantity,
                discount_bps, subtotal_cents, discount_cents, total_cents, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&detail.id)
        .bind(&detail.sale_id)
        .bind(&detail.product_id)
        .bind(&detail.product_name)
        .bind(detail.unit_price_cents)
        .bind(detail.quantity)
        .bind(detail.discount_bps)
        .bind(detail.subtotal_cents)
        .bind(detail.discount_cents)
        .bind(detail.total_cents)
        .bind(detail.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Moves a sale from `from` to `to`, recording a cancellation reason if given.
    ///
    /// ## Returns
    /// * `Ok(true)` - the sale was in `from` and now is in `to`
    /// * `Ok(false)` - the sale is no longer in `from` (lost a race)
    pub async fn transition_in(
        conn: &mut SqliteConnection,
        id: &str,
        from: SaleStatus,
        to: SaleStatus,
        cancellation_reason: Option<&str>,
    ) -> DbResult<bool> {
        debug!(id = %id, from = %from, to = %to, "Changing sale status");

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                status = ?,
                cancellation_reason = COALESCE(?, cancellation_reason),
                modified_at = ?
            WHERE id = ? AND status = ? AND is_deleted = 0
            "#,
        )
        .bind(to)
        .bind(cancellation_reason)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Number of sales recorded (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Loads a sale and its lines inside a unit of work.
pub async fn load_with_details_in(conn: &mut SqliteConnection, id: &str) -> DbResult<SaleWithDetails> {
    let sale = SaleRepository::get_in(conn, id)
        .await?
        .ok_or_else(|| DbError::not_found("Sale", id))?;
    let details = SaleRepository::details_in(conn, id).await?;
    Ok(SaleWithDetails { sale, details })
}
