//! # Product Repository
//!
//! Database operations for products, including every stock mutation.
//!
//! ## Guarded Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Why the check lives in the UPDATE itself                   │
//! │                                                                         │
//! │  ❌ read units, check in Rust, write units - 1                         │
//! │     Two cashiers both read 1 unit, both sell it → stock −1             │
//! │                                                                         │
//! │  ✅ UPDATE products                                                     │
//! │       SET units_in_stock = units_in_stock - :qty,                      │
//! │           version = version + 1                                        │
//! │     WHERE id = :id AND units_in_stock >= :qty                          │
//! │                                                                         │
//! │     0 rows affected → somebody else took the stock → InsufficientStock │
//! │     1 row affected  → reclassify stock_status in the same transaction  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::stock::{classify, needs_alert};
use teknoroma_core::{Product, StockStatus, Visibility};

// =============================================================================
// Stock Change
// =============================================================================

/// The before/after picture of one stock mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockChange {
    pub product_id: String,
    pub product_name: String,
    pub previous_units: i64,
    pub units_in_stock: i64,
    pub critical_stock_level: i64,
    pub previous_status: StockStatus,
    pub stock_status: StockStatus,
    pub version: i64,
}

impl StockChange {
    /// Whether this change pushed the product into a worse stock band.
    pub fn needs_alert(&self) -> bool {
        needs_alert(self.previous_status, self.stock_status)
    }
}

/// Optional list filters for products.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub stock_status: Option<StockStatus>,
    pub visibility: Visibility,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let results = repo.search("laptop", 20).await?;
/// let product = repo.get_by_id("uuid-here", Visibility::Active).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// `stock_status` is always derived from the stock fields, whatever the
    /// caller put in it.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - barcode already used by an active product
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, barcode = %product.barcode, "Inserting product");

        let mut product = product.clone();
        product.stock_status = classify(product.units_in_stock, product.critical_stock_level);
        product.version = 1;
        product.created_at = Utc::now();
        product.modified_at = None;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, barcode, description, unit_price_cents,
                units_in_stock, critical_stock_level, stock_status,
                category_id, supplier_id, is_active, version,
                is_deleted, created_at, modified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(product.unit_price_cents)
        .bind(product.units_in_stock)
        .bind(product.critical_stock_level)
        .bind(product.stock_status)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.is_active)
        .bind(product.version)
        .bind(product.is_deleted)
        .bind(product.created_at)
        .bind(product.modified_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &product.barcode),
            other => other,
        })?;

        Ok(product)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a non-deleted product inside a unit of work.
    pub async fn get_active_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ? AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(product)
    }

    /// Gets the active product with this barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE barcode = ? AND is_deleted = 0",
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists products matching the filter, ordered by name.
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE (? OR is_deleted = 0)
              AND (? IS NULL OR category_id = ?)
              AND (? IS NULL OR supplier_id = ?)
              AND (? IS NULL OR stock_status = ?)
            ORDER BY name
            "#,
        )
        .bind(filter.visibility.includes_deleted())
        .bind(&filter.category_id)
        .bind(&filter.category_id)
        .bind(&filter.supplier_id)
        .bind(&filter.supplier_id)
        .bind(filter.stock_status)
        .bind(filter.stock_status)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Active products that are Critical or OutOfStock, worst first.
    pub async fn list_critical(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_deleted = 0 AND is_active = 1
              AND stock_status IN ('critical', 'out_of_stock')
            ORDER BY units_in_stock, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Substring search over name and barcode (case-insensitive for ASCII).
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        let pattern = format!("%{}%", escape_like(query));

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_deleted = 0
              AND (name LIKE ? ESCAPE '\' OR barcode LIKE ? ESCAPE '\')
            ORDER BY name
            LIMIT ?
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Updates catalog fields of an active product.
    ///
    /// Stock on hand is not touched here (use the stock functions); a new
    /// critical level is reclassified in the same transaction.
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, "Updating product");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?, barcode = ?, description = ?, unit_price_cents = ?,
                critical_stock_level = ?, category_id = ?, supplier_id = ?,
                is_active = ?, modified_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.description)
        .bind(product.unit_price_cents)
        .bind(product.critical_stock_level)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.is_active)
        .bind(Utc::now())
        .bind(&product.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &product.barcode),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Self::reclassify_in(&mut tx, &product.id).await?;
        let updated = Self::get_active_in(&mut tx, &product.id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", &product.id))?;

        tx.commit().await?;
        Ok(updated)
    }

    // -------------------------------------------------------------------------
    // Stock mutations (always inside a unit of work)
    // -------------------------------------------------------------------------

    /// Takes `quantity` units out of stock if that many are on hand.
    ///
    /// ## Returns
    /// * `Ok(Some(change))` - stock decremented and reclassified
    /// * `Ok(None)` - not enough stock; nothing changed
    /// * `Err(DbError::NotFound)` - product missing or soft-deleted
    pub async fn decrement_stock_in(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<Option<StockChange>> {
        debug!(id = %id, quantity = quantity, "Decrementing stock");

        let before = Self::get_active_in(conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products SET
                units_in_stock = units_in_stock - ?,
                version = version + 1,
                modified_at = ?
            WHERE id = ? AND is_deleted = 0 AND units_in_stock >= ?
            RETURNING units_in_stock
            "#,
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .bind(quantity)
        .fetch_optional(&mut *conn)
        .await?;

        if remaining.is_none() {
            debug!(id = %id, available = before.units_in_stock, "Stock guard rejected decrement");
            return Ok(None);
        }

        Self::finish_change(conn, before).await.map(Some)
    }

    /// Puts `quantity` units back into stock (cancellations, deliveries).
    pub async fn increment_stock_in(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<StockChange> {
        debug!(id = %id, quantity = quantity, "Incrementing stock");

        let before = Self::get_active_in(conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        sqlx::query(
            r#"
            UPDATE products SET
                units_in_stock = units_in_stock + ?,
                version = version + 1,
                modified_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Self::finish_change(conn, before).await
    }

    /// Sets stock to an absolute count (manual correction after a count).
    pub async fn adjust_stock_in(
        conn: &mut SqliteConnection,
        id: &str,
        units: i64,
    ) -> DbResult<StockChange> {
        debug!(id = %id, units = units, "Adjusting stock");

        let before = Self::get_active_in(conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        sqlx::query(
            r#"
            UPDATE products SET
                units_in_stock = ?,
                version = version + 1,
                modified_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(units)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Self::finish_change(conn, before).await
    }

    /// Reclassifies and reports the change relative to `before`.
    async fn finish_change(conn: &mut SqliteConnection, before: Product) -> DbResult<StockChange> {
        let after = Self::reclassify_in(conn, &before.id).await?;

        Ok(StockChange {
            product_id: before.id,
            product_name: before.name,
            previous_units: before.units_in_stock,
            units_in_stock: after.units_in_stock,
            critical_stock_level: after.critical_stock_level,
            previous_status: before.stock_status,
            stock_status: after.stock_status,
            version: after.version,
        })
    }

    /// Writes `classify(units, critical)` into `stock_status` and returns the row.
    pub async fn reclassify_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Product> {
        let mut product = Self::get_active_in(conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let status = classify(product.units_in_stock, product.critical_stock_level);
        if status != product.stock_status {
            sqlx::query("UPDATE products SET stock_status = ? WHERE id = ?")
                .bind(status)
                .bind(id)
                .execute(&mut *conn)
                .await?;
            product.stock_status = status;
        }

        Ok(product)
    }

    /// Soft-deletes a product. Historical sale lines keep their snapshot.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "products", "Product", id, true).await
    }

    pub async fn restore(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "products", "Product", id, false).await
    }

    /// Counts non-deleted products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_deleted = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::new_id;

    fn product(barcode: &str, units: i64, critical: i64) -> Product {
        Product {
            id: new_id(),
            name: format!("Product {barcode}"),
            barcode: barcode.to_string(),
            description: None,
            unit_price_cents: 10_000,
            units_in_stock: units,
            critical_stock_level: critical,
            // deliberately wrong; insert must derive it
            stock_status: StockStatus::Sufficient,
            category_id: None,
            supplier_id: None,
            is_active: true,
            version: 0,
            is_deleted: false,
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_classifies() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().insert(&product("111", 0, 5)).await.unwrap();
        assert_eq!(p.stock_status, StockStatus::OutOfStock);

        let stored = db.products().get_by_id(&p.id, Visibility::Active).await.unwrap().unwrap();
        assert!(stored.status_is_consistent());
    }

    #[tokio::test]
    async fn test_guarded_decrement() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().insert(&product("222", 3, 1)).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        let rejected = ProductRepository::decrement_stock_in(uow.conn(), &p.id, 5).await.unwrap();
        assert!(rejected.is_none());

        let change = ProductRepository::decrement_stock_in(uow.conn(), &p.id, 2)
            .await
            .unwrap()
            .unwrap();
        uow.commit().await.unwrap();

        assert_eq!(change.previous_units, 3);
        assert_eq!(change.units_in_stock, 1);
        assert_eq!(change.stock_status, StockStatus::Critical);
        assert_eq!(change.version, 2);
        assert!(change.needs_alert());
    }

    #[tokio::test]
    async fn test_increment_and_adjust_reclassify() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().insert(&product("333", 0, 2)).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        let up = ProductRepository::increment_stock_in(uow.conn(), &p.id, 10).await.unwrap();
        assert_eq!(up.stock_status, StockStatus::Sufficient);
        assert!(!up.needs_alert());

        let adj = ProductRepository::adjust_stock_in(uow.conn(), &p.id, 2).await.unwrap();
        assert_eq!(adj.units_in_stock, 2);
        assert_eq!(adj.stock_status, StockStatus::Critical);
        uow.commit().await.unwrap();

        let stored = db.products().get_by_id(&p.id, Visibility::Active).await.unwrap().unwrap();
        assert_eq!(stored.version, 3);
        assert!(stored.status_is_consistent());
    }

    #[tokio::test]
    async fn test_update_critical_level_reclassifies() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut p = db.products().insert(&product("444", 5, 1)).await.unwrap();
        assert_eq!(p.stock_status, StockStatus::Sufficient);

        p.critical_stock_level = 10;
        let updated = db.products().update(&p).await.unwrap();
        assert_eq!(updated.stock_status, StockStatus::Critical);
    }

    #[tokio::test]
    async fn test_search_and_critical_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.insert(&product("8690001", 50, 5)).await.unwrap();
        repo.insert(&product("8690002", 2, 5)).await.unwrap();
        repo.insert(&product("5550003", 0, 5)).await.unwrap();

        assert_eq!(repo.search("869", 10).await.unwrap().len(), 2);
        assert_eq!(repo.search("100%", 10).await.unwrap().len(), 0);

        let critical = repo.list_critical().await.unwrap();
        assert_eq!(critical.len(), 2);
        assert_eq!(critical[0].units_in_stock, 0);

        let filter = ProductFilter {
            stock_status: Some(StockStatus::Sufficient),
            ..Default::default()
        };
        assert_eq!(repo.list(&filter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_product_cannot_be_decremented() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p = db.products().insert(&product("555", 5, 1)).await.unwrap();
        db.products().soft_delete(&p.id).await.unwrap();

        let mut uow = db.begin().await.unwrap();
        let err = ProductRepository::decrement_stock_in(uow.conn(), &p.id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
