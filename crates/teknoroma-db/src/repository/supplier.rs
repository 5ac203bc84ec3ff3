//! # Supplier Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::{Supplier, Visibility};

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn insert(&self, supplier: &Supplier) -> DbResult<Supplier> {
        debug!(id = %supplier.id, company = %supplier.company_name, "Inserting supplier");

        let mut supplier = supplier.clone();
        supplier.created_at = Utc::now();
        supplier.modified_at = None;

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, company_name, contact_name, phone, email, address, city, tax_number,
                is_deleted, created_at, modified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.company_name)
        .bind(&supplier.contact_name)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.city)
        .bind(&supplier.tax_number)
        .bind(supplier.is_deleted)
        .bind(supplier.created_at)
        .bind(supplier.modified_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn list(&self, visibility: Visibility) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE (? OR is_deleted = 0) ORDER BY company_name",
        )
        .bind(visibility.includes_deleted())
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    pub async fn update(&self, supplier: &Supplier) -> DbResult<Supplier> {
        debug!(id = %supplier.id, "Updating supplier");

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                company_name = ?, contact_name = ?, phone = ?, email = ?,
                address = ?, city = ?, tax_number = ?, modified_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&supplier.company_name)
        .bind(&supplier.contact_name)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.city)
        .bind(&supplier.tax_number)
        .bind(Utc::now())
        .bind(&supplier.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }

        self.get_by_id(&supplier.id, Visibility::Active)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", &supplier.id))
    }

    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "suppliers", "Supplier", id, true).await
    }

    pub async fn restore(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "suppliers", "Supplier", id, false).await
    }
}
