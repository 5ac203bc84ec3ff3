//! # Customer Repository

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::{Customer, Visibility};

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - identity number already used by an
    ///   active customer
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, "Inserting customer");

        let mut customer = customer.clone();
        customer.created_at = Utc::now();
        customer.modified_at = None;

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, identity_number, first_name, last_name, phone, email, address, city,
                gender, birth_date, is_deleted, created_at, modified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.identity_number)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(customer.gender)
        .bind(customer.birth_date)
        .bind(customer.is_deleted)
        .bind(customer.created_at)
        .bind(customer.modified_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, customer.identity_number.clone().unwrap_or_default())
            }
            other => other,
        })?;

        Ok(customer)
    }

    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get_active_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = ? AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(customer)
    }

    pub async fn get_by_identity_number(&self, identity_number: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE identity_number = ? AND is_deleted = 0",
        )
        .bind(identity_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn list(&self, visibility: Visibility) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE (? OR is_deleted = 0) ORDER BY last_name, first_name",
        )
        .bind(visibility.includes_deleted())
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn update(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                identity_number = ?, first_name = ?, last_name = ?, phone = ?, email = ?,
                address = ?, city = ?, gender = ?, birth_date = ?, modified_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&customer.identity_number)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.city)
        .bind(customer.gender)
        .bind(customer.birth_date)
        .bind(Utc::now())
        .bind(&customer.id)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, customer.identity_number.clone().unwrap_or_default())
            }
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        self.get_by_id(&customer.id, Visibility::Active)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", &customer.id))
    }

    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "customers", "Customer", id, true).await
    }

    pub async fn restore(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "customers", "Customer", id, false).await
    }
}
