//! # Store Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::{Store, Visibility};

#[derive(Debug, Clone)]
pub struct StoreRepository {
    pool: SqlitePool,
}

impl StoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StoreRepository { pool }
    }

    pub async fn insert(&self, store: &Store) -> DbResult<Store> {
        debug!(id = %store.id, name = %store.name, "Inserting store");

        let mut store = store.clone();
        store.created_at = Utc::now();
        store.modified_at = None;

        sqlx::query(
            r#"
            INSERT INTO stores (id, name, city, district, address, phone, is_deleted, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&store.id)
        .bind(&store.name)
        .bind(&store.city)
        .bind(&store.district)
        .bind(&store.address)
        .bind(&store.phone)
        .bind(store.is_deleted)
        .bind(store.created_at)
        .bind(store.modified_at)
        .execute(&self.pool)
        .await?;

        Ok(store)
    }

    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    /// Same as [`Self::get_by_id`] with `Visibility::Active`, inside a unit of work.
    pub async fn get_active_in(conn: &mut sqlx::SqliteConnection, id: &str) -> DbResult<Option<Store>> {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = ? AND is_deleted = 0")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(store)
    }

    pub async fn list(&self, visibility: Visibility) -> DbResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(
            "SELECT * FROM stores WHERE (? OR is_deleted = 0) ORDER BY city, name",
        )
        .bind(visibility.includes_deleted())
        .fetch_all(&self.pool)
        .await?;

        Ok(stores)
    }

    pub async fn update(&self, store: &Store) -> DbResult<Store> {
        debug!(id = %store.id, "Updating store");

        let result = sqlx::query(
            r#"
            UPDATE stores SET name = ?, city = ?, district = ?, address = ?, phone = ?, modified_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&store.name)
        .bind(&store.city)
        .bind(&store.district)
        .bind(&store.address)
        .bind(&store.phone)
        .bind(Utc::now())
        .bind(&store.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Store", &store.id));
        }

        self.get_by_id(&store.id, Visibility::Active)
            .await?
            .ok_or_else(|| DbError::not_found("Store", &store.id))
    }

    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "stores", "Store", id, true).await
    }

    pub async fn restore(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "stores", "Store", id, false).await
    }
}
