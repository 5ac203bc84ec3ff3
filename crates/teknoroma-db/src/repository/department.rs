//! # Department Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::{Department, Visibility};

#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: SqlitePool,
}

impl DepartmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DepartmentRepository { pool }
    }

    pub async fn insert(&self, department: &Department) -> DbResult<Department> {
        debug!(id = %department.id, store_id = %department.store_id, "Inserting department");

        let mut department = department.clone();
        department.created_at = Utc::now();
        department.modified_at = None;

        sqlx::query(
            r#"
            INSERT INTO departments (id, name, store_id, is_deleted, created_at, modified_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&department.id)
        .bind(&department.name)
        .bind(&department.store_id)
        .bind(department.is_deleted)
        .bind(department.created_at)
        .bind(department.modified_at)
        .execute(&self.pool)
        .await?;

        Ok(department)
    }

    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<Department>> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(department)
    }

    /// Lists departments, optionally only those of one store.
    pub async fn list(&self, store_id: Option<&str>, visibility: Visibility) -> DbResult<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            r#"
            SELECT * FROM departments
            WHERE (? OR is_deleted = 0)
              AND (? IS NULL OR store_id = ?)
            ORDER BY name
            "#,
        )
        .bind(visibility.includes_deleted())
        .bind(store_id)
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    pub async fn update(&self, department: &Department) -> DbResult<Department> {
        debug!(id = %department.id, "Updating department");

        let result = sqlx::query(
            "UPDATE departments SET name = ?, store_id = ?, modified_at = ? WHERE id = ? AND is_deleted = 0",
        )
        .bind(&department.name)
        .bind(&department.store_id)
        .bind(Utc::now())
        .bind(&department.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Department", &department.id));
        }

        self.get_by_id(&department.id, Visibility::Active)
            .await?
            .ok_or_else(|| DbError::not_found("Department", &department.id))
    }

    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "departments", "Department", id, true).await
    }

    pub async fn restore(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "departments", "Department", id, false).await
    }
}
