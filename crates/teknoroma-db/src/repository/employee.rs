//! # Employee Repository

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::{Employee, Role, Visibility};

#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    pub async fn insert(&self, employee: &Employee) -> DbResult<Employee> {
        debug!(id = %employee.id, role = %employee.role, "Inserting employee");

        let mut employee = employee.clone();
        employee.created_at = Utc::now();
        employee.modified_at = None;

        sqlx::query(
            r#"
            INSERT INTO employees (
                id, first_name, last_name, email, phone, role, store_id, department_id,
                hire_date, salary_cents, monthly_quota_cents, is_active,
                is_deleted, created_at, modified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.id)
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(employee.role)
        .bind(&employee.store_id)
        .bind(&employee.department_id)
        .bind(employee.hire_date)
        .bind(employee.salary_cents)
        .bind(employee.monthly_quota_cents)
        .bind(employee.is_active)
        .bind(employee.is_deleted)
        .bind(employee.created_at)
        .bind(employee.modified_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, employee.email.clone().unwrap_or_default())
            }
            other => other,
        })?;

        Ok(employee)
    }

    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    pub async fn get_active_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE id = ? AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(employee)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE email = ? AND is_deleted = 0",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    /// Lists employees, optionally filtered by store and role.
    pub async fn list(
        &self,
        store_id: Option<&str>,
        role: Option<Role>,
        visibility: Visibility,
    ) -> DbResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT * FROM employees
            WHERE (? OR is_deleted = 0)
              AND (? IS NULL OR store_id = ?)
              AND (? IS NULL OR role = ?)
            ORDER BY last_name, first_name
            "#,
        )
        .bind(visibility.includes_deleted())
        .bind(store_id)
        .bind(store_id)
        .bind(role)
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    pub async fn update(&self, employee: &Employee) -> DbResult<Employee> {
        debug!(id = %employee.id, "Updating employee");

        let result = sqlx::query(
            r#"
            UPDATE employees SET
                first_name = ?, last_name = ?, email = ?, phone = ?, role = ?,
                store_id = ?, department_id = ?, hire_date = ?, salary_cents = ?,
                monthly_quota_cents = ?, is_active = ?, modified_at = ?
            WHERE id = ? AND is_deleted = 0
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(employee.role)
        .bind(&employee.store_id)
        .bind(&employee.department_id)
        .bind(employee.hire_date)
        .bind(employee.salary_cents)
        .bind(employee.monthly_quota_cents)
        .bind(employee.is_active)
        .bind(Utc::now())
        .bind(&employee.id)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => {
                DbError::duplicate(field, employee.email.clone().unwrap_or_default())
            }
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", &employee.id));
        }

        self.get_by_id(&employee.id, Visibility::Active)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", &employee.id))
    }

    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "employees", "Employee", id, true).await
    }

    pub async fn restore(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "employees", "Employee", id, false).await
    }
}
