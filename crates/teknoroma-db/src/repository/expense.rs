//! # Expense Repository

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use teknoroma_core::{Expense, ExpenseType, Visibility};

/// Optional filters for listing expenses. Dates are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub store_id: Option<String>,
    pub expense_type: Option<ExpenseType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub visibility: Visibility,
}

#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Inserts an expense. The number must already be allocated on `conn`.
    pub async fn insert_in(conn: &mut SqliteConnection, expense: &Expense) -> DbResult<()> {
        debug!(id = %expense.id, number = %expense.expense_number, "Inserting expense");

        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, expense_number, store_id, employee_id, expense_type, description,
                amount_cents, currency, exchange_rate, amount_in_try_cents,
                expense_date, is_paid, payment_date, is_deleted, created_at, modified_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.expense_number)
        .bind(&expense.store_id)
        .bind(&expense.employee_id)
        .bind(expense.expense_type)
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(expense.currency)
        .bind(expense.exchange_rate)
        .bind(expense.amount_in_try_cents)
        .bind(expense.expense_date)
        .bind(expense.is_paid)
        .bind(expense.payment_date)
        .bind(expense.is_deleted)
        .bind(expense.created_at)
        .bind(expense.modified_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str, visibility: Visibility) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE id = ? AND (? OR is_deleted = 0)",
        )
        .bind(id)
        .bind(visibility.includes_deleted())
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    pub async fn list(&self, filter: &ExpenseFilter) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT * FROM expenses
            WHERE (? OR is_deleted = 0)
              AND (? IS NULL OR store_id = ?)
              AND (? IS NULL OR expense_type = ?)
              AND (? IS NULL OR expense_date >= ?)
              AND (? IS NULL OR expense_date <= ?)
            ORDER BY expense_date DESC, expense_number DESC
            "#,
        )
        .bind(filter.visibility.includes_deleted())
        .bind(&filter.store_id)
        .bind(&filter.store_id)
        .bind(filter.expense_type)
        .bind(filter.expense_type)
        .bind(filter.from)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Marks an unpaid expense as paid on `payment_date`.
    ///
    /// ## Returns
    /// * `Ok(false)` - the expense was already paid
    pub async fn mark_paid(&self, id: &str, payment_date: NaiveDate) -> DbResult<bool> {
        debug!(id = %id, payment_date = %payment_date, "Marking expense paid");

        if self.get_by_id(id, Visibility::Active).await?.is_none() {
            return Err(DbError::not_found("Expense", id));
        }

        let result = sqlx::query(
            r#"
            UPDATE expenses SET is_paid = 1, payment_date = ?, modified_at = ?
            WHERE id = ? AND is_deleted = 0 AND is_paid = 0
            "#,
        )
        .bind(payment_date)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        super::set_deleted(&self.pool, "expenses", "Expense", id, true).await
    }
}
