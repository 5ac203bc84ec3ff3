//! # Expenses
//!
//! ```text
//! CreateExpense(100.00 USD, rate = none, date = 2024-03-01)
//!      │
//!      ├── rate given?  yes → use it
//!      │                no  → ExchangeRateService::rate(USD, 2024-03-01)
//!      │
//!      ├── amount_in_try = 100.00 × 34.5000 = 3450.00   (half-up)
//!      │
//!      └── BEGIN · G-2024-NNNNN · INSERT · COMMIT
//! ```
//!
//! The rate and TRY amount are snapshots; later rate changes never touch
//! stored expenses.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use teknoroma_core::validation::{validate_date_range, validate_name, validate_positive_amount};
use teknoroma_core::{
    CoreError, Currency, DocumentKind, ExchangeRate, Expense, ExpenseType, Money, ValidationError, Visibility,
};
use teknoroma_db::repository::new_id;
use teknoroma_db::{Database, EmployeeRepository, ExpenseFilter, ExpenseRepository, SequenceRepository, StoreRepository};

use crate::error::ServiceResult;
use crate::services::exchange_rate::ExchangeRateService;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseRequest {
    pub store_id: String,
    pub employee_id: Option<String>,
    pub expense_type: ExpenseType,
    pub description: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub currency: Currency,
    /// Decimal rate text, e.g. `"34.50"`. Looked up when omitted.
    pub exchange_rate: Option<String>,
    /// Defaults to today.
    pub expense_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ExpenseService {
    db: Database,
    rates: Arc<ExchangeRateService>,
}

impl ExpenseService {
    pub fn new(db: Database, rates: Arc<ExchangeRateService>) -> Self {
        ExpenseService { db, rates }
    }

    pub async fn create(&self, req: CreateExpenseRequest) -> ServiceResult<Expense> {
        let description = validate_name("description", &req.description, 500)?;
        validate_positive_amount("amount", req.amount_cents)?;

        let today = Utc::now().date_naive();
        let expense_date = req.expense_date.unwrap_or(today);
        let rate = self.resolve_rate(req.currency, req.exchange_rate.as_deref(), expense_date, today).await?;

        let amount = Money::from_cents(req.amount_cents);
        let amount_in_try = amount.convert(rate).ok_or_else(|| ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 1,
            max: i64::MAX,
        })?;

        let mut uow = self.db.begin().await?;

        StoreRepository::get_active_in(uow.conn(), &req.store_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Store", &req.store_id))?;
        if let Some(employee_id) = &req.employee_id {
            EmployeeRepository::get_active_in(uow.conn(), employee_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Employee", employee_id))?;
        }

        let expense = Expense {
            id: new_id(),
            expense_number: SequenceRepository::next_in(uow.conn(), DocumentKind::Expense, expense_date.year()).await?,
            store_id: req.store_id,
            employee_id: req.employee_id,
            expense_type: req.expense_type,
            description,
            amount_cents: amount.cents(),
            currency: req.currency,
            exchange_rate: rate.ten_thousandths(),
            amount_in_try_cents: amount_in_try.cents(),
            expense_date,
            is_paid: false,
            payment_date: None,
            is_deleted: false,
            created_at: Utc::now(),
            modified_at: None,
        };
        ExpenseRepository::insert_in(uow.conn(), &expense).await?;
        uow.commit().await?;

        info!(
            expense_number = %expense.expense_number,
            currency = %expense.currency,
            rate = %rate,
            amount_in_try_cents = expense.amount_in_try_cents,
            "Expense recorded"
        );
        Ok(expense)
    }

    async fn resolve_rate(
        &self,
        currency: Currency,
        given: Option<&str>,
        date: NaiveDate,
        today: NaiveDate,
    ) -> ServiceResult<ExchangeRate> {
        if currency == Currency::Try {
            return Ok(ExchangeRate::ONE);
        }

        match given {
            Some(text) => {
                let rate = ExchangeRate::from_decimal_str(text)
                    .filter(ExchangeRate::is_positive)
                    .ok_or_else(|| ValidationError::invalid_format("exchange_rate", "expected a positive decimal"))?;
                Ok(rate)
            }
            None => Ok(self.rates.rate(currency, date, today).await),
        }
    }

    pub async fn get(&self, id: &str, visibility: Visibility) -> ServiceResult<Expense> {
        Ok(self
            .db
            .expenses()
            .get_by_id(id, visibility)
            .await?
            .ok_or_else(|| CoreError::not_found("Expense", id))?)
    }

    pub async fn list(&self, filter: &ExpenseFilter) -> ServiceResult<Vec<Expense>> {
        validate_date_range(filter.from, filter.to)?;
        Ok(self.db.expenses().list(filter).await?)
    }

    /// Marks the expense paid. Paying twice is a no-op returning the stored row.
    pub async fn mark_paid(&self, id: &str, payment_date: Option<NaiveDate>) -> ServiceResult<Expense> {
        let payment_date = payment_date.unwrap_or_else(|| Utc::now().date_naive());
        if self.db.expenses().mark_paid(id, payment_date).await? {
            info!(id = %id, payment_date = %payment_date, "Expense paid");
        }
        self.get(id, Visibility::Active).await
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.db.expenses().soft_delete(id).await?;
        Ok(())
    }
}
