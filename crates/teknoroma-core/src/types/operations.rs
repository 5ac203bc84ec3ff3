//! Back-office records: expenses, service tickets and supplier deliveries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{Currency, ExpenseType, TicketPriority, TicketStatus};
use crate::money::{ExchangeRate, Money};

// =============================================================================
// Expense
// =============================================================================

/// A store expense, possibly in a foreign currency.
///
/// The exchange rate is a snapshot taken at creation; `amount_in_try_cents`
/// is never recomputed from later rates.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,
    /// `G-YYYY-NNNNN`
    pub expense_number: String,
    pub store_id: String,
    pub employee_id: Option<String>,
    pub expense_type: ExpenseType,
    pub description: String,
    pub amount_cents: i64,
    pub currency: Currency,
    /// Ten-thousandths of a TRY per unit (345000 = 34.5000).
    pub exchange_rate: i64,
    pub amount_in_try_cents: i64,
    #[ts(as = "String")]
    pub expense_date: NaiveDate,
    pub is_paid: bool,
    #[ts(as = "Option<String>")]
    pub payment_date: Option<NaiveDate>,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Expense {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    #[inline]
    pub fn rate(&self) -> ExchangeRate {
        ExchangeRate::from_ten_thousandths(self.exchange_rate)
    }

    #[inline]
    pub fn amount_in_try(&self) -> Money {
        Money::from_cents(self.amount_in_try_cents)
    }
}

// =============================================================================
// Technical Service
// =============================================================================

/// A repair / support ticket.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TechnicalService {
    pub id: String,
    /// `TS-YYYY-NNNNN`
    pub ticket_number: String,
    pub store_id: String,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    pub reported_by_id: String,
    pub assigned_to_id: Option<String>,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub resolution: Option<String>,
    #[ts(as = "String")]
    pub reported_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub resolved_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Supplier Transaction
// =============================================================================

/// A delivery received from a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SupplierTransaction {
    pub id: String,
    /// `TH-YYYY-NNNNN`
    pub transaction_number: String,
    pub supplier_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,
    pub invoice_number: Option<String>,
    pub is_paid: bool,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl SupplierTransaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}
