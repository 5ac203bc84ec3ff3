//! Sale header and line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{PaymentType, SaleStatus};
use crate::money::{Money, Rate};

// =============================================================================
// Sale
// =============================================================================

/// A completed or in-progress sale transaction.
///
/// ## Totals
/// ```text
/// subtotal = Σ line.total            (after line discounts)
/// tax      = subtotal × 20%
/// total    = subtotal + tax − discount
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,

    /// Human-readable number, `S-YYYY-NNNNN`.
    pub sale_number: String,

    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,

    pub customer_id: String,
    pub employee_id: String,
    pub store_id: String,

    pub status: SaleStatus,
    pub payment_type: PaymentType,

    pub subtotal_cents: i64,
    pub tax_cents: i64,
    /// Sale-level discount, subtracted after tax.
    pub discount_cents: i64,
    pub total_cents: i64,

    pub cancellation_reason: Option<String>,
    pub notes: Option<String>,

    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Checks `total = subtotal + tax − discount`.
    pub fn totals_are_consistent(&self) -> bool {
        self.subtotal() + self.tax() - self.discount() == self.total()
    }
}

// =============================================================================
// Sale Detail
// =============================================================================

/// A line item in a sale.
///
/// Name and price are snapshots taken when the sale was created, so later
/// catalog changes never rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleDetail {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,

    /// Product name at time of sale.
    pub product_name: String,

    /// Unit price at time of sale.
    pub unit_price_cents: i64,

    pub quantity: i64,

    /// Line discount in basis points (1000 = 10%).
    pub discount_bps: u32,

    /// unit price × quantity
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    /// subtotal − discount
    pub total_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SaleDetail {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn discount_rate(&self) -> Rate {
        Rate::from_bps(self.discount_bps)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A sale header together with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithDetails {
    #[serde(flatten)]
    pub sale: Sale,
    pub details: Vec<SaleDetail>,
}
