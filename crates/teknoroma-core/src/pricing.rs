//! # Pricing
//!
//! Sale line math, sale totals and employee commission.
//!
//! ## Calculation Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  per line:   subtotal = unit_price × qty                               │
//! │              discount = subtotal × discount%   (half-up to kuruş)      │
//! │              total    = subtotal − discount                            │
//! │                                                                         │
//! │  per sale:   subtotal = Σ line.total                                   │
//! │              tax      = subtotal × 20%          (half-up to kuruş)     │
//! │              total    = subtotal + tax − sale discount                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts that overflow kuruş are rejected as out of range, never wrapped.

use serde::Serialize;

use crate::error::ValidationError;
use crate::money::{Money, Rate};
use crate::{COMMISSION_RATE, SALE_TAX_RATE};

// =============================================================================
// Line Pricing
// =============================================================================

/// A priced sale line, before it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    pub unit_price: Money,
    pub quantity: i64,
    pub discount_rate: Rate,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

fn too_large(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

/// Prices one line.
pub fn price_line(unit_price: Money, quantity: i64, discount_rate: Rate) -> Result<PricedLine, ValidationError> {
    let subtotal = unit_price
        .multiply_quantity(quantity)
        .ok_or_else(|| too_large("line_subtotal"))?;
    let discount = subtotal.portion(discount_rate);
    let total = subtotal.checked_sub(discount).ok_or_else(|| too_large("line_total"))?;

    Ok(PricedLine {
        unit_price,
        quantity,
        discount_rate,
        subtotal,
        discount,
        total,
    })
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Header totals of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Aggregates priced lines and applies VAT and the sale-level discount.
    pub fn compute(lines: &[PricedLine], sale_discount: Money) -> Result<Self, ValidationError> {
        let subtotal = lines
            .iter()
            .try_fold(Money::zero(), |acc, l| acc.checked_add(l.total))
            .ok_or_else(|| too_large("subtotal"))?;
        let tax = subtotal.portion(SALE_TAX_RATE);
        let total = subtotal
            .checked_add(tax)
            .and_then(|gross| gross.checked_sub(sale_discount))
            .ok_or_else(|| too_large("total"))?;

        Ok(SaleTotals {
            subtotal,
            tax,
            discount: sale_discount,
            total,
        })
    }

    /// Subtotal plus tax, the ceiling for a sale-level discount.
    pub fn gross(&self) -> Money {
        self.subtotal + self.tax
    }
}

// =============================================================================
// Commission
// =============================================================================

/// Commission on a month's sales: 10% of the amount above quota, never negative.
///
/// ## Example
/// ```rust
/// use teknoroma_core::money::Money;
/// use teknoroma_core::pricing::commission;
///
/// let c = commission(Money::from_major_minor(15_000, 0), Money::from_major_minor(10_000, 0));
/// assert_eq!(c, Money::from_major_minor(500, 0));
/// ```
pub fn commission(monthly_sales: Money, quota: Money) -> Money {
    (monthly_sales - quota).clamp_non_negative().portion(COMMISSION_RATE)
}

/// Quota achievement as a percentage with two decimals. Zero quota yields 0.
pub fn quota_achievement(monthly_sales: Money, quota: Money) -> f64 {
    monthly_sales.percentage_of(quota)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_line_with_discount() {
        let line = price_line(Money::from_cents(1_999), 3, Rate::from_percentage(15.0)).unwrap();
        assert_eq!(line.subtotal.cents(), 5_997);
        // 5997 × 0.15 = 899.55 → 900
        assert_eq!(line.discount.cents(), 900);
        assert_eq!(line.total.cents(), 5_097);
    }

    #[test]
    fn test_price_line_without_discount() {
        let line = price_line(Money::from_cents(2_500), 4, Rate::zero()).unwrap();
        assert_eq!(line.discount, Money::zero());
        assert_eq!(line.total.cents(), 10_000);
    }

    #[test]
    fn test_sale_totals_invariant() {
        let lines = [
            price_line(Money::from_cents(10_000), 1, Rate::zero()).unwrap(),
            price_line(Money::from_cents(333), 3, Rate::from_percentage(5.0)).unwrap(),
        ];
        let totals = SaleTotals::compute(&lines, Money::from_cents(500)).unwrap();

        assert_eq!(totals.subtotal.cents(), 10_000 + 949);
        assert_eq!(totals.total, totals.subtotal + totals.tax - totals.discount);
        assert_eq!(totals.gross(), totals.subtotal + totals.tax);
    }

    #[test]
    fn test_overflowing_amounts_rejected() {
        let err = price_line(Money::from_cents(i64::MAX / 2), 3, Rate::zero()).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "line_subtotal"));

        let line = price_line(Money::from_cents(i64::MAX / 2), 1, Rate::zero()).unwrap();
        assert!(SaleTotals::compute(&[line, line, line], Money::zero()).is_err());
        // Tax alone pushes it over.
        assert!(SaleTotals::compute(&[line, line], Money::zero()).is_err());
    }

    #[test]
    fn test_commission() {
        let quota = Money::from_major_minor(10_000, 0);
        assert_eq!(commission(Money::from_major_minor(15_000, 0), quota).cents(), 50_000);
        assert_eq!(commission(Money::from_major_minor(8_000, 0), quota), Money::zero());
        assert_eq!(commission(quota, quota), Money::zero());
    }

    #[test]
    fn test_quota_achievement() {
        let quota = Money::from_major_minor(10_000, 0);
        assert_eq!(quota_achievement(Money::from_major_minor(15_000, 0), quota), 150.0);
        assert_eq!(quota_achievement(Money::from_cents(100), Money::zero()), 0.0);
    }
}
