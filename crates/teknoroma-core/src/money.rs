//! # Money Module
//!
//! Provides the `Money`, `Rate` and `ExchangeRate` types for handling
//! monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (kuruş)                              │
//! │    ₺12.99 is stored as 1299                                             │
//! │    Percentages are basis points: 20% VAT = 2000 bps                     │
//! │    Exchange rates keep 4 decimals: 34.5000 = 345000                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use teknoroma_core::money::{ExchangeRate, Money};
//!
//! let amount = Money::from_major_minor(100, 0); // 100.00 USD
//! let rate = ExchangeRate::from_decimal_str("34.50").unwrap();
//! assert_eq!(amount.convert(rate).unwrap().cents(), 345_000); // ₺3,450.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

/// Rounds `numerator / denominator` half away from zero.
fn div_round(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

/// Narrows an i128 intermediate, clamping at the i64 bounds.
fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (kuruş for TRY).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for reversals and discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Product.unit_price ──► SaleDetail.unit_price (snapshot) ──► line_total
///                                                                │
///   Sale.subtotal = Σ line_total ──► tax (20%) ──► Sale.total ◄──┘
///
///   Expense.amount × exchange_rate ──► Expense.amount_in_try
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use teknoroma_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // ₺10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity. `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use teknoroma_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(29_999); // ₺299.99
    /// assert_eq!(unit_price.multiply_quantity(3).unwrap().cents(), 89_997);
    /// assert!(Money::from_cents(i64::MAX / 2).multiply_quantity(3).is_none());
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts. `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts `other`. `None` on overflow.
    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Returns `rate` percent of this amount, rounded half-up to the minor unit.
    ///
    /// ## Example
    /// ```rust
    /// use teknoroma_core::money::{Money, Rate};
    ///
    /// let subtotal = Money::from_cents(1000);
    /// assert_eq!(subtotal.portion(Rate::from_bps(825)).cents(), 83); // 82.5 → 83
    /// ```
    ///
    /// Rates up to 100% never exceed the original amount; larger rates clamp
    /// at the i64 bounds.
    pub fn portion(&self, rate: Rate) -> Money {
        Money(saturate(div_round(
            i128::from(self.0) * i128::from(rate.bps()),
            10_000,
        )))
    }

    /// Converts a foreign-currency amount into TRY using a 4-decimal rate.
    ///
    /// `None` when the converted amount does not fit in kuruş.
    pub fn convert(&self, rate: ExchangeRate) -> Option<Money> {
        let converted = div_round(i128::from(self.0) * i128::from(rate.ten_thousandths()), 10_000);
        i64::try_from(converted).ok().map(Money)
    }

    /// Returns `self / other` as a percentage with two decimals (for reports).
    ///
    /// Zero denominators yield zero.
    pub fn percentage_of(&self, other: Money) -> f64 {
        if other.is_zero() {
            return 0.0;
        }
        let pct = self.0 as f64 * 100.0 / other.0 as f64;
        (pct * 100.0).round() / 100.0
    }

    /// Returns the larger of `self` and zero.
    #[inline]
    pub fn clamp_non_negative(self) -> Money {
        if self.0 < 0 {
            Money::zero()
        } else {
            self
        }
    }
}

/// Display shows money as `₺1,234.56`-style text without grouping.
///
/// This is for logs and debugging; dashboards format for locale themselves.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₺{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Rate (basis points)
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 2000 bps = 20% (Turkish VAT), 1000 bps = 10% (commission)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for API input).
    ///
    /// Negative input saturates to zero; range checks live in validation.
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round().max(0.0) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Exchange Rate
// =============================================================================

/// A currency buy rate against TRY with four decimal places.
///
/// `34.5000` is stored as `345000`. The central bank publishes four decimals,
/// so the snapshot on an expense is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExchangeRate(i64);

impl ExchangeRate {
    /// The identity rate (TRY → TRY).
    pub const ONE: ExchangeRate = ExchangeRate(10_000);

    #[inline]
    pub const fn from_ten_thousandths(value: i64) -> Self {
        ExchangeRate(value)
    }

    #[inline]
    pub const fn ten_thousandths(&self) -> i64 {
        self.0
    }

    /// Parses a decimal string such as `"34.5"` or `"34.5012"`.
    ///
    /// Returns `None` for negative numbers, malformed input, or more than
    /// four fractional digits.
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() || frac.len() > 4 {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let whole: i64 = whole.parse().ok()?;
        let frac_value: i64 = if frac.is_empty() {
            0
        } else {
            format!("{:0<4}", frac).parse().ok()?
        };
        whole.checked_mul(10_000)?.checked_add(frac_value).map(ExchangeRate)
    }

    /// Creates a rate from a float, rounding to four decimals.
    pub fn from_f64(value: f64) -> Self {
        ExchangeRate((value * 10_000.0).round() as i64)
    }

    /// Returns the rate as a float (for display only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:04}", self.0 / 10_000, (self.0 % 10_000).abs())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
