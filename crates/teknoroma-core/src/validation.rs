//! # Validation Module
//!
//! Input validation utilities for TeknoRoma.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (axum)                                                  │
//! │  └── Type validation (JSON deserialization)                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services (apps/api)                                          │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints (partial, active rows only)                    │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use teknoroma_core::validation::{validate_barcode, validate_quantity};
//!
//! validate_barcode("8690000000001").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_SALE_LINES, MAX_STOCK_UNITS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, length-bounded text field and returns it trimmed.
///
/// ## Example
/// ```rust
/// use teknoroma_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Laptops ", 100).unwrap(), "Laptops");
/// assert!(validate_name("name", "   ", 100).is_err());
/// ```
pub fn validate_name(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Alphanumeric characters and hyphens only
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::required("barcode"));
    }

    if barcode.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 50,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::invalid_format(
            "barcode",
            "must contain only letters, digits and hyphens",
        ));
    }

    Ok(())
}

/// Validates an e-mail address (shape only, not deliverability).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::invalid_format("email", "missing '@'"));
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(ValidationError::invalid_format("email", "not an address"));
    }

    Ok(())
}

/// Validates a Turkish national identity number (11 digits, no leading zero).
pub fn validate_identity_number(value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.len() != 11 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "identity_number",
            "must be exactly 11 digits",
        ));
    }

    if value.starts_with('0') {
        return Err(ValidationError::invalid_format(
            "identity_number",
            "must not start with 0",
        ));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed `MAX_ITEM_QUANTITY`
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price. Zero is allowed (free items), negative is not.
pub fn validate_price(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_AMOUNT_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a positive money amount (expenses).
pub fn validate_positive_amount(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a positive stock movement (manual moves, deliveries).
pub fn validate_stock_quantity(field: &str, units: i64) -> ValidationResult<()> {
    if units <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    if units > MAX_STOCK_UNITS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_STOCK_UNITS,
        });
    }
    Ok(())
}

/// Validates a line discount percentage (0..=100).
pub fn validate_discount_percent(percent: f64) -> ValidationResult<()> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "discount_percent".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Validates a stock level (units on hand or critical level).
pub fn validate_stock_level(field: &str, units: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_UNITS).contains(&units) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK_UNITS,
        });
    }
    Ok(())
}

/// Validates the sale-level discount against the taxed subtotal.
pub fn validate_sale_discount(discount: Money, subtotal_with_tax: Money) -> ValidationResult<()> {
    if discount.is_negative() || discount > subtotal_with_tax {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: subtotal_with_tax.cents(),
        });
    }
    Ok(())
}

/// Validates the number of lines in a sale.
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if count > MAX_SALE_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Parses a `YYYY-MM` month into its first day.
///
/// ## Example
/// ```rust
/// use teknoroma_core::validation::parse_month;
///
/// let first = parse_month("2024-03").unwrap();
/// assert_eq!(first.to_string(), "2024-03-01");
/// assert!(parse_month("2024-13").is_err());
/// ```
pub fn parse_month(value: &str) -> ValidationResult<NaiveDate> {
    let invalid = || ValidationError::invalid_format("month", "expected YYYY-MM");

    let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Validates that `from` is not after `to` when both are given.
pub fn validate_date_range<T: PartialOrd>(from: Option<T>, to: Option<T>) -> ValidationResult<()> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(ValidationError::invalid_format(
                "date_range",
                "'from' must not be after 'to'",
            ));
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("8690000000001").is_ok());
        assert!(validate_barcode("ABC-123").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("abc 123").is_err());
        assert!(validate_barcode(&"1".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_name_counts_chars() {
        // Turkish letters are multi-byte but count as one character each.
        assert!(validate_name("name", "Çağrı", 5).is_ok());
        assert!(validate_name("name", "Çağrı!", 5).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-5).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_amounts_are_bounded() {
        assert!(validate_price("unit_price", 0).is_ok());
        assert!(validate_price("unit_price", MAX_AMOUNT_CENTS).is_ok());
        assert!(validate_price("unit_price", -1).is_err());
        assert!(matches!(
            validate_price("unit_price", MAX_AMOUNT_CENTS + 1),
            Err(ValidationError::OutOfRange { max: MAX_AMOUNT_CENTS, .. })
        ));

        assert!(validate_positive_amount("amount", 1).is_ok());
        assert!(matches!(validate_positive_amount("amount", 0), Err(ValidationError::MustBePositive { .. })));
        assert!(validate_positive_amount("amount", i64::MAX).is_err());

        assert!(validate_stock_quantity("quantity", MAX_STOCK_UNITS).is_ok());
        assert!(validate_stock_quantity("quantity", 0).is_err());
        assert!(validate_stock_quantity("quantity", 1_000_000_000_000).is_err());

        assert!(validate_stock_level("units", 0).is_ok());
        assert!(validate_stock_level("units", MAX_STOCK_UNITS + 1).is_err());

        // The bounds keep the largest line product representable.
        assert!(MAX_AMOUNT_CENTS.checked_mul(MAX_STOCK_UNITS).is_some());
    }

    #[test]
    fn test_validate_discount_percent() {
        assert!(validate_discount_percent(0.0).is_ok());
        assert!(validate_discount_percent(100.0).is_ok());
        assert!(validate_discount_percent(100.5).is_err());
        assert!(validate_discount_percent(-1.0).is_err());
        assert!(validate_discount_percent(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_sale_discount() {
        let cap = Money::from_cents(12_000);
        assert!(validate_sale_discount(Money::zero(), cap).is_ok());
        assert!(validate_sale_discount(cap, cap).is_ok());
        assert!(validate_sale_discount(Money::from_cents(12_001), cap).is_err());
        assert!(validate_sale_discount(Money::from_cents(-1), cap).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ayse@teknoroma.com.tr").is_ok());
        assert!(validate_email("ayse.teknoroma.com").is_err());
        assert!(validate_email("@teknoroma.com").is_err());
        assert!(validate_email("ayse@localhost").is_err());
    }

    #[test]
    fn test_validate_identity_number() {
        assert!(validate_identity_number("12345678901").is_ok());
        assert!(validate_identity_number("02345678901").is_err());
        assert!(validate_identity_number("1234567890").is_err());
        assert!(validate_identity_number("1234567890a").is_err());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(
            parse_month("2024-12").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()
        );
        assert!(parse_month("2024-1").is_err());
        assert!(parse_month("24-01").is_err());
        assert!(parse_month("2024/01").is_err());
    }

    #[test]
    fn test_line_count() {
        assert!(matches!(validate_line_count(0), Err(ValidationError::Empty { .. })));
        assert!(validate_line_count(1).is_ok());
        assert!(validate_line_count(MAX_SALE_LINES + 1).is_err());
    }

    #[test]
    fn test_date_range() {
        assert!(validate_date_range(Some(1), Some(2)).is_ok());
        assert!(validate_date_range(Some(3), Some(2)).is_err());
        assert!(validate_date_range::<i32>(None, Some(2)).is_ok());
    }
}
