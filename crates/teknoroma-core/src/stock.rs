//! # Stock Status Classifier
//!
//! Derives a product's [`StockStatus`] from its units on hand.
//!
//! ```text
//!   units ≤ 0               → OutOfStock
//!   0 < units ≤ critical    → Critical
//!   units > critical        → Sufficient
//! ```
//!
//! The status column is denormalized; every stock mutation in teknoroma-db
//! recomputes it with [`classify`] in the same statement batch.

use crate::types::StockStatus;

/// Classifies a stock level.
///
/// ## Example
/// ```rust
/// use teknoroma_core::{classify, StockStatus};
///
/// assert_eq!(classify(0, 5), StockStatus::OutOfStock);
/// assert_eq!(classify(5, 5), StockStatus::Critical);
/// assert_eq!(classify(6, 5), StockStatus::Sufficient);
/// ```
pub fn classify(units_in_stock: i64, critical_level: i64) -> StockStatus {
    if units_in_stock <= 0 {
        StockStatus::OutOfStock
    } else if units_in_stock <= critical_level {
        StockStatus::Critical
    } else {
        StockStatus::Sufficient
    }
}

/// Whether moving from `old` to `new` should raise a critical-stock alert.
///
/// Only worsening moves alert: Sufficient → Critical, and anything →
/// OutOfStock. Staying Critical after another sale does not re-alert.
pub fn needs_alert(old: StockStatus, new: StockStatus) -> bool {
    new != StockStatus::Sufficient && new.severity() > old.severity()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(-1, 5), StockStatus::OutOfStock);
        assert_eq!(classify(0, 0), StockStatus::OutOfStock);
        assert_eq!(classify(1, 0), StockStatus::Sufficient);
        assert_eq!(classify(1, 1), StockStatus::Critical);
        assert_eq!(classify(100, 10), StockStatus::Sufficient);
    }

    #[test]
    fn test_needs_alert() {
        use StockStatus::*;
        assert!(needs_alert(Sufficient, Critical));
        assert!(needs_alert(Sufficient, OutOfStock));
        assert!(needs_alert(Critical, OutOfStock));
        assert!(!needs_alert(Critical, Critical));
        assert!(!needs_alert(OutOfStock, Critical));
        assert!(!needs_alert(Critical, Sufficient));
        assert!(!needs_alert(Sufficient, Sufficient));
    }
}
