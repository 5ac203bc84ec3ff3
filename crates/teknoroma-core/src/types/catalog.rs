//! Catalog entities: categories, suppliers and products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::StockStatus;
use crate::money::Money;
use crate::stock;

// =============================================================================
// Category
// =============================================================================

/// A product category. Names are unique among active categories.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Supplier
// =============================================================================

/// A company products are bought from.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    /// Turkish tax number (VKN).
    pub tax_number: Option<String>,
    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, snapshotted onto sale lines.
    pub name: String,

    /// Barcode (EAN-13 etc.). Unique among active products.
    pub barcode: String,

    pub description: Option<String>,

    /// Price in kuruş (1/100 TRY).
    pub unit_price_cents: i64,

    /// Units on hand. Never negative.
    pub units_in_stock: i64,

    /// At or below this level the product is `Critical`.
    pub critical_stock_level: i64,

    /// Derived from `units_in_stock` and `critical_stock_level` on every write.
    pub stock_status: StockStatus,

    pub category_id: Option<String>,
    pub supplier_id: Option<String>,

    /// Inactive products cannot be sold but still appear in reports.
    pub is_active: bool,

    /// Bumped on every stock mutation.
    pub version: i64,

    pub is_deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Value of the stock on hand at list price. `None` on overflow.
    pub fn stock_value(&self) -> Option<Money> {
        self.unit_price().multiply_quantity(self.units_in_stock)
    }

    /// Whether `quantity` units can be taken from stock right now.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && !self.is_deleted && self.units_in_stock >= quantity
    }

    /// Whether the stored status agrees with the classifier.
    pub fn status_is_consistent(&self) -> bool {
        self.stock_status == stock::classify(self.units_in_stock, self.critical_stock_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, critical: i64) -> Product {
        Product {
            id: "p-1".into(),
            name: "Laptop X".into(),
            barcode: "8690000000001".into(),
            description: None,
            unit_price_cents: 2_500_000,
            units_in_stock: stock,
            critical_stock_level: critical,
            stock_status: stock::classify(stock, critical),
            category_id: None,
            supplier_id: None,
            is_active: true,
            version: 1,
            is_deleted: false,
            created_at: Utc::now(),
            modified_at: None,
        }
    }

    #[test]
    fn test_can_sell() {
        let p = product(3, 5);
        assert!(p.can_sell(3));
        assert!(!p.can_sell(4));

        let mut inactive = product(10, 5);
        inactive.is_active = false;
        assert!(!inactive.can_sell(1));
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(product(4, 1).stock_value(), Some(Money::from_cents(10_000_000)));
    }

    #[test]
    fn test_status_consistency() {
        let mut p = product(3, 5);
        assert!(p.status_is_consistent());
        p.units_in_stock = 0;
        assert!(!p.status_is_consistent());
    }
}
