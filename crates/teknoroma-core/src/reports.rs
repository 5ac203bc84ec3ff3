//! # Report Types
//!
//! Output shapes of the reporting aggregator plus the pure math that turns
//! raw SQL aggregates into them. Queries live in teknoroma-db.
//!
//! ```text
//! SQL aggregates (sums, counts) ──► this module ──► JSON for dashboards
//!                                    • quota achievement / commission
//!                                    • cross-sell percentages
//!                                    • age brackets
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::{commission, quota_achievement};
use crate::types::{ExpenseType, Gender};

// =============================================================================
// Scope
// =============================================================================

/// Store and date-range filter shared by every report. Dates are inclusive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportScope {
    pub store_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportScope {
    pub fn for_store(store_id: impl Into<String>) -> Self {
        ReportScope {
            store_id: Some(store_id.into()),
            ..Default::default()
        }
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Product counts per stock band and the value of stock on hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReport {
    pub total_products: i64,
    pub sufficient: i64,
    pub critical: i64,
    pub out_of_stock: i64,
    /// Σ unit price × units in stock, active products only.
    pub total_stock_value_cents: i64,
}

// =============================================================================
// Top Sellers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopProduct {
    pub product_id: String,
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
    /// Distinct sales the product appeared in.
    pub sale_count: i64,
}

// =============================================================================
// Employee Performance
// =============================================================================

/// One employee's month against their quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EmployeePerformance {
    pub employee_id: String,
    pub employee_name: String,
    /// `YYYY-MM`
    pub month: String,
    pub sale_count: i64,
    pub total_sales_cents: i64,
    pub quota_cents: i64,
    /// Sales / quota as a percentage, two decimals.
    pub achievement_percent: f64,
    pub commission_cents: i64,
}

impl EmployeePerformance {
    /// Derives achievement and commission from the month's completed sales.
    pub fn compute(
        employee_id: String,
        employee_name: String,
        month: String,
        sale_count: i64,
        total_sales: Money,
        quota: Money,
    ) -> Self {
        EmployeePerformance {
            employee_id,
            employee_name,
            month,
            sale_count,
            total_sales_cents: total_sales.cents(),
            quota_cents: quota.cents(),
            achievement_percent: quota_achievement(total_sales, quota),
            commission_cents: commission(total_sales, quota).cents(),
        }
    }
}

// =============================================================================
// Cross Selling
// =============================================================================

/// A product frequently bought together with an anchor product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Companion {
    pub product_id: String,
    pub product_name: String,
    /// Sales containing both the anchor and this product.
    pub together_count: i64,
    /// together_count / anchor sale count, as a percentage.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CrossSellEntry {
    pub product_id: String,
    pub product_name: String,
    pub sale_count: i64,
    pub companions: Vec<Companion>,
}

/// Percentage of `part` in `whole`, two decimals, zero for an empty whole.
pub fn share_percent(part: i64, whole: i64) -> f64 {
    Money::from_cents(part).percentage_of(Money::from_cents(whole))
}

// =============================================================================
// Unsold Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct UnsoldProduct {
    pub product_id: String,
    pub product_name: String,
    pub barcode: String,
    pub units_in_stock: i64,
    pub stock_value_cents: i64,
    /// Last sale of any age, if the product was ever sold.
    #[ts(as = "Option<String>")]
    pub last_sold_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ExpenseSummaryRow {
    /// `YYYY-MM`
    pub month: String,
    pub expense_type: ExpenseType,
    pub expense_count: i64,
    pub total_try_cents: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseReport {
    pub rows: Vec<ExpenseSummaryRow>,
    pub total_try_cents: i64,
}

impl ExpenseReport {
    pub fn from_rows(rows: Vec<ExpenseSummaryRow>) -> Self {
        let total_try_cents = rows.iter().map(|r| r.total_try_cents).sum();
        ExpenseReport { rows, total_try_cents }
    }
}

// =============================================================================
// Demographics
// =============================================================================

/// Customer age brackets used on the demographics dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    Under18,
    From18To25,
    From26To35,
    From36To45,
    From46To60,
    Over60,
    Unknown,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 7] = [
        AgeBracket::Under18,
        AgeBracket::From18To25,
        AgeBracket::From26To35,
        AgeBracket::From36To45,
        AgeBracket::From46To60,
        AgeBracket::Over60,
        AgeBracket::Unknown,
    ];

    pub fn from_age(age: Option<i32>) -> Self {
        match age {
            None => AgeBracket::Unknown,
            Some(a) if a < 18 => AgeBracket::Under18,
            Some(a) if a <= 25 => AgeBracket::From18To25,
            Some(a) if a <= 35 => AgeBracket::From26To35,
            Some(a) if a <= 45 => AgeBracket::From36To45,
            Some(a) if a <= 60 => AgeBracket::From46To60,
            Some(_) => AgeBracket::Over60,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::Under18 => "<18",
            AgeBracket::From18To25 => "18-25",
            AgeBracket::From26To35 => "26-35",
            AgeBracket::From36To45 => "36-45",
            AgeBracket::From46To60 => "46-60",
            AgeBracket::Over60 => "60+",
            AgeBracket::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CountBucket {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Demographics {
    pub total_customers: i64,
    pub by_gender: Vec<CountBucket>,
    pub by_age: Vec<CountBucket>,
    pub by_city: Vec<CountBucket>,
}

impl Demographics {
    /// Buckets customers given as (gender, birth date, city) triples.
    ///
    /// Every age bracket appears, in order, even when empty. Cities are
    /// sorted by count desc, then name; a missing city counts as "unknown".
    pub fn build<I>(customers: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = (Option<Gender>, Option<NaiveDate>, Option<String>)>,
    {
        use std::collections::BTreeMap;

        let mut total = 0;
        let mut genders: BTreeMap<&'static str, i64> = BTreeMap::new();
        let mut ages: BTreeMap<AgeBracket, i64> = BTreeMap::new();
        let mut cities: BTreeMap<String, i64> = BTreeMap::new();

        for (gender, birth, city) in customers {
            total += 1;
            *genders.entry(gender.map(|g| g.as_str()).unwrap_or("unknown")).or_default() += 1;
            *ages.entry(AgeBracket::from_age(birth.map(|b| age_on(b, today)))).or_default() += 1;
            let city = city
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "unknown".to_string());
            *cities.entry(city).or_default() += 1;
        }

        let by_gender = genders
            .into_iter()
            .map(|(label, count)| CountBucket { label: label.to_string(), count })
            .collect();

        let by_age = AgeBracket::ALL
            .iter()
            .map(|b| CountBucket {
                label: b.label().to_string(),
                count: ages.get(b).copied().unwrap_or(0),
            })
            .collect();

        let mut by_city: Vec<CountBucket> = cities
            .into_iter()
            .map(|(label, count)| CountBucket { label, count })
            .collect();
        by_city.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

        Demographics {
            total_customers: total,
            by_gender,
            by_age,
            by_city,
        }
    }
}

fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    use chrono::Datelike;
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0)
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers for one store's dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub store_id: Option<String>,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub today_revenue_cents: i64,
    pub today_sale_count: i64,
    pub pending_sales: i64,
    pub preparing_sales: i64,
    pub critical_products: i64,
    pub out_of_stock_products: i64,
    pub open_tickets: i64,
    pub month_expense_try_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_performance() {
        let p = EmployeePerformance::compute(
            "e-1".into(),
            "Ali Veli".into(),
            "2024-05".into(),
            12,
            Money::from_major_minor(15_000, 0),
            Money::from_major_minor(10_000, 0),
        );
        assert_eq!(p.achievement_percent, 150.0);
        assert_eq!(p.commission_cents, 50_000);
    }

    #[test]
    fn test_age_brackets() {
        assert_eq!(AgeBracket::from_age(None), AgeBracket::Unknown);
        assert_eq!(AgeBracket::from_age(Some(17)), AgeBracket::Under18);
        assert_eq!(AgeBracket::from_age(Some(18)), AgeBracket::From18To25);
        assert_eq!(AgeBracket::from_age(Some(25)), AgeBracket::From18To25);
        assert_eq!(AgeBracket::from_age(Some(26)), AgeBracket::From26To35);
        assert_eq!(AgeBracket::from_age(Some(60)), AgeBracket::From46To60);
        assert_eq!(AgeBracket::from_age(Some(61)), AgeBracket::Over60);
    }

    #[test]
    fn test_demographics_build() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let d = Demographics::build(
            vec![
                (Some(Gender::Female), NaiveDate::from_ymd_opt(2000, 1, 1), Some("İstanbul".to_string())),
                (Some(Gender::Male), NaiveDate::from_ymd_opt(1950, 1, 1), Some("Ankara".to_string())),
                (None, None, Some("İstanbul".to_string())),
                (Some(Gender::Female), None, None),
            ],
            today,
        );

        assert_eq!(d.total_customers, 4);
        assert_eq!(d.by_age.len(), AgeBracket::ALL.len());
        assert_eq!(d.by_age[1], CountBucket { label: "18-25".into(), count: 1 });
        assert_eq!(d.by_age[5].count, 1);
        assert_eq!(d.by_age[6].count, 2);
        assert_eq!(d.by_city[0], CountBucket { label: "İstanbul".into(), count: 2 });

        let female = d.by_gender.iter().find(|b| b.label == "female").unwrap();
        assert_eq!(female.count, 2);
    }

    #[test]
    fn test_share_percent() {
        assert_eq!(share_percent(1, 3), 33.33);
        assert_eq!(share_percent(5, 0), 0.0);
    }

    #[test]
    fn test_expense_report_total() {
        let report = ExpenseReport::from_rows(vec![
            ExpenseSummaryRow {
                month: "2024-01".into(),
                expense_type: ExpenseType::Rent,
                expense_count: 1,
                total_try_cents: 5_000_000,
            },
            ExpenseSummaryRow {
                month: "2024-01".into(),
                expense_type: ExpenseType::Utility,
                expense_count: 2,
                total_try_cents: 345_000,
            },
        ]);
        assert_eq!(report.total_try_cents, 5_345_000);
    }
}
