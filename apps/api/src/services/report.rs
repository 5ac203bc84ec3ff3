//! Report service: input checks in front of the read-only report queries.

use chrono::{NaiveDate, Utc};

use teknoroma_core::reports::{
    CrossSellEntry, DashboardSummary, Demographics, EmployeePerformance, ExpenseReport, ReportScope, StockReport,
    TopProduct, UnsoldProduct,
};
use teknoroma_core::validation::{parse_month, validate_date_range};
use teknoroma_core::{ValidationError, DEFAULT_UNSOLD_DAYS};
use teknoroma_db::Database;

use crate::error::ServiceResult;

pub const DEFAULT_TOP_LIMIT: i64 = 10;
pub const MAX_TOP_LIMIT: i64 = 100;
pub const DEFAULT_CROSS_SELL_ANCHORS: i64 = 5;

#[derive(Clone)]
pub struct ReportService {
    db: Database,
}

impl ReportService {
    pub fn new(db: Database) -> Self {
        ReportService { db }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn limit(requested: Option<i64>, default: i64) -> ServiceResult<i64> {
        match requested {
            None => Ok(default),
            Some(n) if (1..=MAX_TOP_LIMIT).contains(&n) => Ok(n),
            Some(_) => Err(ValidationError::OutOfRange {
                field: "limit".to_string(),
                min: 1,
                max: MAX_TOP_LIMIT,
            }
            .into()),
        }
    }

    pub async fn stock(&self) -> ServiceResult<StockReport> {
        Ok(self.db.reports().stock_report().await?)
    }

    pub async fn top_products(&self, scope: &ReportScope, limit: Option<i64>) -> ServiceResult<Vec<TopProduct>> {
        validate_date_range(scope.from, scope.to)?;
        let limit = Self::limit(limit, DEFAULT_TOP_LIMIT)?;
        Ok(self.db.reports().top_products(scope, limit).await?)
    }

    /// `month` is `YYYY-MM`; defaults to the current month.
    pub async fn employee_performance(
        &self,
        month: Option<&str>,
        store_id: Option<&str>,
    ) -> ServiceResult<Vec<EmployeePerformance>> {
        let month = match month {
            Some(m) => parse_month(m)?,
            None => Self::today(),
        };
        Ok(self.db.reports().employee_performance(month, store_id).await?)
    }

    pub async fn cross_selling(&self, scope: &ReportScope, anchors: Option<i64>) -> ServiceResult<Vec<CrossSellEntry>> {
        validate_date_range(scope.from, scope.to)?;
        let anchors = Self::limit(anchors, DEFAULT_CROSS_SELL_ANCHORS)?;
        Ok(self.db.reports().cross_selling(scope, anchors).await?)
    }

    pub async fn unsold_products(&self, days: Option<i64>, store_id: Option<&str>) -> ServiceResult<Vec<UnsoldProduct>> {
        let days = days.unwrap_or(DEFAULT_UNSOLD_DAYS);
        if days < 1 {
            return Err(ValidationError::MustBePositive {
                field: "days".to_string(),
            }
            .into());
        }
        Ok(self.db.reports().unsold_products(days, Self::today(), store_id).await?)
    }

    pub async fn expenses(&self, scope: &ReportScope) -> ServiceResult<ExpenseReport> {
        validate_date_range(scope.from, scope.to)?;
        Ok(self.db.reports().expense_report(scope).await?)
    }

    pub async fn demographics(&self) -> ServiceResult<Demographics> {
        Ok(self.db.reports().demographics(Self::today()).await?)
    }

    pub async fn dashboard(&self, store_id: Option<&str>) -> ServiceResult<DashboardSummary> {
        Ok(self.db.reports().dashboard(store_id, Self::today()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_bounds() {
        assert_eq!(ReportService::limit(None, 10).unwrap(), 10);
        assert_eq!(ReportService::limit(Some(3), 10).unwrap(), 3);
        assert!(ReportService::limit(Some(0), 10).is_err());
        assert!(ReportService::limit(Some(MAX_TOP_LIMIT + 1), 10).is_err());
    }
}
