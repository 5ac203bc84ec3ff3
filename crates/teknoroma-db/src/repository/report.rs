//! # Report Repository
//!
//! Read-only aggregate queries behind the management dashboards.
//!
//! ## Snapshot Reads
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  let mut tx = pool.begin()                                             │
//! │      ├── aggregate query #1  (&mut *tx)                                │
//! │      ├── aggregate query #2  (&mut *tx)     same snapshot, so totals   │
//! │      └── ...                                 agree with each other     │
//! │  tx.commit()                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancelled and soft-deleted sales never count toward sales figures.
//! Derived figures (percentages, commission, age brackets) are computed by
//! `teknoroma_core::reports`.

use chrono::{Datelike, Duration, NaiveDate};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use teknoroma_core::reports::{
    share_percent, Companion, CrossSellEntry, DashboardSummary, Demographics, EmployeePerformance,
    ExpenseReport, ExpenseSummaryRow, ReportScope, StockReport, TopProduct, UnsoldProduct,
};
use teknoroma_core::{Gender, Money};

/// Companions listed per anchor product in the cross-selling report.
pub const MAX_COMPANIONS: i64 = 5;

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    // =========================================================================
    // Stock
    // =========================================================================

    /// Product counts per stock band and stock value, active products only.
    pub async fn stock_report(&self) -> DbResult<StockReport> {
        debug!("Building stock report");

        let mut tx = self.pool.begin().await?;
        let report = stock_counts(&mut tx).await?;
        tx.commit().await?;

        Ok(report)
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Best-selling products of non-cancelled sales in scope.
    ///
    /// Ordered by quantity desc, then revenue desc, then name asc.
    pub async fn top_products(&self, scope: &ReportScope, limit: i64) -> DbResult<Vec<TopProduct>> {
        debug!(store_id = ?scope.store_id, limit = limit, "Building top products report");

        let mut tx = self.pool.begin().await?;
        let top = top_products_on(&mut tx, scope, limit).await?;
        tx.commit().await?;

        Ok(top)
    }

    /// Completed-sale totals per employee for the month containing `month`.
    ///
    /// Every active employee in scope appears, including those with no sales.
    pub async fn employee_performance(
        &self,
        month: NaiveDate,
        store_id: Option<&str>,
    ) -> DbResult<Vec<EmployeePerformance>> {
        let month_key = month.format("%Y-%m").to_string();
        debug!(month = %month_key, store_id = ?store_id, "Building employee performance report");

        let rows = sqlx::query_as::<_, (String, String, String, i64, i64, i64)>(
            r#"
            SELECT e.id, e.first_name, e.last_name, e.monthly_quota_cents,
                   COUNT(s.id), COALESCE(SUM(s.total_cents), 0)
            FROM employees e
            LEFT JOIN sales s
                   ON s.employee_id = e.id
                  AND s.status = 'completed'
                  AND s.is_deleted = 0
                  AND substr(s.sale_date, 1, 7) = ?
            WHERE e.is_deleted = 0 AND e.is_active = 1
              AND (? IS NULL OR e.store_id = ?)
            GROUP BY e.id, e.first_name, e.last_name, e.monthly_quota_cents
            ORDER BY COALESCE(SUM(s.total_cents), 0) DESC, e.last_name, e.first_name
            "#,
        )
        .bind(&month_key)
        .bind(store_id)
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, first, last, quota, count, total)| {
                EmployeePerformance::compute(
                    id,
                    format!("{first} {last}"),
                    month_key.clone(),
                    count,
                    Money::from_cents(total),
                    Money::from_cents(quota),
                )
            })
            .collect())
    }

    /// For each of the top `anchors` products, the products most often
    /// bought in the same sale.
    pub async fn cross_selling(&self, scope: &ReportScope, anchors: i64) -> DbResult<Vec<CrossSellEntry>> {
        debug!(store_id = ?scope.store_id, anchors = anchors, "Building cross-selling report");

        let mut tx = self.pool.begin().await?;
        let top = top_products_on(&mut tx, scope, anchors).await?;

        let mut entries = Vec::with_capacity(top.len());
        for anchor in top {
            let rows = sqlx::query_as::<_, (String, String, i64)>(
                r#"
                SELECT d2.product_id, p.name, COUNT(DISTINCT d2.sale_id) AS together
                FROM sale_details d1
                JOIN sale_details d2 ON d2.sale_id = d1.sale_id AND d2.product_id <> d1.product_id
                JOIN sales s ON s.id = d1.sale_id
                JOIN products p ON p.id = d2.product_id
                WHERE d1.product_id = ?
                  AND s.status <> 'cancelled' AND s.is_deleted = 0
                  AND (? IS NULL OR s.store_id = ?)
                  AND (? IS NULL OR substr(s.sale_date, 1, 10) >= ?)
                  AND (? IS NULL OR substr(s.sale_date, 1, 10) <= ?)
                GROUP BY d2.product_id, p.name
                ORDER BY together DESC, p.name
                LIMIT ?
                "#,
            )
            .bind(&anchor.product_id)
            .bind(&scope.store_id)
            .bind(&scope.store_id)
            .bind(scope.from)
            .bind(scope.from)
            .bind(scope.to)
            .bind(scope.to)
            .bind(MAX_COMPANIONS)
            .fetch_all(&mut *tx)
            .await?;

            let companions = rows
                .into_iter()
                .map(|(product_id, product_name, together_count)| Companion {
                    product_id,
                    product_name,
                    together_count,
                    percentage: share_percent(together_count, anchor.sale_count),
                })
                .collect();

            entries.push(CrossSellEntry {
                product_id: anchor.product_id,
                product_name: anchor.product_name,
                sale_count: anchor.sale_count,
                companions,
            });
        }

        tx.commit().await?;
        Ok(entries)
    }

    /// Active, in-stock products with no non-cancelled sale in the last
    /// `days` days before and including `today`. Largest stock value first.
    pub async fn unsold_products(
        &self,
        days: i64,
        today: NaiveDate,
        store_id: Option<&str>,
    ) -> DbResult<Vec<UnsoldProduct>> {
        let since = today - Duration::days(days.max(0));
        debug!(days = days, since = %since, "Building unsold products report");

        let products = sqlx::query_as::<_, UnsoldProduct>(
            r#"
            SELECT p.id AS product_id,
                   p.name AS product_name,
                   p.barcode,
                   p.units_in_stock,
                   p.unit_price_cents * p.units_in_stock AS stock_value_cents,
                   (SELECT MAX(s.sale_date)
                      FROM sale_details d JOIN sales s ON s.id = d.sale_id
                     WHERE d.product_id = p.id
                       AND s.status <> 'cancelled' AND s.is_deleted = 0
                       AND (? IS NULL OR s.store_id = ?)) AS last_sold_at
            FROM products p
            WHERE p.is_deleted = 0 AND p.is_active = 1 AND p.units_in_stock > 0
              AND NOT EXISTS (
                  SELECT 1 FROM sale_details d JOIN sales s ON s.id = d.sale_id
                   WHERE d.product_id = p.id
                     AND s.status <> 'cancelled' AND s.is_deleted = 0
                     AND (? IS NULL OR s.store_id = ?)
                     AND substr(s.sale_date, 1, 10) >= ?
              )
            ORDER BY stock_value_cents DESC, p.name
            "#,
        )
        .bind(store_id)
        .bind(store_id)
        .bind(store_id)
        .bind(store_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    // =========================================================================
    // Back Office
    // =========================================================================

    /// Expenses in TRY grouped by month and type.
    pub async fn expense_report(&self, scope: &ReportScope) -> DbResult<ExpenseReport> {
        debug!(store_id = ?scope.store_id, "Building expense report");

        let rows = sqlx::query_as::<_, ExpenseSummaryRow>(
            r#"
            SELECT substr(expense_date, 1, 7) AS month,
                   expense_type,
                   COUNT(*) AS expense_count,
                   SUM(amount_in_try_cents) AS total_try_cents
            FROM expenses
            WHERE is_deleted = 0
              AND (? IS NULL OR store_id = ?)
              AND (? IS NULL OR expense_date >= ?)
              AND (? IS NULL OR expense_date <= ?)
            GROUP BY month, expense_type
            ORDER BY month, expense_type
            "#,
        )
        .bind(&scope.store_id)
        .bind(&scope.store_id)
        .bind(scope.from)
        .bind(scope.from)
        .bind(scope.to)
        .bind(scope.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(ExpenseReport::from_rows(rows))
    }

    /// Customer counts by gender, age bracket and city.
    pub async fn demographics(&self, today: NaiveDate) -> DbResult<Demographics> {
        debug!("Building customer demographics");

        let rows = sqlx::query_as::<_, (Option<Gender>, Option<NaiveDate>, Option<String>)>(
            "SELECT gender, birth_date, city FROM customers WHERE is_deleted = 0",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Demographics::build(rows, today))
    }

    /// Headline figures for one store (or the whole chain) on `today`.
    pub async fn dashboard(&self, store_id: Option<&str>, today: NaiveDate) -> DbResult<DashboardSummary> {
        debug!(store_id = ?store_id, today = %today, "Building dashboard");

        let mut tx = self.pool.begin().await?;

        let (today_sale_count, today_revenue_cents): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0) FROM sales
            WHERE status = 'completed' AND is_deleted = 0
              AND substr(sale_date, 1, 10) = ?
              AND (? IS NULL OR store_id = ?)
            "#,
        )
        .bind(today)
        .bind(store_id)
        .bind(store_id)
        .fetch_one(&mut *tx)
        .await?;

        let (pending_sales, preparing_sales): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(status = 'pending'), 0), COALESCE(SUM(status = 'preparing'), 0)
            FROM sales
            WHERE is_deleted = 0 AND (? IS NULL OR store_id = ?)
            "#,
        )
        .bind(store_id)
        .bind(store_id)
        .fetch_one(&mut *tx)
        .await?;

        let stock = stock_counts(&mut tx).await?;

        let open_tickets: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM technical_services
            WHERE is_deleted = 0
              AND status IN ('open', 'in_progress', 'waiting_for_parts')
              AND (? IS NULL OR store_id = ?)
            "#,
        )
        .bind(store_id)
        .bind(store_id)
        .fetch_one(&mut *tx)
        .await?;

        let month_key = format!("{:04}-{:02}", today.year(), today.month());
        let month_expense_try_cents: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount_in_try_cents), 0) FROM expenses
            WHERE is_deleted = 0
              AND substr(expense_date, 1, 7) = ?
              AND (? IS NULL OR store_id = ?)
            "#,
        )
        .bind(&month_key)
        .bind(store_id)
        .bind(store_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            store_id: store_id.map(str::to_string),
            date: today,
            today_revenue_cents,
            today_sale_count,
            pending_sales,
            preparing_sales,
            critical_products: stock.critical,
            out_of_stock_products: stock.out_of_stock,
            open_tickets,
            month_expense_try_cents,
        })
    }
}

// =============================================================================
// Shared Queries
// =============================================================================

async fn stock_counts(conn: &mut SqliteConnection) -> DbResult<StockReport> {
    let (total_products, sufficient, critical, out_of_stock, total_stock_value_cents): (i64, i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(stock_status = 'sufficient'), 0),
                   COALESCE(SUM(stock_status = 'critical'), 0),
                   COALESCE(SUM(stock_status = 'out_of_stock'), 0),
                   COALESCE(SUM(unit_price_cents * units_in_stock), 0)
            FROM products
            WHERE is_deleted = 0 AND is_active = 1
            "#,
        )
        .fetch_one(conn)
        .await?;

    Ok(StockReport {
        total_products,
        sufficient,
        critical,
        out_of_stock,
        total_stock_value_cents,
    })
}

async fn top_products_on(conn: &mut SqliteConnection, scope: &ReportScope, limit: i64) -> DbResult<Vec<TopProduct>> {
    let top = sqlx::query_as::<_, TopProduct>(
        r#"
        SELECT d.product_id AS product_id,
               p.name AS product_name,
               SUM(d.quantity) AS quantity_sold,
               SUM(d.total_cents) AS revenue_cents,
               COUNT(DISTINCT d.sale_id) AS sale_count
        FROM sale_details d
        JOIN sales s ON s.id = d.sale_id
        JOIN products p ON p.id = d.product_id
        WHERE s.status <> 'cancelled' AND s.is_deleted = 0
          AND (? IS NULL OR s.store_id = ?)
          AND (? IS NULL OR substr(s.sale_date, 1, 10) >= ?)
          AND (? IS NULL OR substr(s.sale_date, 1, 10) <= ?)
        GROUP BY d.product_id, p.name
        ORDER BY quantity_sold DESC, revenue_cents DESC, product_name ASC
        LIMIT ?
        "#,
    )
    .bind(&scope.store_id)
    .bind(&scope.store_id)
    .bind(scope.from)
    .bind(scope.from)
    .bind(scope.to)
    .bind(scope.to)
    .bind(limit.max(0))
    .fetch_all(conn)
    .await?;

    Ok(top)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::{new_id, ExpenseRepository, SaleRepository};
    use chrono::{DateTime, TimeZone, Utc};
    use teknoroma_core::{
        Currency, Customer, Employee, ExchangeRate, Expense, ExpenseType, PaymentType, Product, Role, Sale,
        SaleDetail, SaleStatus, StockStatus, Store,
    };

    struct Fixture {
        db: Database,
        store: String,
        customer: String,
        employee: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let store = db
            .stores()
            .insert(&Store {
                id: new_id(),
                name: "Kadıköy".into(),
                city: "İstanbul".into(),
                district: None,
                address: None,
                phone: None,
                is_deleted: false,
                created_at: now,
                modified_at: None,
            })
            .await
            .unwrap();

        let customer = db
            .customers()
            .insert(&Customer {
                id: new_id(),
                identity_number: None,
                first_name: "Ayşe".into(),
                last_name: "Yılmaz".into(),
                phone: None,
                email: None,
                address: None,
                city: Some("İstanbul".into()),
                gender: Some(Gender::Female),
                birth_date: NaiveDate::from_ymd_opt(1990, 3, 1),
                is_deleted: false,
                created_at: now,
                modified_at: None,
            })
            .await
            .unwrap();

        let employee = db
            .employees()
            .insert(&Employee {
                id: new_id(),
                first_name: "Mehmet".into(),
                last_name: "Kaya".into(),
                email: None,
                phone: None,
                role: Role::Cashier,
                store_id: store.id.clone(),
                department_id: None,
                hire_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                salary_cents: 0,
                monthly_quota_cents: 1_000_000,
                is_active: true,
                is_deleted: false,
                created_at: now,
                modified_at: None,
            })
            .await
            .unwrap();

        Fixture {
            db,
            store: store.id,
            customer: customer.id,
            employee: employee.id,
        }
    }

    async fn product(f: &Fixture, name: &str, price: i64, units: i64) -> Product {
        f.db.products()
            .insert(&Product {
                id: new_id(),
                name: name.into(),
                barcode: new_id(),
                description: None,
                unit_price_cents: price,
                units_in_stock: units,
                critical_stock_level: 2,
                stock_status: StockStatus::Sufficient,
                category_id: None,
                supplier_id: None,
                is_active: true,
                version: 1,
                is_deleted: false,
                created_at: Utc::now(),
                modified_at: None,
            })
            .await
            .unwrap()
    }

    /// Writes a sale directly; lines are (product, quantity).
    async fn sale(f: &Fixture, at: DateTime<Utc>, status: SaleStatus, lines: &[(&Product, i64)]) {
        let id = new_id();
        let subtotal: i64 = lines.iter().map(|(p, q)| p.unit_price_cents * q).sum();
        let tax = subtotal / 5;

        let mut uow = f.db.begin().await.unwrap();
        SaleRepository::insert_in(
            uow.conn(),
            &Sale {
                id: id.clone(),
                sale_number: format!("S-{}", new_id()),
                sale_date: at,
                customer_id: f.customer.clone(),
                employee_id: f.employee.clone(),
                store_id: f.store.clone(),
                status,
                payment_type: PaymentType::Cash,
                subtotal_cents: subtotal,
                tax_cents: tax,
                discount_cents: 0,
                total_cents: subtotal + tax,
                cancellation_reason: None,
                notes: None,
                is_deleted: false,
                created_at: at,
                modified_at: None,
            },
        )
        .await
        .unwrap();

        for (p, q) in lines {
            let total = p.unit_price_cents * q;
            SaleRepository::insert_detail_in(
                uow.conn(),
                &SaleDetail {
                    id: new_id(),
                    sale_id: id.clone(),
                    product_id: p.id.clone(),
                    product_name: p.name.clone(),
                    unit_price_cents: p.unit_price_cents,
                    quantity: *q,
                    discount_bps: 0,
                    subtotal_cents: total,
                    discount_cents: 0,
                    total_cents: total,
                    created_at: at,
                },
            )
            .await
            .unwrap();
        }
        uow.commit().await.unwrap();
    }

    /// Writes an expense converted at `rate` (ten-thousandths of a TRY).
    async fn expense(
        f: &Fixture,
        store: &str,
        date: (i32, u32, u32),
        kind: ExpenseType,
        cents: i64,
        currency: Currency,
        rate: i64,
    ) {
        let rate = ExchangeRate::from_ten_thousandths(rate);
        let mut uow = f.db.begin().await.unwrap();
        ExpenseRepository::insert_in(
            uow.conn(),
            &Expense {
                id: new_id(),
                expense_number: format!("G-{}", new_id()),
                store_id: store.to_string(),
                employee_id: None,
                expense_type: kind,
                description: "Gider".into(),
                amount_cents: cents,
                currency,
                exchange_rate: rate.ten_thousandths(),
                amount_in_try_cents: Money::from_cents(cents).convert(rate).unwrap().cents(),
                expense_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
                is_paid: false,
                payment_date: None,
                is_deleted: false,
                created_at: Utc::now(),
                modified_at: None,
            },
        )
        .await
        .unwrap();
        uow.commit().await.unwrap();
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_stock_report() {
        let f = fixture().await;
        product(&f, "Laptop", 2_000_000, 10).await;
        product(&f, "Mouse", 10_000, 1).await;
        product(&f, "Cable", 5_000, 0).await;

        let report = f.db.reports().stock_report().await.unwrap();
        assert_eq!(report.total_products, 3);
        assert_eq!(report.sufficient, 1);
        assert_eq!(report.critical, 1);
        assert_eq!(report.out_of_stock, 1);
        assert_eq!(report.total_stock_value_cents, 20_010_000);
    }

    #[tokio::test]
    async fn test_top_products_ordering_and_cancelled_excluded() {
        let f = fixture().await;
        let a = product(&f, "Alpha", 1_000, 100).await;
        let b = product(&f, "Beta", 1_000, 100).await;
        let c = product(&f, "Gamma", 2_000, 100).await;

        sale(&f, at(2024, 5, 1), SaleStatus::Completed, &[(&a, 3), (&b, 3)]).await;
        sale(&f, at(2024, 5, 2), SaleStatus::Pending, &[(&c, 3)]).await;
        sale(&f, at(2024, 5, 3), SaleStatus::Cancelled, &[(&a, 50)]).await;

        let top = f.db.reports().top_products(&ReportScope::default(), 10).await.unwrap();
        let names: Vec<_> = top.iter().map(|t| t.product_name.as_str()).collect();
        // equal quantity: higher revenue first, then name
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
        assert_eq!(top[1].quantity_sold, 3);

        let scoped = ReportScope::default().between(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        );
        let top = f.db.reports().top_products(&scoped, 10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].product_id, c.id);
    }

    #[tokio::test]
    async fn test_employee_performance_counts_completed_only() {
        let f = fixture().await;
        let laptop = product(&f, "Laptop", 1_250_000, 10).await;

        // 12,500.00 + 20% tax = 15,000.00
        sale(&f, at(2024, 5, 10), SaleStatus::Completed, &[(&laptop, 1)]).await;
        sale(&f, at(2024, 5, 11), SaleStatus::Pending, &[(&laptop, 1)]).await;
        sale(&f, at(2024, 6, 1), SaleStatus::Completed, &[(&laptop, 1)]).await;

        let month = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let perf = f.db.reports().employee_performance(month, Some(&f.store)).await.unwrap();

        assert_eq!(perf.len(), 1);
        assert_eq!(perf[0].month, "2024-05");
        assert_eq!(perf[0].sale_count, 1);
        assert_eq!(perf[0].total_sales_cents, 1_500_000);
        assert_eq!(perf[0].commission_cents, 50_000);
        assert_eq!(perf[0].achievement_percent, 150.0);
    }

    #[tokio::test]
    async fn test_cross_selling_percentages() {
        let f = fixture().await;
        let phone = product(&f, "Phone", 1_000, 100).await;
        let case = product(&f, "Case", 100, 100).await;
        let charger = product(&f, "Charger", 100, 100).await;

        sale(&f, at(2024, 5, 1), SaleStatus::Completed, &[(&phone, 5), (&case, 1)]).await;
        sale(&f, at(2024, 5, 2), SaleStatus::Completed, &[(&phone, 5), (&case, 1), (&charger, 1)]).await;
        sale(&f, at(2024, 5, 3), SaleStatus::Completed, &[(&phone, 5)]).await;
        sale(&f, at(2024, 5, 4), SaleStatus::Completed, &[(&phone, 5)]).await;

        let entries = f.db.reports().cross_selling(&ReportScope::default(), 1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].product_id, phone.id);
        assert_eq!(entries[0].sale_count, 4);

        let companions = &entries[0].companions;
        assert_eq!(companions[0].product_name, "Case");
        assert_eq!(companions[0].together_count, 2);
        assert_eq!(companions[0].percentage, 50.0);
        assert_eq!(companions[1].percentage, 25.0);
    }

    #[tokio::test]
    async fn test_unsold_products() {
        let f = fixture().await;
        let sold = product(&f, "Sold", 1_000, 10).await;
        let stale = product(&f, "Stale", 1_000, 10).await;
        let never = product(&f, "Never", 5_000, 10).await;
        product(&f, "Empty", 1_000, 0).await;

        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        sale(&f, at(2024, 6, 20), SaleStatus::Completed, &[(&sold, 1)]).await;
        sale(&f, at(2024, 1, 5), SaleStatus::Completed, &[(&stale, 1)]).await;

        let unsold = f.db.reports().unsold_products(90, today, None).await.unwrap();
        let ids: Vec<_> = unsold.iter().map(|u| u.product_id.as_str()).collect();
        assert_eq!(ids, vec![never.id.as_str(), stale.id.as_str()]);
        assert!(unsold[0].last_sold_at.is_none());
        assert!(unsold[1].last_sold_at.is_some());
    }

    #[tokio::test]
    async fn test_dashboard() {
        let f = fixture().await;
        let p = product(&f, "Tablet", 10_000, 3).await;

        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        sale(&f, at(2024, 5, 10), SaleStatus::Completed, &[(&p, 1)]).await;
        sale(&f, at(2024, 5, 10), SaleStatus::Pending, &[(&p, 1)]).await;
        sale(&f, at(2024, 5, 9), SaleStatus::Preparing, &[(&p, 1)]).await;

        let summary = f.db.reports().dashboard(Some(&f.store), today).await.unwrap();
        assert_eq!(summary.today_sale_count, 1);
        assert_eq!(summary.today_revenue_cents, 12_000);
        assert_eq!(summary.pending_sales, 1);
        assert_eq!(summary.preparing_sales, 1);
        assert_eq!(summary.open_tickets, 0);
        assert_eq!(summary.month_expense_try_cents, 0);
    }

    #[tokio::test]
    async fn test_expense_report() {
        let f = fixture().await;
        let other = f
            .db
            .stores()
            .insert(&Store {
                id: new_id(),
                name: "Çankaya".into(),
                city: "Ankara".into(),
                district: None,
                address: None,
                phone: None,
                is_deleted: false,
                created_at: Utc::now(),
                modified_at: None,
            })
            .await
            .unwrap();

        expense(&f, &f.store, (2024, 5, 3), ExpenseType::Rent, 1_000_000, Currency::Try, 10_000).await;
        // 100.00 USD at 34.5000, 50.00 EUR at 37.2000
        expense(&f, &f.store, (2024, 5, 20), ExpenseType::Utility, 10_000, Currency::Usd, 345_000).await;
        expense(&f, &f.store, (2024, 5, 25), ExpenseType::Utility, 5_000, Currency::Eur, 372_000).await;
        expense(&f, &f.store, (2024, 6, 2), ExpenseType::Utility, 50_000, Currency::Try, 10_000).await;
        expense(&f, &other.id, (2024, 5, 10), ExpenseType::Rent, 2_000_000, Currency::Try, 10_000).await;

        let report = f.db.reports().expense_report(&ReportScope::default()).await.unwrap();
        let rows: Vec<_> = report
            .rows
            .iter()
            .map(|r| (r.month.as_str(), r.expense_type, r.expense_count, r.total_try_cents))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("2024-05", ExpenseType::Rent, 2, 3_000_000),
                ("2024-05", ExpenseType::Utility, 2, 531_000),
                ("2024-06", ExpenseType::Utility, 1, 50_000),
            ]
        );
        assert_eq!(report.total_try_cents, 3_581_000);

        let store_only = f.db.reports().expense_report(&ReportScope::for_store(&f.store)).await.unwrap();
        assert_eq!(store_only.rows.len(), 3);
        assert_eq!(store_only.rows[0].total_try_cents, 1_000_000);
        assert_eq!(store_only.total_try_cents, 1_581_000);

        let may = ReportScope::for_store(&f.store).between(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
        );
        let may = f.db.reports().expense_report(&may).await.unwrap();
        assert_eq!(may.rows.len(), 2);
        assert_eq!(may.total_try_cents, 1_531_000);
    }

    #[tokio::test]
    async fn test_demographics() {
        let f = fixture().await;
        let d = f
            .db
            .reports()
            .demographics(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(d.total_customers, 1);
        assert_eq!(d.by_age[2].label, "26-35");
        assert_eq!(d.by_age[2].count, 1);
        assert_eq!(d.by_city[0].label, "İstanbul");
    }
}
