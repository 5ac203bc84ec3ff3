//! # Sale Workflow
//!
//! Creating, advancing and cancelling sales.
//!
//! ## CreateSale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate request (lines, quantities, discounts)        no I/O          │
//! │       │                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────────┐  │
//! │  │  customer / employee / store exist?              → NotFound       │  │
//! │  │  every product active, combined qty ≤ stock?     → NotFound /     │  │
//! │  │                                                    InsufficientStock│ │
//! │  │  price lines, totals, check sale discount        → Validation     │  │
//! │  │  next S-YYYY-NNNNN                                                │  │
//! │  │  insert header + lines (name/price snapshots)                     │  │
//! │  │  guarded decrement per line + reclassify                          │  │
//! │  COMMIT ────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │  notify: NewSale, MobileSale, CriticalStock          fire-and-forget    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error before COMMIT drops the unit of work, which rolls back the
//! number allocation, the inserts and the stock changes together.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use teknoroma_core::lifecycle::ensure_sale_transition;
use teknoroma_core::pricing::{price_line, SaleTotals};
use teknoroma_core::validation::{
    validate_date_range, validate_discount_percent, validate_line_count, validate_name, validate_quantity,
    validate_sale_discount,
};
use teknoroma_core::{
    CoreError, DocumentKind, Money, PaymentType, Rate, Role, Sale, SaleDetail, SaleStatus, SaleWithDetails,
    ValidationError,
};
use teknoroma_db::repository::new_id;
use teknoroma_db::{
    load_with_details_in, CustomerRepository, Database, DbError, EmployeeRepository, ProductRepository,
    SaleFilter, SaleRepository, SequenceRepository, StockChange, StoreRepository,
};

use crate::error::ServiceResult;
use crate::services::notification::{publish_stock_alerts, Event, Notifier, Topic};

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity: i64,
    /// 0..=100
    #[serde(default)]
    pub discount_percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleRequest {
    pub customer_id: String,
    pub employee_id: String,
    pub store_id: String,
    pub payment_type: PaymentType,
    pub items: Vec<SaleLineRequest>,
    /// Sale-level discount in kuruş.
    #[serde(default)]
    pub discount_cents: i64,
    pub notes: Option<String>,
    /// Back-dated entry (e.g. a paper receipt); defaults to now.
    pub sale_date: Option<DateTime<Utc>>,
}

impl CreateSaleRequest {
    /// Checks everything that needs no database access.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_line_count(self.items.len())?;
        for item in &self.items {
            validate_quantity(item.quantity)?;
            validate_discount_percent(item.discount_percent)?;
        }
        if self.discount_cents < 0 {
            return Err(ValidationError::MustBePositive {
                field: "discount".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone)]
pub struct SaleService {
    db: Database,
    notifier: Arc<dyn Notifier>,
}

impl SaleService {
    pub fn new(db: Database, notifier: Arc<dyn Notifier>) -> Self {
        SaleService { db, notifier }
    }

    /// Creates a sale atomically and publishes the resulting notifications.
    pub async fn create(&self, req: CreateSaleRequest) -> ServiceResult<SaleWithDetails> {
        req.validate()?;

        let now = Utc::now();
        let sale_date = req.sale_date.unwrap_or(now);

        let mut uow = self.db.begin().await?;

        CustomerRepository::get_active_in(uow.conn(), &req.customer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Customer", &req.customer_id))?;
        let employee = EmployeeRepository::get_active_in(uow.conn(), &req.employee_id)
            .await?
            .filter(|e| e.is_active)
            .ok_or_else(|| CoreError::not_found("Employee", &req.employee_id))?;
        StoreRepository::get_active_in(uow.conn(), &req.store_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Store", &req.store_id))?;

        // Lines for the same product are checked against their combined quantity.
        let mut requested: HashMap<&str, i64> = HashMap::new();
        for item in &req.items {
            *requested.entry(item.product_id.as_str()).or_default() += item.quantity;
        }

        let mut products = HashMap::new();
        for (product_id, quantity) in &requested {
            let product = ProductRepository::get_active_in(uow.conn(), product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| CoreError::not_found("Product", *product_id))?;

            if *quantity > product.units_in_stock {
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.units_in_stock,
                    requested: *quantity,
                }
                .into());
            }
            products.insert(product.id.clone(), product);
        }

        let mut priced = Vec::with_capacity(req.items.len());
        for item in &req.items {
            let product = products
                .get(&item.product_id)
                .ok_or_else(|| CoreError::not_found("Product", &item.product_id))?;
            let line = price_line(
                product.unit_price(),
                item.quantity,
                Rate::from_percentage(item.discount_percent),
            )?;
            priced.push((product, line));
        }

        let lines: Vec<_> = priced.iter().map(|(_, l)| *l).collect();
        let sale_discount = Money::from_cents(req.discount_cents);
        let totals = SaleTotals::compute(&lines, sale_discount)?;
        validate_sale_discount(sale_discount, totals.gross())?;

        let sale_number = SequenceRepository::next_in(uow.conn(), DocumentKind::Sale, sale_date.year()).await?;
        let sale = Sale {
            id: new_id(),
            sale_number,
            sale_date,
            customer_id: req.customer_id.clone(),
            employee_id: req.employee_id.clone(),
            store_id: req.store_id.clone(),
            status: SaleStatus::Pending,
            payment_type: req.payment_type,
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: totals.tax.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
            cancellation_reason: None,
            notes: req.notes.clone(),
            is_deleted: false,
            created_at: now,
            modified_at: None,
        };
        SaleRepository::insert_in(uow.conn(), &sale).await?;

        let mut changes = Vec::with_capacity(priced.len());
        for (product, line) in &priced {
            SaleRepository::insert_detail_in(
                uow.conn(),
                &SaleDetail {
                    id: new_id(),
                    sale_id: sale.id.clone(),
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    unit_price_cents: line.unit_price.cents(),
                    quantity: line.quantity,
                    discount_bps: line.discount_rate.bps(),
                    subtotal_cents: line.subtotal.cents(),
                    discount_cents: line.discount.cents(),
                    total_cents: line.total.cents(),
                    created_at: now,
                },
            )
            .await?;

            let change = ProductRepository::decrement_stock_in(uow.conn(), &product.id, line.quantity)
                .await?
                .ok_or_else(|| CoreError::InsufficientStock {
                    product: product.name.clone(),
                    available: product.units_in_stock,
                    requested: line.quantity,
                })?;
            changes.push(change);
        }

        let created = load_with_details_in(uow.conn(), &sale.id).await?;
        uow.commit().await?;

        info!(
            sale_id = %created.sale.id,
            sale_number = %created.sale.sale_number,
            total_cents = created.sale.total_cents,
            lines = created.details.len(),
            "Sale created"
        );

        self.notifier.notify(
            Topic::Role(Role::StoreManager),
            Event::NewSale {
                sale_id: created.sale.id.clone(),
                sale_number: created.sale.sale_number.clone(),
                store_id: created.sale.store_id.clone(),
                employee_id: created.sale.employee_id.clone(),
                total_cents: created.sale.total_cents,
            },
        );
        if employee.role == Role::MobileSales {
            self.notifier.notify(
                Topic::Role(Role::Warehouse),
                Event::MobileSale {
                    sale_id: created.sale.id.clone(),
                    sale_number: created.sale.sale_number.clone(),
                    employee_id: created.sale.employee_id.clone(),
                    total_cents: created.sale.total_cents,
                },
            );
        }
        publish_stock_alerts(self.notifier.as_ref(), &changes);

        Ok(created)
    }

    /// Pending → Preparing.
    pub async fn confirm_payment(&self, id: &str) -> ServiceResult<SaleWithDetails> {
        let (sale, _) = self.transition(id, SaleStatus::Preparing, None).await?;

        for topic in [Topic::User(sale.sale.employee_id.clone()), Topic::Role(Role::Cashier)] {
            self.notifier.notify(
                topic,
                Event::PaymentConfirmed {
                    sale_id: sale.sale.id.clone(),
                    sale_number: sale.sale.sale_number.clone(),
                },
            );
        }

        Ok(sale)
    }

    /// Preparing → Completed.
    pub async fn complete(&self, id: &str) -> ServiceResult<SaleWithDetails> {
        let (sale, _) = self.transition(id, SaleStatus::Completed, None).await?;
        Ok(sale)
    }

    /// Pending|Preparing → Cancelled, restoring every line's stock.
    pub async fn cancel(&self, id: &str, reason: &str) -> ServiceResult<SaleWithDetails> {
        let reason = validate_name("reason", reason, 500)?;
        let (sale, restored) = self.transition(id, SaleStatus::Cancelled, Some(&reason)).await?;

        info!(sale_number = %sale.sale.sale_number, products = restored.len(), "Sale cancelled, stock restored");
        Ok(sale)
    }

    async fn transition(
        &self,
        id: &str,
        to: SaleStatus,
        reason: Option<&str>,
    ) -> ServiceResult<(SaleWithDetails, Vec<StockChange>)> {
        let mut uow = self.db.begin().await?;

        let sale = SaleRepository::get_in(uow.conn(), id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", id))?;
        ensure_sale_transition(&sale.sale_number, sale.status, to)?;

        if !SaleRepository::transition_in(uow.conn(), id, sale.status, to, reason).await? {
            return Err(CoreError::InvalidStateTransition {
                entity: "Sale".to_string(),
                id: sale.sale_number,
                from: sale.status.to_string(),
                to: to.to_string(),
            }
            .into());
        }

        let mut restored = Vec::new();
        if to == SaleStatus::Cancelled {
            for detail in SaleRepository::details_in(uow.conn(), id).await? {
                match ProductRepository::increment_stock_in(uow.conn(), &detail.product_id, detail.quantity).await {
                    Ok(change) => restored.push(change),
                    Err(DbError::NotFound { .. }) => {
                        warn!(product_id = %detail.product_id, "Product deleted since sale, stock not restored");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let updated = load_with_details_in(uow.conn(), id).await?;
        uow.commit().await?;

        info!(sale_number = %updated.sale.sale_number, from = %sale.status, to = %to, "Sale status changed");
        Ok((updated, restored))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub async fn get(&self, id: &str) -> ServiceResult<SaleWithDetails> {
        Ok(self
            .db
            .sales()
            .get_with_details(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", id))?)
    }

    pub async fn get_by_number(&self, sale_number: &str) -> ServiceResult<SaleWithDetails> {
        match DocumentKind::parse(sale_number) {
            Some((DocumentKind::Sale, _, _)) => {}
            _ => {
                return Err(ValidationError::invalid_format("sale_number", "expected S-YYYY-NNNNN").into());
            }
        }

        let sale = self
            .db
            .sales()
            .get_by_number(sale_number)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_number))?;
        let details = self.db.sales().details(&sale.id).await?;
        Ok(SaleWithDetails { sale, details })
    }

    pub async fn list(&self, filter: &SaleFilter) -> ServiceResult<Vec<Sale>> {
        validate_date_range(filter.from, filter.to)?;
        Ok(self.db.sales().list(filter).await?)
    }

    pub async fn details(&self, id: &str) -> ServiceResult<Vec<SaleDetail>> {
        self.get(id).await.map(|s| s.details)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use teknoroma_core::{StockStatus, Visibility};
    use teknoroma_db::DbConfig;

    use super::*;
    use crate::error::ServiceError;
    use crate::services::{CatalogService, PeopleService};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Topic, Event)>>);

    impl Notifier for Recorder {
        fn notify(&self, topic: Topic, event: Event) {
            if let Ok(mut sent) = self.0.lock() {
                sent.push((topic, event));
            }
        }
    }

    impl Recorder {
        fn topics(&self) -> Vec<Topic> {
            self.0.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
        }
    }

    struct Shop {
        db: Database,
        recorder: Arc<Recorder>,
        service: SaleService,
        store_id: String,
        employee_id: String,
        customer_id: String,
    }

    async fn shop(role: &str) -> Shop {
        shop_on(Database::new(DbConfig::in_memory()).await.unwrap(), role).await
    }

    async fn shop_on(db: Database, role: &str) -> Shop {
        let people = PeopleService::new(db.clone());

        let store = people
            .create_store(serde_json::from_value(json!({ "name": "Beşiktaş", "city": "İstanbul" })).unwrap())
            .await
            .unwrap();
        let employee = people
            .create_employee(
                serde_json::from_value(json!({
                    "first_name": "Can",
                    "last_name": "Kaya",
                    "role": role,
                    "store_id": store.id,
                    "hire_date": "2022-09-01",
                }))
                .unwrap(),
            )
            .await
            .unwrap();
        let customer = people
            .create_customer(serde_json::from_value(json!({ "first_name": "Elif", "last_name": "Şahin" })).unwrap())
            .await
            .unwrap();

        let recorder = Arc::new(Recorder::default());
        Shop {
            service: SaleService::new(db.clone(), recorder.clone()),
            db,
            recorder,
            store_id: store.id,
            employee_id: employee.id,
            customer_id: customer.id,
        }
    }

    async fn product(db: &Database, barcode: &str, units: i64, critical: i64) -> String {
        CatalogService::new(db.clone())
            .create_product(
                serde_json::from_value(json!({
                    "name": format!("Ürün {barcode}"),
                    "barcode": barcode,
                    "unit_price_cents": 2_500,
                    "units_in_stock": units,
                    "critical_stock_level": critical,
                }))
                .unwrap(),
            )
            .await
            .unwrap()
            .id
    }

    fn request(shop: &Shop, items: Vec<(&str, i64)>) -> CreateSaleRequest {
        CreateSaleRequest {
            customer_id: shop.customer_id.clone(),
            employee_id: shop.employee_id.clone(),
            store_id: shop.store_id.clone(),
            payment_type: PaymentType::CreditCard,
            items: items
                .into_iter()
                .map(|(product_id, quantity)| SaleLineRequest {
                    product_id: product_id.to_string(),
                    quantity,
                    discount_percent: 0.0,
                })
                .collect(),
            discount_cents: 0,
            notes: None,
            sale_date: None,
        }
    }

    async fn units(db: &Database, id: &str) -> (i64, StockStatus) {
        let p = CatalogService::new(db.clone())
            .get_product(id, Visibility::Active)
            .await
            .unwrap();
        (p.units_in_stock, p.stock_status)
    }

    #[tokio::test]
    async fn test_failed_sale_leaves_nothing_behind() {
        let shop = shop("cashier").await;
        let plenty = product(&shop.db, "8690000000101", 10, 2).await;
        let scarce = product(&shop.db, "8690000000102", 1, 0).await;

        let err = shop
            .service
            .create(request(&shop, vec![(&plenty, 2), (&scarce, 2)]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Core(CoreError::InsufficientStock { requested: 2, .. })));
        assert_eq!(units(&shop.db, &plenty).await.0, 10);
        assert_eq!(units(&shop.db, &scarce).await.0, 1);
        assert!(shop.service.list(&SaleFilter::default()).await.unwrap().is_empty());
        assert!(shop.recorder.topics().is_empty());

        // The number was not consumed either.
        let sale = shop.service.create(request(&shop, vec![(&plenty, 1)])).await.unwrap();
        assert!(sale.sale.sale_number.ends_with("-00001"));
    }

    #[tokio::test]
    async fn test_repeated_product_lines_share_the_stock_check() {
        let shop = shop("cashier").await;
        let id = product(&shop.db, "8690000000103", 3, 0).await;

        let err = shop
            .service
            .create(request(&shop, vec![(&id, 2), (&id, 2)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InsufficientStock { available: 3, requested: 4, .. })
        ));
        assert_eq!(units(&shop.db, &id).await.0, 3);
    }

    #[tokio::test]
    async fn test_mobile_sale_notifies_warehouse_and_stock_alerts() {
        let shop = shop("mobile_sales").await;
        let id = product(&shop.db, "8690000000104", 5, 2).await;

        shop.service.create(request(&shop, vec![(&id, 4)])).await.unwrap();

        assert_eq!(units(&shop.db, &id).await, (1, StockStatus::Critical));
        assert_eq!(
            shop.recorder.topics(),
            vec![
                Topic::Role(Role::StoreManager),
                Topic::Role(Role::Warehouse),
                Topic::Role(Role::Warehouse),
                Topic::Role(Role::StoreManager),
            ]
        );
        let sent = shop.recorder.0.lock().unwrap();
        assert!(matches!(sent[1].1, Event::MobileSale { .. }));
        assert!(matches!(
            sent[2].1,
            Event::CriticalStock { units_in_stock: 1, stock_status: StockStatus::Critical, .. }
        ));
    }

    #[tokio::test]
    async fn test_cancel_restores_stock_and_is_terminal() {
        let shop = shop("cashier").await;
        let id = product(&shop.db, "8690000000105", 6, 1).await;

        let sale = shop.service.create(request(&shop, vec![(&id, 6)])).await.unwrap();
        assert_eq!(units(&shop.db, &id).await, (0, StockStatus::OutOfStock));

        let paid = shop.service.confirm_payment(&sale.sale.id).await.unwrap();
        assert_eq!(paid.sale.status, SaleStatus::Preparing);

        let cancelled = shop.service.cancel(&sale.sale.id, "Müşteri vazgeçti").await.unwrap();
        assert_eq!(cancelled.sale.status, SaleStatus::Cancelled);
        assert_eq!(units(&shop.db, &id).await, (6, StockStatus::Sufficient));

        let err = shop.service.complete(&sale.sale.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::InvalidStateTransition { .. })));
    }

    #[tokio::test]
    async fn test_details_keep_the_price_and_name_sold_at() {
        let shop = shop("cashier").await;
        let id = product(&shop.db, "8690000000107", 5, 0).await;

        let sale = shop.service.create(request(&shop, vec![(&id, 2)])).await.unwrap();

        CatalogService::new(shop.db.clone())
            .update_product(
                &id,
                serde_json::from_value(json!({
                    "name": "Ürün yeni ad",
                    "barcode": "8690000000107",
                    "unit_price_cents": 9_900,
                    "critical_stock_level": 0,
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let details = shop.service.details(&sale.sale.id).await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].product_name, "Ürün 8690000000107");
        assert_eq!(details[0].unit_price_cents, 2_500);
        assert_eq!(details[0].total_cents, 5_000);
        assert_eq!(details[0].id, sale.details[0].id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_never_oversell() {
        let path = std::env::temp_dir().join(format!("teknoroma-sales-{}.db", new_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(8)).await.unwrap();
        let shop = shop_on(db, "cashier").await;
        let id = product(&shop.db, "8690000000108", 16, 0).await;

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let service = shop.service.clone();
                let req = request(&shop, vec![(&id, 1)]);
                tokio::spawn(async move { service.create(req).await })
            })
            .collect();

        let mut numbers = Vec::new();
        let mut short = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(sale) => numbers.push(sale.sale.sale_number),
                Err(ServiceError::Core(CoreError::InsufficientStock { .. })) => short += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(numbers.len(), 16);
        assert_eq!(short, 4);
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), 16);
        assert_eq!(units(&shop.db, &id).await, (0, StockStatus::OutOfStock));

        shop.db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    #[tokio::test]
    async fn test_sale_discount_above_gross_rejected() {
        let shop = shop("cashier").await;
        let id = product(&shop.db, "8690000000106", 5, 0).await;

        let mut req = request(&shop, vec![(&id, 1)]);
        // 2,500 + 20% tax = 3,000
        req.discount_cents = 3_001;

        let err = shop.service.create(req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));
        assert_eq!(units(&shop.db, &id).await.0, 5);
    }
}
