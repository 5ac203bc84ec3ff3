//! # TeknoRoma API
//!
//! HTTP + WebSocket front of the TeknoRoma retail backend.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         apps/api                                        │
//! │                                                                         │
//! │  axum Router ── TraceLayer ── CorsLayer                                 │
//! │     │                                                                   │
//! │     ├── /health                                                         │
//! │     ├── /api/{categories,suppliers,products,...}   routes::catalog/people│
//! │     ├── /api/sales                                  routes::sales        │
//! │     ├── /api/{expenses,technical-services,...}      routes::operations   │
//! │     ├── /api/reports/*, /api/exchange-rates         routes::reports      │
//! │     └── /ws                                         routes::ws           │
//! │              │                                                          │
//! │              ▼                                                          │
//! │        AppState ──► services ──► teknoroma-db ──► SQLite                │
//! │              │                                                          │
//! │              └──► NotificationHub (broadcast) ──► /ws subscribers       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use teknoroma_db::Database;

use crate::services::{
    CatalogService, ExchangeRateService, ExpenseService, NotificationHub, Notifier, PeopleService, ReportService,
    SaleService, StockService, SupplierDeliveryService, TicketService,
};

// =============================================================================
// State
// =============================================================================

/// Shared handles; cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub hub: NotificationHub,
    pub notifier: Arc<dyn Notifier>,
    pub rates: Arc<ExchangeRateService>,
}

impl AppState {
    /// State whose notifications go to `hub`.
    pub fn new(db: Database, hub: NotificationHub, rates: ExchangeRateService) -> Self {
        AppState {
            db,
            notifier: Arc::new(hub.clone()),
            hub,
            rates: Arc::new(rates),
        }
    }

    pub fn sales(&self) -> SaleService {
        SaleService::new(self.db.clone(), self.notifier.clone())
    }

    pub fn stock(&self) -> StockService {
        StockService::new(self.db.clone(), self.notifier.clone())
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.db.clone())
    }

    pub fn people(&self) -> PeopleService {
        PeopleService::new(self.db.clone())
    }

    pub fn expenses(&self) -> ExpenseService {
        ExpenseService::new(self.db.clone(), self.rates.clone())
    }

    pub fn tickets(&self) -> TicketService {
        TicketService::new(self.db.clone(), self.notifier.clone())
    }

    pub fn deliveries(&self) -> SupplierDeliveryService {
        SupplierDeliveryService::new(self.db.clone(), self.notifier.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.db.clone())
    }
}

// =============================================================================
// Router
// =============================================================================

/// Builds the application router.
pub fn create_app(state: AppState) -> Router {
    use routes::{catalog, health, operations, people, reports, sales, ws};

    let api = Router::new()
        // categories
        .route("/categories", get(catalog::list_categories).post(catalog::create_category))
        .route(
            "/categories/{id}",
            get(catalog::get_category)
                .put(catalog::update_category)
                .delete(catalog::delete_category),
        )
        .route("/categories/{id}/restore", post(catalog::restore_category))
        // suppliers
        .route("/suppliers", get(catalog::list_suppliers).post(catalog::create_supplier))
        .route(
            "/suppliers/{id}",
            get(catalog::get_supplier)
                .put(catalog::update_supplier)
                .delete(catalog::delete_supplier),
        )
        .route("/suppliers/{id}/restore", post(catalog::restore_supplier))
        // products
        .route("/products", get(catalog::list_products).post(catalog::create_product))
        .route("/products/critical", get(catalog::critical_products))
        .route("/products/search", get(catalog::search_products))
        .route("/products/barcode/{barcode}", get(catalog::get_product_by_barcode))
        .route(
            "/products/{id}",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        .route("/products/{id}/restore", post(catalog::restore_product))
        .route("/products/{id}/stock/increase", post(catalog::increase_stock))
        .route("/products/{id}/stock/decrease", post(catalog::decrease_stock))
        .route("/products/{id}/stock/adjust", post(catalog::adjust_stock))
        // stores
        .route("/stores", get(people::list_stores).post(people::create_store))
        .route(
            "/stores/{id}",
            get(people::get_store).put(people::update_store).delete(people::delete_store),
        )
        .route("/stores/{id}/restore", post(people::restore_store))
        // departments
        .route("/departments", get(people::list_departments).post(people::create_department))
        .route(
            "/departments/{id}",
            get(people::get_department)
                .put(people::update_department)
                .delete(people::delete_department),
        )
        .route("/departments/{id}/restore", post(people::restore_department))
        // customers
        .route("/customers", get(people::list_customers).post(people::create_customer))
        .route(
            "/customers/{id}",
            get(people::get_customer)
                .put(people::update_customer)
                .delete(people::delete_customer),
        )
        .route("/customers/{id}/restore", post(people::restore_customer))
        // employees
        .route("/employees", get(people::list_employees).post(people::create_employee))
        .route(
            "/employees/{id}",
            get(people::get_employee)
                .put(people::update_employee)
                .delete(people::delete_employee),
        )
        .route("/employees/{id}/restore", post(people::restore_employee))
        // sales
        .route("/sales", get(sales::list).post(sales::create))
        .route("/sales/number/{sale_number}", get(sales::get_by_number))
        .route("/sales/{id}", get(sales::get))
        .route("/sales/{id}/details", get(sales::details))
        .route("/sales/{id}/confirm-payment", post(sales::confirm_payment))
        .route("/sales/{id}/complete", post(sales::complete))
        .route("/sales/{id}/cancel", post(sales::cancel))
        // expenses
        .route("/expenses", get(operations::list_expenses).post(operations::create_expense))
        .route(
            "/expenses/{id}",
            get(operations::get_expense).delete(operations::delete_expense),
        )
        .route("/expenses/{id}/pay", post(operations::pay_expense))
        // technical services
        .route(
            "/technical-services",
            get(operations::list_tickets).post(operations::open_ticket),
        )
        .route("/technical-services/{id}", get(operations::get_ticket))
        .route("/technical-services/{id}/assign", post(operations::assign_ticket))
        .route("/technical-services/{id}/status", put(operations::update_ticket_status))
        .route("/technical-services/{id}/resolve", post(operations::resolve_ticket))
        // supplier transactions
        .route(
            "/supplier-transactions",
            get(operations::list_supplier_transactions).post(operations::record_delivery),
        )
        .route("/supplier-transactions/{id}", get(operations::get_supplier_transaction))
        .route("/supplier-transactions/{id}/pay", post(operations::pay_supplier_transaction))
        // reports
        .route("/reports/stock", get(reports::stock))
        .route("/reports/top-products", get(reports::top_products))
        .route("/reports/employee-performance", get(reports::employee_performance))
        .route("/reports/cross-selling", get(reports::cross_selling))
        .route("/reports/unsold-products", get(reports::unsold_products))
        .route("/reports/expenses", get(reports::expenses))
        .route("/reports/demographics", get(reports::demographics))
        .route("/reports/dashboard", get(reports::dashboard))
        .route("/exchange-rates", get(reports::exchange_rates));

    Router::new()
        .route("/health", get(health::check))
        .route("/ws", get(ws::subscribe))
        .nest("/api", api)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
