//! Integration tests for the API server.
//!
//! Every test builds a fresh app over an in-memory database and drives it
//! through the router with `oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use teknoroma_api::services::{ExchangeRateService, NotificationHub};
use teknoroma_api::{create_app, AppState};
use teknoroma_db::{Database, DbConfig};

async fn setup() -> axum::Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let state = AppState::new(db, NotificationHub::new(16), ExchangeRateService::with_fallback());
    create_app(state)
}

async fn call(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(app, "POST", uri, Some(body)).await
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    call(app, "GET", uri, None).await
}

/// Store, cashier and customer ids.
struct Fixture {
    store_id: String,
    employee_id: String,
    customer_id: String,
}

async fn seed(app: &axum::Router, quota_cents: i64) -> Fixture {
    let (status, store) = post(app, "/api/stores", json!({ "name": "Kadıköy", "city": "İstanbul" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let store_id = store["id"].as_str().unwrap().to_string();

    let (status, employee) = post(
        app,
        "/api/employees",
        json!({
            "first_name": "Ayşe",
            "last_name": "Yılmaz",
            "role": "cashier",
            "store_id": store_id,
            "hire_date": "2023-01-02",
            "salary_cents": 3_000_000,
            "monthly_quota_cents": quota_cents,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{employee}");

    let (status, customer) = post(
        app,
        "/api/customers",
        json!({ "first_name": "Mehmet", "last_name": "Demir" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{customer}");

    Fixture {
        store_id,
        employee_id: employee["id"].as_str().unwrap().to_string(),
        customer_id: customer["id"].as_str().unwrap().to_string(),
    }
}

async fn create_product(app: &axum::Router, barcode: &str, price_cents: i64, stock: i64) -> String {
    let (status, product) = post(
        app,
        "/api/products",
        json!({
            "name": format!("Product {barcode}"),
            "barcode": barcode,
            "unit_price_cents": price_cents,
            "units_in_stock": stock,
            "critical_stock_level": 1,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{product}");
    product["id"].as_str().unwrap().to_string()
}

fn sale_body(fx: &Fixture, product_id: &str, quantity: i64, sale_date: Option<&str>) -> Value {
    json!({
        "customer_id": fx.customer_id,
        "employee_id": fx.employee_id,
        "store_id": fx.store_id,
        "payment_type": "cash",
        "items": [{ "product_id": product_id, "quantity": quantity }],
        "sale_date": sale_date,
    })
}

async fn units_in_stock(app: &axum::Router, product_id: &str) -> i64 {
    let (status, product) = get(app, &format!("/api/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    product["units_in_stock"].as_i64().unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;

    let (status, json) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], true);
    assert_eq!(json["pending_migrations"], 0);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_sale_decrements_and_cancel_restores_stock() {
    let app = setup().await;
    let fx = seed(&app, 1_000_000).await;
    let product_id = create_product(&app, "8690000000011", 10_000, 10).await;

    let (status, sale) = post(&app, "/api/sales", sale_body(&fx, &product_id, 3, None)).await;
    assert_eq!(status, StatusCode::CREATED, "{sale}");
    assert_eq!(sale["status"], "pending");
    assert_eq!(sale["subtotal_cents"], 30_000);
    assert_eq!(sale["tax_cents"], 6_000);
    assert_eq!(sale["total_cents"], 36_000);
    assert_eq!(sale["details"].as_array().unwrap().len(), 1);
    assert_eq!(units_in_stock(&app, &product_id).await, 7);

    let sale_id = sale["id"].as_str().unwrap();
    let (status, cancelled) = post(
        &app,
        &format!("/api/sales/{sale_id}/cancel"),
        json!({ "reason": "Customer changed mind" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{cancelled}");
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancellation_reason"], "Customer changed mind");
    assert_eq!(units_in_stock(&app, &product_id).await, 10);

    // A cancelled sale cannot be cancelled again.
    let (status, err) = post(&app, &format!("/api/sales/{sale_id}/cancel"), json!({ "reason": "again" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_STATE_TRANSITION");
}

#[tokio::test]
async fn test_sale_rejected_on_insufficient_stock() {
    let app = setup().await;
    let fx = seed(&app, 1_000_000).await;
    let product_id = create_product(&app, "8690000000028", 5_000, 3).await;

    let (status, err) = post(&app, "/api/sales", sale_body(&fx, &product_id, 5, None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INSUFFICIENT_STOCK");
    assert_eq!(units_in_stock(&app, &product_id).await, 3);

    let (_, sales) = get(&app, "/api/sales").await;
    assert!(sales.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_sale_numbers_are_sequential_per_year() {
    let app = setup().await;
    let fx = seed(&app, 1_000_000).await;
    let product_id = create_product(&app, "8690000000035", 1_000, 100).await;
    let date = Some("2024-05-10T09:30:00Z");

    let mut numbers = Vec::new();
    let mut ids = Vec::new();
    for _ in 0..3 {
        let (status, sale) = post(&app, "/api/sales", sale_body(&fx, &product_id, 1, date)).await;
        assert_eq!(status, StatusCode::CREATED, "{sale}");
        numbers.push(sale["sale_number"].as_str().unwrap().to_string());
        ids.push(sale["id"].as_str().unwrap().to_string());
    }
    assert_eq!(numbers, ["S-2024-00001", "S-2024-00002", "S-2024-00003"]);

    // Cancelling does not free the number.
    let (status, _) = post(&app, &format!("/api/sales/{}/cancel", ids[2]), json!({ "reason": "void" })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, sale) = post(&app, "/api/sales", sale_body(&fx, &product_id, 1, date)).await;
    assert_eq!(sale["sale_number"], "S-2024-00004");

    let (status, found) = get(&app, "/api/sales/number/S-2024-00002").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["id"], ids[1].as_str());
}

#[tokio::test]
async fn test_sale_lifecycle_and_commission() {
    let app = setup().await;
    let fx = seed(&app, 1_000_000).await;
    // 12,500.00 + 20% tax = 15,000.00 against a 10,000.00 quota.
    let product_id = create_product(&app, "8690000000042", 1_250_000, 5).await;

    let (_, sale) = post(&app, "/api/sales", sale_body(&fx, &product_id, 1, Some("2024-03-15T10:00:00Z"))).await;
    let sale_id = sale["id"].as_str().unwrap();
    assert_eq!(sale["total_cents"], 1_500_000);

    // Preparing → Completed needs payment first.
    let (status, _) = post(&app, &format!("/api/sales/{sale_id}/complete"), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, paid) = post(&app, &format!("/api/sales/{sale_id}/confirm-payment"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "preparing");

    let (status, done) = post(&app, &format!("/api/sales/{sale_id}/complete"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "completed");

    let (status, report) = get(&app, "/api/reports/employee-performance?month=2024-03").await;
    assert_eq!(status, StatusCode::OK, "{report}");
    let row = &report[0];
    assert_eq!(row["employee_id"], fx.employee_id.as_str());
    assert_eq!(row["sale_count"], 1);
    assert_eq!(row["total_sales_cents"], 1_500_000);
    assert_eq!(row["achievement_percent"], 150.0);
    assert_eq!(row["commission_cents"], 50_000);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_soft_deleted_product_hidden_unless_requested() {
    let app = setup().await;
    let product_id = create_product(&app, "8690000000059", 2_500, 4).await;

    let (status, _) = call(&app, "DELETE", &format!("/api/products/{product_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/api/products/{product_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, product) = get(&app, &format!("/api/products/{product_id}?include_deleted=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["is_deleted"], true);

    let (_, visible) = get(&app, "/api/products").await;
    assert!(visible.as_array().unwrap().is_empty());
    let (_, all) = get(&app, "/api/products?include_deleted=true").await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (status, restored) = post(&app, &format!("/api/products/{product_id}/restore"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["is_deleted"], false);
}

#[tokio::test]
async fn test_duplicate_barcode_rejected() {
    let app = setup().await;
    create_product(&app, "8690000000066", 1_000, 1).await;

    let (status, err) = post(
        &app,
        "/api/products",
        json!({ "name": "Copy", "barcode": "8690000000066", "unit_price_cents": 1_000 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "DUPLICATE");
}

#[tokio::test]
async fn test_manual_stock_moves_reclassify() {
    let app = setup().await;
    let product_id = create_product(&app, "8690000000073", 1_000, 5).await;
    let uri = |op: &str| format!("/api/products/{product_id}/stock/{op}");

    let (status, change) = post(&app, &uri("decrease"), json!({ "quantity": 4 })).await;
    assert_eq!(status, StatusCode::OK, "{change}");
    assert_eq!(change["units_in_stock"], 1);
    assert_eq!(change["stock_status"], "critical");

    let (status, err) = post(&app, &uri("decrease"), json!({ "quantity": 2 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INSUFFICIENT_STOCK");

    let (_, change) = post(&app, &uri("adjust"), json!({ "units": 0 })).await;
    assert_eq!(change["stock_status"], "out_of_stock");

    let (_, change) = post(&app, &uri("increase"), json!({ "quantity": 1500 })).await;
    assert_eq!(change["units_in_stock"], 1500);
    assert_eq!(change["stock_status"], "sufficient");

    let (status, _) = post(&app, &uri("adjust"), json!({ "units": -1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_supplier_delivery_increases_stock() {
    let app = setup().await;
    let product_id = create_product(&app, "8690000000080", 1_000, 0).await;
    let (status, supplier) = post(&app, "/api/suppliers", json!({ "company_name": "Anadolu Elektronik" })).await;
    assert_eq!(status, StatusCode::CREATED, "{supplier}");

    let (status, delivery) = post(
        &app,
        "/api/supplier-transactions",
        json!({
            "supplier_id": supplier["id"],
            "product_id": product_id,
            "quantity": 25,
            "unit_price_cents": 700,
            "invoice_number": "FTR-1001",
            "transaction_date": "2024-02-01T08:00:00Z",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{delivery}");
    assert_eq!(delivery["transaction"]["transaction_number"], "TH-2024-00001");
    assert_eq!(delivery["transaction"]["total_cents"], 17_500);
    assert_eq!(delivery["stock"]["units_in_stock"], 25);
    assert_eq!(units_in_stock(&app, &product_id).await, 25);

    let tx_id = delivery["transaction"]["id"].as_str().unwrap();
    let (status, paid) = post(&app, &format!("/api/supplier-transactions/{tx_id}/pay"), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["is_paid"], true);
}

#[tokio::test]
async fn test_oversized_delivery_rejected() {
    let app = setup().await;
    let product_id = create_product(&app, "8690000000081", 1_000, 0).await;
    let (_, supplier) = post(&app, "/api/suppliers", json!({ "company_name": "Ege Toptan" })).await;

    let (status, err) = post(
        &app,
        "/api/supplier-transactions",
        json!({
            "supplier_id": supplier["id"],
            "product_id": product_id,
            "quantity": 1_000_000_000_000_i64,
            "unit_price_cents": 100_000_000,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{err}");
    assert_eq!(err["code"], "VALIDATION");
    assert_eq!(units_in_stock(&app, &product_id).await, 0);

    let (status, _) = post(&app, &format!("/api/products/{product_id}/stock/increase"), json!({ "quantity": i64::MAX })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Technical Services
// =============================================================================

#[tokio::test]
async fn test_ticket_lifecycle() {
    let app = setup().await;
    let fx = seed(&app, 1_000_000).await;

    let (status, ticket) = post(
        &app,
        "/api/technical-services",
        json!({
            "store_id": fx.store_id,
            "reported_by_id": fx.employee_id,
            "title": "POS yazıcı arızası",
            "description": "Fiş yazdırmıyor",
            "priority": "high",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{ticket}");
    assert_eq!(ticket["status"], "open");
    assert!(ticket["ticket_number"].as_str().unwrap().starts_with("TS-"));
    let id = ticket["id"].as_str().unwrap();

    let (status, assigned) = post(
        &app,
        &format!("/api/technical-services/{id}/assign"),
        json!({ "employee_id": fx.employee_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{assigned}");
    assert_eq!(assigned["status"], "in_progress");
    assert_eq!(assigned["assigned_to_id"], fx.employee_id.as_str());

    // Resolving needs a resolution text.
    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/technical-services/{id}/status"),
        Some(json!({ "status": "resolved" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, resolved) = post(
        &app,
        &format!("/api/technical-services/{id}/resolve"),
        json!({ "resolution": "Kafa temizlendi" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "resolved");
    assert!(resolved["resolved_at"].is_string());

    let (status, closed) = call(
        &app,
        "PUT",
        &format!("/api/technical-services/{id}/status"),
        Some(json!({ "status": "closed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "closed");

    let (status, err) = call(
        &app,
        "PUT",
        &format!("/api/technical-services/{id}/status"),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "INVALID_STATE_TRANSITION");
}

// =============================================================================
// Expenses
// =============================================================================

#[tokio::test]
async fn test_foreign_currency_expense_converted_to_try() {
    let app = setup().await;
    let fx = seed(&app, 1_000_000).await;

    let (status, expense) = post(
        &app,
        "/api/expenses",
        json!({
            "store_id": fx.store_id,
            "expense_type": "utility",
            "description": "Server hosting",
            "amount_cents": 10_000,
            "currency": "USD",
            "exchange_rate": "34.50",
            "expense_date": "2024-06-01",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{expense}");
    assert_eq!(expense["currency"], "USD");
    assert_eq!(expense["exchange_rate"], 345_000);
    assert_eq!(expense["amount_in_try_cents"], 345_000);
    assert_eq!(expense["expense_number"], "G-2024-00001");
    assert_eq!(expense["is_paid"], false);

    let expense_id = expense["id"].as_str().unwrap();
    let (status, paid) = post(
        &app,
        &format!("/api/expenses/{expense_id}/pay?payment_date=2024-06-05"),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{paid}");
    assert_eq!(paid["is_paid"], true);
    assert_eq!(paid["payment_date"], "2024-06-05");
}

#[tokio::test]
async fn test_unknown_sale_is_not_found() {
    let app = setup().await;

    let (status, err) = get(&app, "/api/sales/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_sale_number_lookup_checks_the_format() {
    let app = setup().await;

    let (status, err) = get(&app, "/api/sales/number/bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "VALIDATION");

    // Well-formed, but an expense number.
    let (status, _) = get(&app, "/api/sales/number/G-2024-00001").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, err) = get(&app, "/api/sales/number/S-2024-00001").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");
}
