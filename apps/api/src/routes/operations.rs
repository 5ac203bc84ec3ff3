//! Expense, technical-service and supplier-transaction endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use teknoroma_core::{
    Expense, ExpenseType, SupplierTransaction, TechnicalService, TicketPriority, TicketStatus, Visibility,
};
use teknoroma_db::{ExpenseFilter, SupplierTransactionFilter, TechnicalServiceFilter};

use crate::error::ApiResult;
use crate::routes::VisibilityQuery;
use crate::services::expense::CreateExpenseRequest;
use crate::services::supplier_delivery::{Delivery, RecordDeliveryRequest};
use crate::services::ticket::OpenTicketRequest;
use crate::AppState;

// =============================================================================
// Expenses
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    pub store_id: Option<String>,
    pub expense_type: Option<ExpenseType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PayExpenseQuery {
    pub payment_date: Option<NaiveDate>,
}

#[tracing::instrument(skip(state, req), fields(currency = %req.currency))]
pub async fn create_expense(
    State(state): State<AppState>,
    Json(req): Json<CreateExpenseRequest>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let expense = state.expenses().create(req).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Query(q): Query<ExpenseListQuery>,
) -> ApiResult<Json<Vec<Expense>>> {
    let filter = ExpenseFilter {
        store_id: q.store_id,
        expense_type: q.expense_type,
        from: q.from,
        to: q.to,
        visibility: Visibility::from_flag(q.include_deleted),
    };
    Ok(Json(state.expenses().list(&filter).await?))
}

pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Expense>> {
    Ok(Json(state.expenses().get(&id, q.visibility()).await?))
}

/// `?payment_date=YYYY-MM-DD`, defaulting to today.
#[tracing::instrument(skip(state))]
pub async fn pay_expense(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<PayExpenseQuery>,
) -> ApiResult<Json<Expense>> {
    Ok(Json(state.expenses().mark_paid(&id, q.payment_date).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_expense(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.expenses().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Technical Services
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct TicketListQuery {
    pub store_id: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub assigned_to_id: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub employee_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: TicketStatus,
}

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub resolution: String,
}

#[tracing::instrument(skip(state, req))]
pub async fn open_ticket(
    State(state): State<AppState>,
    Json(req): Json<OpenTicketRequest>,
) -> ApiResult<(StatusCode, Json<TechnicalService>)> {
    let ticket = state.tickets().open(req).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn list_tickets(
    State(state): State<AppState>,
    Query(q): Query<TicketListQuery>,
) -> ApiResult<Json<Vec<TechnicalService>>> {
    let filter = TechnicalServiceFilter {
        store_id: q.store_id,
        status: q.status,
        priority: q.priority,
        assigned_to_id: q.assigned_to_id,
        visibility: Visibility::from_flag(q.include_deleted),
    };
    Ok(Json(state.tickets().list(&filter).await?))
}

pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<TechnicalService>> {
    Ok(Json(state.tickets().get(&id, q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn assign_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> ApiResult<Json<TechnicalService>> {
    Ok(Json(state.tickets().assign(&id, &req.employee_id).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_ticket_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<TechnicalService>> {
    Ok(Json(state.tickets().update_status(&id, req.status).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn resolve_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ResolveRequest>,
) -> ApiResult<Json<TechnicalService>> {
    Ok(Json(state.tickets().resolve(&id, &req.resolution).await?))
}

// =============================================================================
// Supplier Transactions
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SupplierTransactionListQuery {
    pub supplier_id: Option<String>,
    pub product_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[tracing::instrument(skip(state, req), fields(product_id = %req.product_id, quantity = req.quantity))]
pub async fn record_delivery(
    State(state): State<AppState>,
    Json(req): Json<RecordDeliveryRequest>,
) -> ApiResult<(StatusCode, Json<Delivery>)> {
    let delivery = state.deliveries().record(req).await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

pub async fn list_supplier_transactions(
    State(state): State<AppState>,
    Query(q): Query<SupplierTransactionListQuery>,
) -> ApiResult<Json<Vec<SupplierTransaction>>> {
    let filter = SupplierTransactionFilter {
        supplier_id: q.supplier_id,
        product_id: q.product_id,
        from: q.from,
        to: q.to,
        visibility: Visibility::from_flag(q.include_deleted),
    };
    Ok(Json(state.deliveries().list(&filter).await?))
}

pub async fn get_supplier_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<SupplierTransaction>> {
    Ok(Json(state.deliveries().get(&id, q.visibility()).await?))
}

#[tracing::instrument(skip(state))]
pub async fn pay_supplier_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SupplierTransaction>> {
    Ok(Json(state.deliveries().mark_paid(&id).await?))
}
