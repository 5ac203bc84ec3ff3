//! Sale endpoints.
//!
//! ```text
//! POST /api/sales                     CreateSale           201
//! POST /api/sales/{id}/confirm-payment Pending → Preparing
//! POST /api/sales/{id}/complete        Preparing → Completed
//! POST /api/sales/{id}/cancel          → Cancelled, stock restored
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use teknoroma_core::{Sale, SaleDetail, SaleStatus, SaleWithDetails, Visibility};
use teknoroma_db::SaleFilter;

use crate::error::ApiResult;
use crate::services::sale::CreateSaleRequest;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SaleListQuery {
    pub store_id: Option<String>,
    pub employee_id: Option<String>,
    pub customer_id: Option<String>,
    pub status: Option<SaleStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl From<SaleListQuery> for SaleFilter {
    fn from(q: SaleListQuery) -> Self {
        SaleFilter {
            store_id: q.store_id,
            employee_id: q.employee_id,
            customer_id: q.customer_id,
            status: q.status,
            from: q.from,
            to: q.to,
            visibility: Visibility::from_flag(q.include_deleted),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

#[tracing::instrument(skip(state, req), fields(employee_id = %req.employee_id, lines = req.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<SaleWithDetails>)> {
    let sale = state.sales().create(req).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn list(State(state): State<AppState>, Query(q): Query<SaleListQuery>) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.sales().list(&q.into()).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<SaleWithDetails>> {
    Ok(Json(state.sales().get(&id).await?))
}

pub async fn get_by_number(
    State(state): State<AppState>,
    Path(sale_number): Path<String>,
) -> ApiResult<Json<SaleWithDetails>> {
    Ok(Json(state.sales().get_by_number(&sale_number).await?))
}

pub async fn details(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vec<SaleDetail>>> {
    Ok(Json(state.sales().details(&id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleWithDetails>> {
    Ok(Json(state.sales().confirm_payment(&id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn complete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<SaleWithDetails>> {
    Ok(Json(state.sales().complete(&id).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> ApiResult<Json<SaleWithDetails>> {
    Ok(Json(state.sales().cancel(&id, &req.reason).await?))
}
