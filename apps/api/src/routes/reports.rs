//! Report and exchange-rate endpoints. All read-only.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use teknoroma_core::reports::{
    CrossSellEntry, DashboardSummary, Demographics, EmployeePerformance, ExpenseReport, ReportScope, StockReport,
    TopProduct, UnsoldProduct,
};

use crate::error::ApiResult;
use crate::services::exchange_rate::RateTable;
use crate::AppState;

/// `?store_id=&from=&to=&limit=`
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub store_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<i64>,
}

impl ScopeQuery {
    fn scope(&self) -> ReportScope {
        ReportScope {
            store_id: self.store_id.clone(),
            from: self.from,
            to: self.to,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PerformanceQuery {
    /// `YYYY-MM`
    pub month: Option<String>,
    pub store_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsoldQuery {
    pub days: Option<i64>,
    pub store_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreQuery {
    pub store_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RateQuery {
    pub date: Option<NaiveDate>,
}

pub async fn stock(State(state): State<AppState>) -> ApiResult<Json<StockReport>> {
    Ok(Json(state.reports().stock().await?))
}

pub async fn top_products(
    State(state): State<AppState>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Json<Vec<TopProduct>>> {
    Ok(Json(state.reports().top_products(&q.scope(), q.limit).await?))
}

pub async fn employee_performance(
    State(state): State<AppState>,
    Query(q): Query<PerformanceQuery>,
) -> ApiResult<Json<Vec<EmployeePerformance>>> {
    let report = state
        .reports()
        .employee_performance(q.month.as_deref(), q.store_id.as_deref())
        .await?;
    Ok(Json(report))
}

pub async fn cross_selling(
    State(state): State<AppState>,
    Query(q): Query<ScopeQuery>,
) -> ApiResult<Json<Vec<CrossSellEntry>>> {
    Ok(Json(state.reports().cross_selling(&q.scope(), q.limit).await?))
}

pub async fn unsold_products(
    State(state): State<AppState>,
    Query(q): Query<UnsoldQuery>,
) -> ApiResult<Json<Vec<UnsoldProduct>>> {
    Ok(Json(state.reports().unsold_products(q.days, q.store_id.as_deref()).await?))
}

pub async fn expenses(State(state): State<AppState>, Query(q): Query<ScopeQuery>) -> ApiResult<Json<ExpenseReport>> {
    Ok(Json(state.reports().expenses(&q.scope()).await?))
}

pub async fn demographics(State(state): State<AppState>) -> ApiResult<Json<Demographics>> {
    Ok(Json(state.reports().demographics().await?))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(q): Query<StoreQuery>,
) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(state.reports().dashboard(q.store_id.as_deref()).await?))
}

/// Buy rates for `?date=` (default today). Never fails.
pub async fn exchange_rates(State(state): State<AppState>, Query(q): Query<RateQuery>) -> Json<RateTable> {
    let today = Utc::now().date_naive();
    Json(state.rates.rates(q.date.unwrap_or(today), today).await)
}
