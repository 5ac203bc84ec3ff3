//! Category, supplier and product endpoints, including stock movements.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use teknoroma_core::{Category, Product, StockStatus, Supplier, Visibility};
use teknoroma_db::{ProductFilter, StockChange};

use crate::error::ApiResult;
use crate::routes::VisibilityQuery;
use crate::services::catalog::{CategoryInput, ProductInput, SupplierInput};
use crate::services::stock::{StockAdjustmentRequest, StockMovementRequest};
use crate::AppState;

// =============================================================================
// Categories
// =============================================================================

pub async fn list_categories(
    State(state): State<AppState>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.catalog().list_categories(q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.catalog().create_category(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.catalog().get_category(&id, q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CategoryInput>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.catalog().update_category(&id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_category(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.catalog().delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn restore_category(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Category>> {
    Ok(Json(state.catalog().restore_category(&id).await?))
}

// =============================================================================
// Suppliers
// =============================================================================

pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(state.catalog().list_suppliers(q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(req): Json<SupplierInput>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    let supplier = state.catalog().create_supplier(req).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Supplier>> {
    Ok(Json(state.catalog().get_supplier(&id, q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SupplierInput>,
) -> ApiResult<Json<Supplier>> {
    Ok(Json(state.catalog().update_supplier(&id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_supplier(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.catalog().delete_supplier(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn restore_supplier(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Supplier>> {
    Ok(Json(state.catalog().restore_supplier(&id).await?))
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub category_id: Option<String>,
    pub supplier_id: Option<String>,
    pub stock_status: Option<StockStatus>,
    #[serde(default)]
    pub include_deleted: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<u32>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(q): Query<ProductListQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let filter = ProductFilter {
        category_id: q.category_id,
        supplier_id: q.supplier_id,
        stock_status: q.stock_status,
        visibility: Visibility::from_flag(q.include_deleted),
    };
    Ok(Json(state.catalog().list_products(&filter).await?))
}

pub async fn critical_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog().critical_products().await?))
}

pub async fn search_products(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog().search_products(&q.q, q.limit).await?))
}

pub async fn get_product_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog().get_product_by_barcode(&barcode).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<ProductInput>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.catalog().create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog().get_product(&id, q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ProductInput>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog().update_product(&id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.catalog().delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn restore_product(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    Ok(Json(state.catalog().restore_product(&id).await?))
}

// -----------------------------------------------------------------------------
// Stock
// -----------------------------------------------------------------------------

#[tracing::instrument(skip(state, req))]
pub async fn increase_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StockMovementRequest>,
) -> ApiResult<Json<StockChange>> {
    Ok(Json(state.stock().increase(&id, req.quantity).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn decrease_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StockMovementRequest>,
) -> ApiResult<Json<StockChange>> {
    Ok(Json(state.stock().decrease(&id, req.quantity).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StockAdjustmentRequest>,
) -> ApiResult<Json<StockChange>> {
    Ok(Json(state.stock().adjust(&id, req.units).await?))
}
