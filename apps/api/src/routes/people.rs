//! Store, department, customer and employee endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use teknoroma_core::{Customer, Department, Employee, Role, Store, Visibility};

use crate::error::ApiResult;
use crate::routes::VisibilityQuery;
use crate::services::people::{CustomerInput, DepartmentInput, EmployeeInput, StoreInput};
use crate::AppState;

// =============================================================================
// Stores
// =============================================================================

pub async fn list_stores(
    State(state): State<AppState>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Vec<Store>>> {
    Ok(Json(state.people().list_stores(q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_store(
    State(state): State<AppState>,
    Json(req): Json<StoreInput>,
) -> ApiResult<(StatusCode, Json<Store>)> {
    let store = state.people().create_store(req).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Store>> {
    Ok(Json(state.people().get_store(&id, q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StoreInput>,
) -> ApiResult<Json<Store>> {
    Ok(Json(state.people().update_store(&id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_store(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.people().delete_store(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn restore_store(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Store>> {
    Ok(Json(state.people().restore_store(&id).await?))
}

// =============================================================================
// Departments
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DepartmentListQuery {
    pub store_id: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
}

pub async fn list_departments(
    State(state): State<AppState>,
    Query(q): Query<DepartmentListQuery>,
) -> ApiResult<Json<Vec<Department>>> {
    let departments = state
        .people()
        .list_departments(q.store_id.as_deref(), Visibility::from_flag(q.include_deleted))
        .await?;
    Ok(Json(departments))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_department(
    State(state): State<AppState>,
    Json(req): Json<DepartmentInput>,
) -> ApiResult<(StatusCode, Json<Department>)> {
    let department = state.people().create_department(req).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Department>> {
    Ok(Json(state.people().get_department(&id, q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DepartmentInput>,
) -> ApiResult<Json<Department>> {
    Ok(Json(state.people().update_department(&id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_department(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.people().delete_department(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn restore_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Department>> {
    Ok(Json(state.people().restore_department(&id).await?))
}

// =============================================================================
// Customers
// =============================================================================

pub async fn list_customers(
    State(state): State<AppState>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.people().list_customers(q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(req): Json<CustomerInput>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.people().create_customer(req).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.people().get_customer(&id, q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CustomerInput>,
) -> ApiResult<Json<Customer>> {
    Ok(Json(state.people().update_customer(&id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_customer(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.people().delete_customer(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn restore_customer(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Customer>> {
    Ok(Json(state.people().restore_customer(&id).await?))
}

// =============================================================================
// Employees
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeListQuery {
    pub store_id: Option<String>,
    pub role: Option<Role>,
    #[serde(default)]
    pub include_deleted: bool,
}

pub async fn list_employees(
    State(state): State<AppState>,
    Query(q): Query<EmployeeListQuery>,
) -> ApiResult<Json<Vec<Employee>>> {
    let employees = state
        .people()
        .list_employees(q.store_id.as_deref(), q.role, Visibility::from_flag(q.include_deleted))
        .await?;
    Ok(Json(employees))
}

#[tracing::instrument(skip(state, req))]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(req): Json<EmployeeInput>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let employee = state.people().create_employee(req).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(q): Query<VisibilityQuery>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(state.people().get_employee(&id, q.visibility()).await?))
}

#[tracing::instrument(skip(state, req))]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EmployeeInput>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(state.people().update_employee(&id, req).await?))
}

#[tracing::instrument(skip(state))]
pub async fn delete_employee(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.people().delete_employee(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn restore_employee(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Employee>> {
    Ok(Json(state.people().restore_employee(&id).await?))
}
