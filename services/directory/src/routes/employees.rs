//! Employee CRUD and archive handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use super::MutationResponse;
use crate::{
    error::{ApiError, ApiResult},
    models::EmployeePayload,
    state::AppState,
};

type EmployeeId = WithRejection<Path<i64>, ApiError>;
type EmployeeBody = WithRejection<Json<EmployeePayload>, ApiError>;

/// Active employees
pub async fn list_active(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let employees = state.employees.list_active().await?;
    Ok(Json(employees))
}

/// Archived employees
pub async fn list_archived(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let employees = state.employees.list_archived().await?;
    Ok(Json(employees))
}

/// Create an employee
pub async fn create(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): EmployeeBody,
) -> ApiResult<impl IntoResponse> {
    let fields = payload.validate()?;
    let employee = state.employees.create(&fields).await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

/// Replace every mutable field of an employee
pub async fn update(
    State(state): State<AppState>,
    WithRejection(Path(id), _): EmployeeId,
    WithRejection(Json(payload), _): EmployeeBody,
) -> ApiResult<impl IntoResponse> {
    let fields = payload.validate()?;
    let affected = state.employees.update(id, &fields).await?;

    Ok(MutationResponse::new("Employee updated successfully", affected))
}

/// Permanently delete an employee
pub async fn delete(
    State(state): State<AppState>,
    WithRejection(Path(id), _): EmployeeId,
) -> ApiResult<impl IntoResponse> {
    let affected = state.employees.delete(id).await?;
    Ok(MutationResponse::new("Employee deleted successfully", affected))
}

/// Move an employee to the archived view
pub async fn archive(
    State(state): State<AppState>,
    WithRejection(Path(id), _): EmployeeId,
) -> ApiResult<impl IntoResponse> {
    let affected = state.employees.set_archived(id, true).await?;
    Ok(MutationResponse::new("Employee archived successfully", affected))
}

/// Move an employee back to the active view
pub async fn unarchive(
    State(state): State<AppState>,
    WithRejection(Path(id), _): EmployeeId,
) -> ApiResult<impl IntoResponse> {
    let affected = state.employees.set_archived(id, false).await?;
    Ok(MutationResponse::new("Employee restored successfully", affected))
}
