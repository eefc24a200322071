use axum::{
    extract::{Multipart, Path, Query, State},
    extract::multipart::MultipartRejection,
    extract::rejection::PathRejection,
    Json,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::server::multipart::read_submission;
use crate::employee::{division_breakdown, Category, DivisionShare, Employee, EmployeeFilter};
use crate::storage::EmployeeStats;
use std::sync::Arc;
use std::str::FromStr;

#[derive(Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
    pub category: Option<String>,
}

impl ListParams {
    fn into_filter(self) -> Result<EmployeeFilter, ApiError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(c) if c.eq_ignore_ascii_case("ALL") => None,
            Some(c) => Some(Category::from_str(c)?),
        };
        Ok(EmployeeFilter { search: self.q, category })
    }
}

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: String,
}

#[derive(Serialize)]
pub struct NotFoundResponse {
    pub error: String,
    pub path: String,
    pub method: String,
}

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.store.lock().await;
    match store.ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse { status: "ok", database: "connected".to_string() }),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse { status: "error", database: e.to_string() }),
        ),
    }
}

pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    let filter = params.into_filter()?;
    let store = state.store.lock().await;
    Ok(Json(store.list(&filter)?))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<EmployeeStats>, ApiError> {
    let store = state.store.lock().await;
    Ok(Json(store.stats()?))
}

pub async fn get_divisions(State(state): State<Arc<AppState>>) -> Result<Json<Vec<DivisionShare>>, ApiError> {
    let store = state.store.lock().await;
    let total = store.count_employees()?;
    let counts = store.division_counts()?;
    Ok(Json(division_breakdown(&counts, total)))
}

pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let submission = read_submission(multipart?).await?;
    let documents = state.uploads.save_all(&submission.uploads).await?;

    let created = state.store.lock().await.create(&submission.form, &documents);
    match created {
        Ok(id) => {
            tracing::info!(id, name = %submission.form.name, "Created employee");
            Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
        }
        Err(e) => {
            state.uploads.remove_all(&documents.filenames().map(str::to_string).collect::<Vec<_>>()).await;
            Err(e.into())
        }
    }
}

pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(id) = id?;
    let submission = read_submission(multipart?).await?;
    let uploaded = state.uploads.save_all(&submission.uploads).await?;

    let updated = state.store.lock().await.update(id, &submission.form, &uploaded);
    match updated {
        Ok(employee) => {
            tracing::info!(id, name = %employee.name, "Updated employee");
            Ok(Json(SuccessResponse { success: true }))
        }
        Err(e) => {
            state.uploads.remove_all(&uploaded.filenames().map(str::to_string).collect::<Vec<_>>()).await;
            Err(e.into())
        }
    }
}

/// Deleting is idempotent, so an id that cannot name any row succeeds too.
pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Path(raw_id) = raw_id?;
    let Ok(id) = raw_id.parse::<i64>() else {
        tracing::debug!(id = %raw_id, "Delete requested with non-numeric id");
        return Ok(Json(SuccessResponse { success: true }));
    };

    let removed = state.store.lock().await.delete(id)?;
    if removed {
        tracing::info!(id, "Deleted employee");
    } else {
        tracing::debug!(id, "Delete requested for unknown employee");
    }
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn api_not_found(method: Method, uri: Uri) -> impl IntoResponse {
    tracing::warn!("[404 API] {} {}", method, uri);
    let body = NotFoundResponse {
        error: format!("Endpoint API tidak ditemukan: {} {}", method, uri),
        path: uri.to_string(),
        method: method.to_string(),
    };
    (StatusCode::NOT_FOUND, Json(body))
}
