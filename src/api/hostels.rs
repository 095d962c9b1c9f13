//! Hostel API endpoints.

use axum::extract::{Path, State};

use super::{success, ApiResult, AppJson, AppQuery};
use crate::errors::AppError;
use crate::filter::{apply_filters, FilterCriteria};
use crate::models::{CreateHostelRequest, Hostel, UpdateHostelRequest};
use crate::AppState;

/// GET /api/hostels - List hostels matching the directory filters.
pub async fn list_hostels(
    State(state): State<AppState>,
    AppQuery(criteria): AppQuery<FilterCriteria>,
) -> ApiResult<Vec<Hostel>> {
    let hostels = state.repo.list_hostels().await?;
    success(apply_filters(&hostels, &criteria))
}

/// GET /api/hostels/:id - Get a single hostel.
pub async fn get_hostel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Hostel> {
    match state.repo.get_hostel(&id).await? {
        Some(hostel) => success(hostel),
        None => Err(AppError::NotFound(format!("Hostel {} not found", id))),
    }
}

/// POST /api/hostels - Create a new hostel.
pub async fn create_hostel(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateHostelRequest>,
) -> ApiResult<Hostel> {
    success(state.repo.create_hostel(request).await?)
}

/// PUT /api/hostels/:id - Update a hostel.
pub async fn update_hostel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateHostelRequest>,
) -> ApiResult<Hostel> {
    success(state.repo.update_hostel(&id, &request).await?)
}

/// DELETE /api/hostels/:id - Delete a hostel.
pub async fn delete_hostel(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_hostel(&id).await?;
    success(())
}
