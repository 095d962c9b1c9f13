//! Booking API endpoints.

use axum::extract::{Path, State};

use super::{success, ApiResult, AppJson, AppQuery};
use crate::errors::AppError;
use crate::models::{Booking, BookingQuery, CreateBookingRequest, UpdateBookingStatusRequest};
use crate::AppState;

/// GET /api/bookings - List bookings, newest first.
pub async fn list_bookings(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BookingQuery>,
) -> ApiResult<Vec<Booking>> {
    success(state.repo.list_bookings(&query).await?)
}

/// GET /api/bookings/:id - Get a single booking.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Booking> {
    match state.repo.get_booking(&id).await? {
        Some(booking) => success(booking),
        None => Err(AppError::NotFound(format!("Booking {} not found", id))),
    }
}

/// POST /api/bookings - Request a seat; reserves it until an admin decides.
pub async fn create_booking(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateBookingRequest>,
) -> ApiResult<Booking> {
    // Validate required fields
    request.validate()?;

    success(state.repo.create_booking(&request).await?)
}

/// PUT /api/bookings/:id/status - Confirm or reject a pending booking.
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateBookingStatusRequest>,
) -> ApiResult<Booking> {
    let booking = state
        .repo
        .update_booking_status(&id, request.hostel_id.as_deref(), request.status)
        .await?;
    success(booking)
}
