//! Storage capability shared by the SQLite and in-memory backends.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use crate::errors::AppError;
use crate::models::{
    Booking, BookingQuery, BookingStatus, CreateBookingRequest, CreateHostelRequest, Hostel,
    UpdateHostelRequest,
};

/// Hostel and booking collections behind one storage backend.
///
/// The two reservation operations must commit the booking write and the
/// hostel counter write as one atomic unit.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// List all hostels ordered by name.
    async fn list_hostels(&self) -> Result<Vec<Hostel>, AppError>;

    /// Get a hostel by ID.
    async fn get_hostel(&self, id: &str) -> Result<Option<Hostel>, AppError>;

    /// Create a hostel with a store-assigned ID.
    async fn create_hostel(&self, request: CreateHostelRequest) -> Result<Hostel, AppError>;

    /// Merge a partial update into a hostel with optimistic concurrency control.
    async fn update_hostel(
        &self,
        id: &str,
        request: &UpdateHostelRequest,
    ) -> Result<Hostel, AppError>;

    /// Delete a hostel. Bookings referencing it are left in place.
    async fn delete_hostel(&self, id: &str) -> Result<(), AppError>;

    /// List bookings newest first.
    async fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, AppError>;

    /// Get a booking by ID.
    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, AppError>;

    /// Insert a pending booking and reserve one seat on its hostel.
    ///
    /// Fails with `SeatUnavailable` when the hostel has no free seat.
    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, AppError>;

    /// Decide a pending booking and release or consume its reserved seat.
    ///
    /// Fails with `InvalidTransition` unless the booking is still pending.
    async fn update_booking_status(
        &self,
        id: &str,
        hostel_id: Option<&str>,
        status: BookingStatus,
    ) -> Result<Booking, AppError>;
}

/// Timestamp format used for every stored record.
///
/// Fixed precision keeps lexical order equal to chronological order.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Reject a decision whose caller-supplied hostel does not own the booking.
pub(crate) fn check_hostel_ref(booking_hostel: &str, given: Option<&str>) -> Result<(), AppError> {
    match given {
        Some(given) if given != booking_hostel => Err(AppError::Validation(format!(
            "Booking belongs to hostel {}, not {}",
            booking_hostel, given
        ))),
        _ => Ok(()),
    }
}

pub(crate) fn hostel_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Hostel {} not found", id))
}

pub(crate) fn booking_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Booking {} not found", id))
}
