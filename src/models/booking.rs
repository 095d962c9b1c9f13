//! Booking model matching the frontend Booking interface.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Booking lifecycle state. `Confirmed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }

    /// Validate a decision on a booking currently in `self`.
    pub fn transition_to(&self, target: BookingStatus) -> Result<BookingStatus, AppError> {
        match (self, target) {
            (BookingStatus::Pending, BookingStatus::Confirmed | BookingStatus::Rejected) => {
                Ok(target)
            }
            _ => Err(AppError::InvalidTransition(format!(
                "Cannot move booking from {} to {}",
                self.as_str(),
                target.as_str()
            ))),
        }
    }
}

/// A student's request for one seat in a hostel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub student_name: String,
    pub student_phone: String,
    /// Non-owning reference; may dangle after the hostel is deleted.
    pub hostel_id: String,
    /// Hostel name at the time the booking was made.
    pub hostel_name: String,
    pub joining_date: String,
    pub status: BookingStatus,
    pub timestamp: String,
}

/// Request body for a new booking.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub student_name: String,
    pub student_phone: String,
    pub hostel_id: String,
    /// Taken from the hostel record when omitted.
    #[serde(default)]
    pub hostel_name: Option<String>,
    pub joining_date: String,
}

impl CreateBookingRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.student_name.trim().is_empty() {
            return Err(AppError::Validation("Student name is required".to_string()));
        }
        if self.student_phone.trim().is_empty() {
            return Err(AppError::Validation(
                "Student phone is required".to_string(),
            ));
        }
        if self.hostel_id.trim().is_empty() {
            return Err(AppError::Validation("Hostel ID is required".to_string()));
        }
        if NaiveDate::parse_from_str(&self.joining_date, "%Y-%m-%d").is_err() {
            return Err(AppError::Validation(format!(
                "Joining date must be YYYY-MM-DD, got '{}'",
                self.joining_date
            )));
        }
        Ok(())
    }
}

/// Request body for an administrative booking decision.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
    /// When given, must match the booking's stored hostel.
    #[serde(default)]
    pub hostel_id: Option<String>,
}

/// Optional filters for listing bookings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    #[serde(default)]
    pub hostel_id: Option<String>,
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

impl BookingQuery {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.hostel_id
            .as_ref()
            .is_none_or(|id| &booking.hostel_id == id)
            && self.status.is_none_or(|s| booking.status == s)
    }
}
