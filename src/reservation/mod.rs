//! Seat reservation arithmetic shared by every storage backend.
//!
//! A booking moves one seat through the hostel's counters:
//!
//! | event     | seatsAvailable | seatsReserved |
//! |-----------|----------------|---------------|
//! | created   | -1             | +1            |
//! | confirmed | 0              | -1            |
//! | rejected  | +1             | -1            |
//!
//! Backends apply these deltas in the same atomic unit as the booking write.

use crate::errors::AppError;
use crate::models::{BookingStatus, Hostel};

/// Counter deltas applied to a hostel for one booking event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatAdjustment {
    pub available: i64,
    pub reserved: i64,
}

impl SeatAdjustment {
    /// Hold one seat for a new pending booking.
    pub const RESERVE: SeatAdjustment = SeatAdjustment {
        available: -1,
        reserved: 1,
    };

    /// Delta for deciding a pending booking.
    pub fn for_decision(status: BookingStatus) -> Result<Self, AppError> {
        match status {
            BookingStatus::Confirmed => Ok(SeatAdjustment {
                available: 0,
                reserved: -1,
            }),
            BookingStatus::Rejected => Ok(SeatAdjustment {
                available: 1,
                reserved: -1,
            }),
            BookingStatus::Pending => Err(AppError::InvalidTransition(
                "A booking cannot be moved back to pending".to_string(),
            )),
        }
    }

    /// Apply the deltas to an in-memory hostel.
    ///
    /// A reservation needs a free seat. Counters edited by hand can drift
    /// from the bookings, so reserved stays at or above zero and available
    /// never exceeds capacity.
    pub fn apply(&self, hostel: &mut Hostel) -> Result<(), AppError> {
        if self.available < 0 && hostel.seats_available + self.available < 0 {
            return Err(seat_unavailable(hostel));
        }
        hostel.seats_available = (hostel.seats_available + self.available).min(hostel.total_seats);
        hostel.seats_reserved = (hostel.seats_reserved + self.reserved).max(0);
        Ok(())
    }
}

pub(crate) fn seat_unavailable(hostel: &Hostel) -> AppError {
    AppError::SeatUnavailable(format!("No seats available in {}", hostel.name))
}
