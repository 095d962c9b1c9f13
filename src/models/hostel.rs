//! Hostel model matching the frontend Hostel interface.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Gender category a hostel accepts.
///
/// Wire values are case-sensitive: `men` and `Women`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HostelType {
    #[serde(rename = "men")]
    Men,
    #[serde(rename = "Women")]
    Women,
}

impl HostelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostelType::Men => "men",
            HostelType::Women => "Women",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "men" => Some(HostelType::Men),
            "Women" => Some(HostelType::Women),
            _ => None,
        }
    }
}

/// A rentable student housing listing with its seat counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hostel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub hostel_type: HostelType,
    /// Monthly rent.
    pub price: f64,
    pub total_seats: i64,
    pub seats_available: i64,
    /// Seats held by pending bookings.
    #[serde(default)]
    pub seats_reserved: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub location: String,
    #[serde(default)]
    pub verified: bool,
    pub contact_number: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub updated_at: String,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

impl Hostel {
    /// Check the listing fields and the capacity tuple.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::Validation("Location is required".to_string()));
        }
        if self.contact_number.trim().is_empty() {
            return Err(AppError::Validation(
                "Contact number is required".to_string(),
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::Validation(
                "Price must be a non-negative number".to_string(),
            ));
        }
        if self.total_seats < 0 || self.seats_available < 0 || self.seats_reserved < 0 {
            return Err(AppError::Validation(
                "Seat counts must not be negative".to_string(),
            ));
        }
        if self.seats_available > self.total_seats {
            return Err(AppError::Validation(format!(
                "seatsAvailable ({}) exceeds totalSeats ({})",
                self.seats_available, self.total_seats
            )));
        }
        if self.seats_available + self.seats_reserved > self.total_seats {
            return Err(AppError::Validation(format!(
                "seatsAvailable ({}) plus seatsReserved ({}) exceeds totalSeats ({})",
                self.seats_available, self.seats_reserved, self.total_seats
            )));
        }
        Ok(())
    }
}

/// Request body for creating a new hostel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHostelRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub hostel_type: HostelType,
    pub price: f64,
    /// Defaults to `seatsAvailable + seatsReserved` when omitted.
    #[serde(default)]
    pub total_seats: Option<i64>,
    pub seats_available: i64,
    #[serde(default)]
    pub seats_reserved: Option<i64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub location: String,
    #[serde(default)]
    pub verified: bool,
    pub contact_number: String,
    #[serde(default)]
    pub description: String,
}

impl CreateHostelRequest {
    /// Build the record a store will insert, before id and version are assigned.
    pub fn into_hostel(self, id: String, now: String) -> Hostel {
        let seats_reserved = self.seats_reserved.unwrap_or(0);
        Hostel {
            id,
            name: self.name,
            hostel_type: self.hostel_type,
            price: self.price,
            total_seats: self
                .total_seats
                .unwrap_or(self.seats_available + seats_reserved),
            seats_available: self.seats_available,
            seats_reserved,
            amenities: self.amenities,
            images: self.images,
            location: self.location,
            verified: self.verified,
            contact_number: self.contact_number,
            description: self.description,
            updated_at: now,
            version: 1,
        }
    }
}

/// Request body for a partial hostel update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHostelRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub hostel_type: Option<HostelType>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub total_seats: Option<i64>,
    #[serde(default)]
    pub seats_available: Option<i64>,
    #[serde(default)]
    pub seats_reserved: Option<i64>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

impl UpdateHostelRequest {
    /// Overlay the supplied fields on `existing`, bumping the version.
    pub fn merge(&self, existing: &Hostel, now: String) -> Hostel {
        Hostel {
            id: existing.id.clone(),
            name: self.name.clone().unwrap_or_else(|| existing.name.clone()),
            hostel_type: self.hostel_type.unwrap_or(existing.hostel_type),
            price: self.price.unwrap_or(existing.price),
            total_seats: self.total_seats.unwrap_or(existing.total_seats),
            seats_available: self.seats_available.unwrap_or(existing.seats_available),
            seats_reserved: self.seats_reserved.unwrap_or(existing.seats_reserved),
            amenities: self
                .amenities
                .clone()
                .unwrap_or_else(|| existing.amenities.clone()),
            images: self.images.clone().unwrap_or_else(|| existing.images.clone()),
            location: self
                .location
                .clone()
                .unwrap_or_else(|| existing.location.clone()),
            verified: self.verified.unwrap_or(existing.verified),
            contact_number: self
                .contact_number
                .clone()
                .unwrap_or_else(|| existing.contact_number.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| existing.description.clone()),
            updated_at: now,
            version: existing.version + 1,
        }
    }

    /// Fail with `Conflict` when the caller's expected version is stale.
    pub fn check_version(&self, existing: &Hostel) -> Result<(), AppError> {
        if let Some(expected) = self.expected_version {
            if existing.version != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Version mismatch: expected {}, current {}",
                        expected, existing.version
                    ),
                    current_version: existing.version,
                });
            }
        }
        Ok(())
    }
}
