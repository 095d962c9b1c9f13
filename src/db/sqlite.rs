//! SQLite-backed repository.
//!
//! Uses prepared statements and transactions for data integrity.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::repository::{
    booking_not_found, check_hostel_ref, hostel_not_found, new_id, now_timestamp, Repository,
};
use crate::errors::AppError;
use crate::models::{
    Booking, BookingQuery, BookingStatus, CreateBookingRequest, CreateHostelRequest, Hostel,
    HostelType, UpdateHostelRequest,
};
use crate::reservation::{seat_unavailable, SeatAdjustment};

const HOSTEL_COLUMNS: &str = "id, name, hostel_type, price, total_seats, seats_available, seats_reserved, amenities, images, location, verified, contact_number, description, updated_at, version";

const BOOKING_COLUMNS: &str =
    "id, student_name, student_phone, hostel_id, hostel_name, joining_date, status, timestamp";

/// SQLite repository for all data operations.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    // ==================== HOSTEL OPERATIONS ====================

    async fn list_hostels(&self) -> Result<Vec<Hostel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM hostels ORDER BY name",
            HOSTEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(hostel_from_row).collect()
    }

    async fn get_hostel(&self, id: &str) -> Result<Option<Hostel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM hostels WHERE id = ?",
            HOSTEL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(hostel_from_row).transpose()
    }

    async fn create_hostel(&self, request: CreateHostelRequest) -> Result<Hostel, AppError> {
        let hostel = request.into_hostel(new_id(), now_timestamp());
        hostel.validate()?;

        sqlx::query(
            "INSERT INTO hostels (id, name, hostel_type, price, total_seats, seats_available, seats_reserved, amenities, images, location, verified, contact_number, description, updated_at, version) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&hostel.id)
        .bind(&hostel.name)
        .bind(hostel.hostel_type.as_str())
        .bind(hostel.price)
        .bind(hostel.total_seats)
        .bind(hostel.seats_available)
        .bind(hostel.seats_reserved)
        .bind(serde_json::to_string(&hostel.amenities)?)
        .bind(serde_json::to_string(&hostel.images)?)
        .bind(&hostel.location)
        .bind(hostel.verified as i32)
        .bind(&hostel.contact_number)
        .bind(&hostel.description)
        .bind(&hostel.updated_at)
        .bind(hostel.version)
        .execute(&self.pool)
        .await?;

        tracing::info!("Created hostel {} ({})", hostel.id, hostel.name);
        Ok(hostel)
    }

    async fn update_hostel(
        &self,
        id: &str,
        request: &UpdateHostelRequest,
    ) -> Result<Hostel, AppError> {
        let existing = self
            .get_hostel(id)
            .await?
            .ok_or_else(|| hostel_not_found(id))?;

        request.check_version(&existing)?;

        let merged = request.merge(&existing, now_timestamp());
        merged.validate()?;

        // Conditional UPDATE on the version we read prevents lost updates
        let result = sqlx::query(
            "UPDATE hostels SET name = ?, hostel_type = ?, price = ?, total_seats = ?, seats_available = ?, seats_reserved = ?, amenities = ?, images = ?, location = ?, verified = ?, contact_number = ?, description = ?, updated_at = ?, version = ? WHERE id = ? AND version = ?"
        )
        .bind(&merged.name)
        .bind(merged.hostel_type.as_str())
        .bind(merged.price)
        .bind(merged.total_seats)
        .bind(merged.seats_available)
        .bind(merged.seats_reserved)
        .bind(serde_json::to_string(&merged.amenities)?)
        .bind(serde_json::to_string(&merged.images)?)
        .bind(&merged.location)
        .bind(merged.verified as i32)
        .bind(&merged.contact_number)
        .bind(&merged.description)
        .bind(&merged.updated_at)
        .bind(merged.version)
        .bind(id)
        .bind(existing.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Race condition - version changed between read and write
            let current = self.get_hostel(id).await?;
            return Err(AppError::Conflict {
                message: "Concurrent modification detected".to_string(),
                current_version: current.map(|h| h.version).unwrap_or(0),
            });
        }

        Ok(merged)
    }

    async fn delete_hostel(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM hostels WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(hostel_not_found(id));
        }

        tracing::info!("Deleted hostel {}", id);
        Ok(())
    }

    // ==================== BOOKING OPERATIONS ====================

    async fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE (?1 IS NULL OR hostel_id = ?1) AND (?2 IS NULL OR status = ?2) ORDER BY timestamp DESC, id",
            BOOKING_COLUMNS
        ))
        .bind(&query.hostel_id)
        .bind(query.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(booking_from_row).collect()
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE id = ?",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(booking_from_row).transpose()
    }

    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, AppError> {
        let now = now_timestamp();
        let seats = SeatAdjustment::RESERVE;

        // Dropping the transaction without commit rolls both writes back
        let mut tx = self.pool.begin().await?;

        let reserved = sqlx::query(
            "UPDATE hostels SET seats_available = seats_available + ?, seats_reserved = seats_reserved + ?, updated_at = ?, version = version + 1 WHERE id = ? AND seats_available > 0 RETURNING name"
        )
        .bind(seats.available)
        .bind(seats.reserved)
        .bind(&now)
        .bind(&request.hostel_id)
        .fetch_optional(&mut *tx)
        .await?;

        let current_name: String = match reserved {
            Some(row) => row.get("name"),
            None => {
                let row = sqlx::query(&format!(
                    "SELECT {} FROM hostels WHERE id = ?",
                    HOSTEL_COLUMNS
                ))
                .bind(&request.hostel_id)
                .fetch_optional(&mut *tx)
                .await?;

                return Err(match row.as_ref().map(hostel_from_row).transpose()? {
                    Some(hostel) => {
                        tracing::warn!(
                            "Booking rejected: hostel {} has no free seats",
                            hostel.id
                        );
                        seat_unavailable(&hostel)
                    }
                    None => hostel_not_found(&request.hostel_id),
                });
            }
        };

        let booking = Booking {
            id: new_id(),
            student_name: request.student_name.clone(),
            student_phone: request.student_phone.clone(),
            hostel_id: request.hostel_id.clone(),
            hostel_name: request.hostel_name.clone().unwrap_or(current_name),
            joining_date: request.joining_date.clone(),
            status: BookingStatus::Pending,
            timestamp: now,
        };

        sqlx::query(
            "INSERT INTO bookings (id, student_name, student_phone, hostel_id, hostel_name, joining_date, status, timestamp) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&booking.id)
        .bind(&booking.student_name)
        .bind(&booking.student_phone)
        .bind(&booking.hostel_id)
        .bind(&booking.hostel_name)
        .bind(&booking.joining_date)
        .bind(booking.status.as_str())
        .bind(&booking.timestamp)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Booking {} created for hostel {}, one seat reserved",
            booking.id,
            booking.hostel_id
        );
        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        id: &str,
        hostel_id: Option<&str>,
        status: BookingStatus,
    ) -> Result<Booking, AppError> {
        let seats = SeatAdjustment::for_decision(status)?;
        let now = now_timestamp();

        let mut tx = self.pool.begin().await?;

        // Only a pending booking may be decided; the WHERE clause is the guard
        let decided = sqlx::query(
            "UPDATE bookings SET status = ? WHERE id = ? AND status = 'pending' RETURNING hostel_id",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let booking_hostel: String = match decided {
            Some(row) => row.get("hostel_id"),
            None => {
                let current = sqlx::query("SELECT status FROM bookings WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;

                return Err(match current {
                    Some(row) => {
                        let current: String = row.get("status");
                        let current = parse_status(&current)?;
                        tracing::warn!(
                            "Booking {} already {}, ignoring {}",
                            id,
                            current.as_str(),
                            status.as_str()
                        );
                        match current.transition_to(status) {
                            Err(e) => e,
                            Ok(_) => AppError::Internal(format!(
                                "Booking {} changed state during decision",
                                id
                            )),
                        }
                    }
                    None => booking_not_found(id),
                });
            }
        };

        check_hostel_ref(&booking_hostel, hostel_id)?;

        let adjusted = sqlx::query(
            "UPDATE hostels SET seats_available = MIN(seats_available + ?, total_seats), seats_reserved = MAX(seats_reserved + ?, 0), updated_at = ?, version = version + 1 WHERE id = ?"
        )
        .bind(seats.available)
        .bind(seats.reserved)
        .bind(&now)
        .bind(&booking_hostel)
        .execute(&mut *tx)
        .await?;

        if adjusted.rows_affected() == 0 {
            tracing::warn!(
                "Booking {} references missing hostel {}, counters untouched",
                id,
                booking_hostel
            );
        }

        let row = sqlx::query(&format!(
            "SELECT {} FROM bookings WHERE id = ?",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        let booking = booking_from_row(&row)?;

        tx.commit().await?;

        tracing::info!("Booking {} {}", id, status.as_str());
        Ok(booking)
    }
}

// Helper functions for row conversion

fn hostel_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Hostel, AppError> {
    let hostel_type: String = row.get("hostel_type");
    let verified: i32 = row.get("verified");
    let amenities: String = row.get("amenities");
    let images: String = row.get("images");

    Ok(Hostel {
        id: row.get("id"),
        name: row.get("name"),
        hostel_type: HostelType::from_str(&hostel_type).ok_or_else(|| {
            AppError::Database(format!("Unknown hostel type '{}'", hostel_type))
        })?,
        price: row.get("price"),
        total_seats: row.get("total_seats"),
        seats_available: row.get("seats_available"),
        seats_reserved: row.get("seats_reserved"),
        amenities: parse_json_array(&amenities),
        images: parse_json_array(&images),
        location: row.get("location"),
        verified: verified != 0,
        contact_number: row.get("contact_number"),
        description: row.get("description"),
        updated_at: row.get("updated_at"),
        version: row.get("version"),
    })
}

fn booking_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Booking, AppError> {
    let status: String = row.get("status");
    Ok(Booking {
        id: row.get("id"),
        student_name: row.get("student_name"),
        student_phone: row.get("student_phone"),
        hostel_id: row.get("hostel_id"),
        hostel_name: row.get("hostel_name"),
        joining_date: row.get("joining_date"),
        status: parse_status(&status)?,
        timestamp: row.get("timestamp"),
    })
}

fn parse_status(s: &str) -> Result<BookingStatus, AppError> {
    BookingStatus::from_str(s)
        .ok_or_else(|| AppError::Database(format!("Unknown booking status '{}'", s)))
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}
