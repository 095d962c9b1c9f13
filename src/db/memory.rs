//! In-memory repository.
//!
//! Both collections sit behind one lock so the reservation operations can
//! check their preconditions and apply both writes under a single guard.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repository::{
    booking_not_found, check_hostel_ref, hostel_not_found, new_id, now_timestamp, Repository,
};
use crate::errors::AppError;
use crate::models::{
    Booking, BookingQuery, BookingStatus, CreateBookingRequest, CreateHostelRequest, Hostel,
    UpdateHostelRequest,
};
use crate::reservation::SeatAdjustment;

#[derive(Default)]
struct Collections {
    hostels: HashMap<String, Hostel>,
    bookings: HashMap<String, Booking>,
}

/// Process-local repository, used for demos and tests.
#[derive(Default)]
pub struct MemoryRepository {
    inner: RwLock<Collections>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-populated with the given hostels.
    ///
    /// Records without an ID get one, and version 0 is bumped to 1.
    pub fn with_hostels(hostels: Vec<Hostel>) -> Result<Self, AppError> {
        let mut collections = Collections::default();
        for mut hostel in hostels {
            if hostel.id.is_empty() {
                hostel.id = new_id();
            }
            if hostel.updated_at.is_empty() {
                hostel.updated_at = now_timestamp();
            }
            hostel.version = hostel.version.max(1);
            hostel.validate()?;
            collections.hostels.insert(hostel.id.clone(), hostel);
        }
        Ok(Self {
            inner: RwLock::new(collections),
        })
    }

    /// Load seed hostels from a JSON array file.
    pub async fn from_seed_file(path: &Path) -> Result<Self, AppError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let hostels: Vec<Hostel> = serde_json::from_str(&raw)?;
        tracing::info!("Seeding {} hostels from {:?}", hostels.len(), path);
        Self::with_hostels(hostels)
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_hostels(&self) -> Result<Vec<Hostel>, AppError> {
        let inner = self.inner.read().await;
        let mut hostels: Vec<Hostel> = inner.hostels.values().cloned().collect();
        hostels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hostels)
    }

    async fn get_hostel(&self, id: &str) -> Result<Option<Hostel>, AppError> {
        Ok(self.inner.read().await.hostels.get(id).cloned())
    }

    async fn create_hostel(&self, request: CreateHostelRequest) -> Result<Hostel, AppError> {
        let hostel = request.into_hostel(new_id(), now_timestamp());
        hostel.validate()?;

        self.inner
            .write()
            .await
            .hostels
            .insert(hostel.id.clone(), hostel.clone());

        tracing::info!("Created hostel {} ({})", hostel.id, hostel.name);
        Ok(hostel)
    }

    async fn update_hostel(
        &self,
        id: &str,
        request: &UpdateHostelRequest,
    ) -> Result<Hostel, AppError> {
        let mut inner = self.inner.write().await;
        let existing = inner.hostels.get(id).ok_or_else(|| hostel_not_found(id))?;

        request.check_version(existing)?;

        let merged = request.merge(existing, now_timestamp());
        merged.validate()?;

        inner.hostels.insert(id.to_string(), merged.clone());
        Ok(merged)
    }

    async fn delete_hostel(&self, id: &str) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .hostels
            .remove(id)
            .ok_or_else(|| hostel_not_found(id))?;

        tracing::info!("Deleted hostel {}", id);
        Ok(())
    }

    async fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, AppError> {
        let inner = self.inner.read().await;
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(bookings)
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, AppError> {
        Ok(self.inner.read().await.bookings.get(id).cloned())
    }

    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, AppError> {
        let now = now_timestamp();
        let mut inner = self.inner.write().await;

        let hostel = inner
            .hostels
            .get_mut(&request.hostel_id)
            .ok_or_else(|| hostel_not_found(&request.hostel_id))?;

        if let Err(e) = SeatAdjustment::RESERVE.apply(hostel) {
            tracing::warn!("Booking rejected: hostel {} has no free seats", hostel.id);
            return Err(e);
        }
        hostel.updated_at = now.clone();
        hostel.version += 1;

        let booking = Booking {
            id: new_id(),
            student_name: request.student_name.clone(),
            student_phone: request.student_phone.clone(),
            hostel_id: request.hostel_id.clone(),
            hostel_name: request
                .hostel_name
                .clone()
                .unwrap_or_else(|| hostel.name.clone()),
            joining_date: request.joining_date.clone(),
            status: BookingStatus::Pending,
            timestamp: now,
        };
        inner.bookings.insert(booking.id.clone(), booking.clone());

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
        let mut inner = self.inner.write().await;
        let Collections { hostels, bookings } = &mut *inner;

        let booking = bookings.get_mut(id).ok_or_else(|| booking_not_found(id))?;

        // Every check happens before the first mutation
        let next = match booking.status.transition_to(status) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(
                    "Booking {} already {}, ignoring {}",
                    id,
                    booking.status.as_str(),
                    status.as_str()
                );
                return Err(e);
            }
        };
        check_hostel_ref(&booking.hostel_id, hostel_id)?;

        match hostels.get_mut(&booking.hostel_id) {
            Some(hostel) => {
                seats.apply(hostel)?;
                hostel.updated_at = now_timestamp();
                hostel.version += 1;
            }
            None => tracing::warn!(
                "Booking {} references missing hostel {}, counters untouched",
                id,
                booking.hostel_id
            ),
        }
        booking.status = next;

        tracing::info!("Booking {} {}", id, status.as_str());
        Ok(booking.clone())
    }
}
