//! Repository contract tests, run against every storage backend.

use std::sync::Arc;

use tempfile::TempDir;

use super::{init_database, MemoryRepository, Repository, SqliteRepository};
use crate::errors::AppError;
use crate::models::{
    BookingQuery, BookingStatus, CreateBookingRequest, CreateHostelRequest, HostelType,
    UpdateHostelRequest,
};

async fn sqlite_repo() -> (Arc<dyn Repository>, Option<TempDir>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pool = init_database(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to init DB");
    (Arc::new(SqliteRepository::new(pool)), Some(temp_dir))
}

async fn memory_repo() -> (Arc<dyn Repository>, Option<TempDir>) {
    (Arc::new(MemoryRepository::new()), None)
}

fn hostel_request(name: &str, seats: i64) -> CreateHostelRequest {
    CreateHostelRequest {
        name: name.to_string(),
        hostel_type: HostelType::Men,
        price: 4200.0,
        total_seats: Some(seats),
        seats_available: seats,
        seats_reserved: None,
        amenities: vec!["WiFi".to_string(), "Mess".to_string()],
        images: vec!["/images/hostel1.jpg".to_string()],
        location: "Near GEC Thrissur".to_string(),
        verified: true,
        contact_number: "9847000000".to_string(),
        description: "Walking distance to campus".to_string(),
    }
}

fn booking_request(hostel_id: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        student_name: "Arjun".to_string(),
        student_phone: "9000000002".to_string(),
        hostel_id: hostel_id.to_string(),
        hostel_name: None,
        joining_date: "2025-07-01".to_string(),
    }
}

async fn seats(repo: &dyn Repository, id: &str) -> (i64, i64) {
    let hostel = repo.get_hostel(id).await.unwrap().unwrap();
    (hostel.seats_available, hostel.seats_reserved)
}

async fn create_then_list_roundtrip(repo: Arc<dyn Repository>) {
    let created = repo
        .create_hostel(hostel_request("Campus Corner", 6))
        .await
        .unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.version, 1);

    let listed = repo.list_hostels().await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    let fetched = repo.get_hostel(&created.id).await.unwrap();
    assert_eq!(fetched, Some(created));
}

async fn list_hostels_ordered_by_name(repo: Arc<dyn Repository>) {
    for name in ["Zion", "Alpha", "Meadow"] {
        repo.create_hostel(hostel_request(name, 2)).await.unwrap();
    }
    let names: Vec<String> = repo
        .list_hostels()
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "Meadow", "Zion"]);
}

async fn create_rejects_invalid_hostel(repo: Arc<dyn Repository>) {
    let mut request = hostel_request("Overfull", 3);
    request.seats_available = 5;
    let result = repo.create_hostel(request).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(repo.list_hostels().await.unwrap().is_empty());
}

async fn booking_reserves_seat(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();

    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.hostel_name, "Sunrise");
    assert_eq!(seats(repo.as_ref(), &hostel.id).await, (2, 1));

    let bookings = repo.list_bookings(&BookingQuery::default()).await.unwrap();
    assert_eq!(bookings, vec![booking]);

    let after = repo.get_hostel(&hostel.id).await.unwrap().unwrap();
    assert_eq!(after.version, hostel.version + 1);
}

async fn reject_returns_seat(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();
    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    let decided = repo
        .update_booking_status(&booking.id, Some(&hostel.id), BookingStatus::Rejected)
        .await
        .unwrap();

    assert_eq!(decided.status, BookingStatus::Rejected);
    assert_eq!(seats(repo.as_ref(), &hostel.id).await, (3, 0));
}

async fn confirm_consumes_seat(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();
    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    let decided = repo
        .update_booking_status(&booking.id, Some(&hostel.id), BookingStatus::Confirmed)
        .await
        .unwrap();

    assert_eq!(decided.status, BookingStatus::Confirmed);
    assert_eq!(seats(repo.as_ref(), &hostel.id).await, (2, 0));
    let stored = repo.get_booking(&booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Confirmed);
}

async fn full_hostel_rejects_booking(repo: Arc<dyn Repository>) {
    let mut request = hostel_request("Packed", 2);
    request.seats_available = 0;
    request.seats_reserved = Some(2);
    let hostel = repo.create_hostel(request).await.unwrap();

    let result = repo.create_booking(&booking_request(&hostel.id)).await;

    assert!(matches!(result, Err(AppError::SeatUnavailable(_))));
    assert_eq!(seats(repo.as_ref(), &hostel.id).await, (0, 2));
    assert!(repo
        .list_bookings(&BookingQuery::default())
        .await
        .unwrap()
        .is_empty());
}

async fn booking_unknown_hostel(repo: Arc<dyn Repository>) {
    let result = repo.create_booking(&booking_request("missing")).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(repo
        .list_bookings(&BookingQuery::default())
        .await
        .unwrap()
        .is_empty());
}

async fn second_decision_is_rejected(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();
    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();
    repo.update_booking_status(&booking.id, None, BookingStatus::Confirmed)
        .await
        .unwrap();

    for status in [BookingStatus::Confirmed, BookingStatus::Rejected] {
        let result = repo.update_booking_status(&booking.id, None, status).await;
        assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    }

    assert_eq!(seats(repo.as_ref(), &hostel.id).await, (2, 0));
    let stored = repo.get_booking(&booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Confirmed);
}

async fn decision_to_pending_is_rejected(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();
    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    let result = repo
        .update_booking_status(&booking.id, None, BookingStatus::Pending)
        .await;

    assert!(matches!(result, Err(AppError::InvalidTransition(_))));
    assert_eq!(seats(repo.as_ref(), &hostel.id).await, (2, 1));
}

async fn decision_unknown_booking(repo: Arc<dyn Repository>) {
    let result = repo
        .update_booking_status("missing", None, BookingStatus::Rejected)
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

async fn decision_with_wrong_hostel_changes_nothing(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();
    let other = repo.create_hostel(hostel_request("Other", 3)).await.unwrap();
    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    let result = repo
        .update_booking_status(&booking.id, Some(&other.id), BookingStatus::Rejected)
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(seats(repo.as_ref(), &hostel.id).await, (2, 1));
    assert_eq!(seats(repo.as_ref(), &other.id).await, (3, 0));
    let stored = repo.get_booking(&booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Pending);
}

async fn delete_hostel_leaves_orphan_booking(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Closing", 3)).await.unwrap();
    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    repo.delete_hostel(&hostel.id).await.unwrap();

    assert!(repo.get_hostel(&hostel.id).await.unwrap().is_none());
    let orphan = repo.get_booking(&booking.id).await.unwrap().unwrap();
    assert_eq!(orphan.hostel_id, hostel.id);
    assert_eq!(orphan.status, BookingStatus::Pending);

    let decided = repo
        .update_booking_status(&booking.id, Some(&hostel.id), BookingStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(decided.status, BookingStatus::Rejected);
}

async fn hostel_name_is_a_snapshot(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Old Name", 3)).await.unwrap();
    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    let rename = UpdateHostelRequest {
        name: Some("New Name".to_string()),
        ..Default::default()
    };
    repo.update_hostel(&hostel.id, &rename).await.unwrap();

    let stored = repo.get_booking(&booking.id).await.unwrap().unwrap();
    assert_eq!(stored.hostel_name, "Old Name");

    let mut explicit = booking_request(&hostel.id);
    explicit.hostel_name = Some("As Shown".to_string());
    let second = repo.create_booking(&explicit).await.unwrap();
    assert_eq!(second.hostel_name, "As Shown");
}

async fn update_hostel_merges_and_versions(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();

    let update = UpdateHostelRequest {
        price: Some(3900.0),
        verified: Some(false),
        expected_version: Some(1),
        ..Default::default()
    };
    let updated = repo.update_hostel(&hostel.id, &update).await.unwrap();

    assert_eq!(updated.price, 3900.0);
    assert!(!updated.verified);
    assert_eq!(updated.name, "Sunrise");
    assert_eq!(updated.amenities, hostel.amenities);
    assert_eq!(updated.version, 2);
    assert_eq!(repo.get_hostel(&hostel.id).await.unwrap(), Some(updated));

    // Same expected version again is now stale
    match repo.update_hostel(&hostel.id, &update).await {
        Err(AppError::Conflict {
            current_version, ..
        }) => assert_eq!(current_version, 2),
        other => panic!("expected conflict, got {:?}", other),
    }
}

async fn update_hostel_rejects_invalid_merge(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();

    let update = UpdateHostelRequest {
        seats_available: Some(10),
        ..Default::default()
    };
    let result = repo.update_hostel(&hostel.id, &update).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(repo.get_hostel(&hostel.id).await.unwrap(), Some(hostel));
}

async fn update_cannot_free_a_reserved_seat(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();
    repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    let update = UpdateHostelRequest {
        seats_available: Some(3),
        ..Default::default()
    };
    let result = repo.update_hostel(&hostel.id, &update).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(seats(repo.as_ref(), &hostel.id).await, (2, 1));
}

async fn reject_after_manual_edit_stays_within_capacity(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();
    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    // Admin frees the held seat by hand while the booking is still pending
    let update = UpdateHostelRequest {
        seats_available: Some(3),
        seats_reserved: Some(0),
        ..Default::default()
    };
    repo.update_hostel(&hostel.id, &update).await.unwrap();

    repo.update_booking_status(&booking.id, None, BookingStatus::Rejected)
        .await
        .unwrap();

    let stored = repo.get_hostel(&hostel.id).await.unwrap().unwrap();
    assert_eq!((stored.seats_available, stored.seats_reserved), (3, 0));
    assert!(stored.seats_available <= stored.total_seats);
}

async fn missing_hostel_is_not_found(repo: Arc<dyn Repository>) {
    let update = UpdateHostelRequest::default();
    assert!(matches!(
        repo.update_hostel("missing", &update).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        repo.delete_hostel("missing").await,
        Err(AppError::NotFound(_))
    ));
    assert!(repo.get_hostel("missing").await.unwrap().is_none());
}

async fn list_bookings_filters(repo: Arc<dyn Repository>) {
    let first = repo.create_hostel(hostel_request("First", 5)).await.unwrap();
    let second = repo.create_hostel(hostel_request("Second", 5)).await.unwrap();

    let a = repo.create_booking(&booking_request(&first.id)).await.unwrap();
    let b = repo.create_booking(&booking_request(&first.id)).await.unwrap();
    let c = repo.create_booking(&booking_request(&second.id)).await.unwrap();
    repo.update_booking_status(&b.id, None, BookingStatus::Confirmed)
        .await
        .unwrap();

    let all = repo.list_bookings(&BookingQuery::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

    let for_first = repo
        .list_bookings(&BookingQuery {
            hostel_id: Some(first.id.clone()),
            status: None,
        })
        .await
        .unwrap();
    let mut ids: Vec<String> = for_first.into_iter().map(|b| b.id).collect();
    ids.sort();
    let mut expected = vec![a.id.clone(), b.id.clone()];
    expected.sort();
    assert_eq!(ids, expected);

    let pending = repo
        .list_bookings(&BookingQuery {
            hostel_id: None,
            status: Some(BookingStatus::Pending),
        })
        .await
        .unwrap();
    let mut pending_ids: Vec<String> = pending.into_iter().map(|b| b.id).collect();
    pending_ids.sort();
    let mut expected = vec![a.id, c.id];
    expected.sort();
    assert_eq!(pending_ids, expected);
}

async fn concurrent_bookings_never_oversell(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Popular", 3)).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let repo = repo.clone();
        let request = booking_request(&hostel.id);
        handles.push(tokio::spawn(async move {
            repo.create_booking(&request).await
        }));
    }

    let mut accepted = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(AppError::SeatUnavailable(_)) => refused += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(accepted, 3);
    assert_eq!(refused, 5);
    assert_eq!(seats(repo.as_ref(), &hostel.id).await, (0, 3));
    assert_eq!(
        repo.list_bookings(&BookingQuery::default())
            .await
            .unwrap()
            .len(),
        3
    );
}

async fn concurrent_decisions_apply_once(repo: Arc<dyn Repository>) {
    let hostel = repo.create_hostel(hostel_request("Sunrise", 3)).await.unwrap();
    let booking = repo.create_booking(&booking_request(&hostel.id)).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..6 {
        let repo = repo.clone();
        let id = booking.id.clone();
        let status = if i % 2 == 0 {
            BookingStatus::Rejected
        } else {
            BookingStatus::Confirmed
        };
        handles.push(tokio::spawn(async move {
            repo.update_booking_status(&id, None, status).await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        match handle.await.unwrap() {
            Ok(booking) => winners.push(booking.status),
            Err(AppError::InvalidTransition(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(winners.len(), 1);
    let expected = match winners[0] {
        BookingStatus::Rejected => (3, 0),
        _ => (2, 0),
    };
    assert_eq!(seats(repo.as_ref(), &hostel.id).await, expected);
}

macro_rules! backend_tests {
    ($($name:ident),* $(,)?) => {
        mod sqlite_backend {
            $(
                #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
                async fn $name() {
                    let (repo, _dir) = super::sqlite_repo().await;
                    super::$name(repo).await;
                }
            )*
        }

        mod memory_backend {
            $(
                #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
                async fn $name() {
                    let (repo, _dir) = super::memory_repo().await;
                    super::$name(repo).await;
                }
            )*
        }
    };
}

backend_tests!(
    create_then_list_roundtrip,
    list_hostels_ordered_by_name,
    create_rejects_invalid_hostel,
    booking_reserves_seat,
    reject_returns_seat,
    confirm_consumes_seat,
    full_hostel_rejects_booking,
    booking_unknown_hostel,
    second_decision_is_rejected,
    decision_to_pending_is_rejected,
    decision_unknown_booking,
    decision_with_wrong_hostel_changes_nothing,
    delete_hostel_leaves_orphan_booking,
    hostel_name_is_a_snapshot,
    update_hostel_merges_and_versions,
    update_hostel_rejects_invalid_merge,
    update_cannot_free_a_reserved_seat,
    reject_after_manual_edit_stays_within_capacity,
    missing_hostel_is_not_found,
    list_bookings_filters,
    concurrent_bookings_never_oversell,
    concurrent_decisions_apply_once,
);
