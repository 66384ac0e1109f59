//! Venue and equipment booking through the store: overlap rejection,
//! pool accounting, and the no-double-booking guarantee under racing
//! requests.

mod common;

use std::sync::Arc;

use campus_events::{
    error::AppError,
    models::{MaintenanceStatus, Role},
    store::{NewEquipment, NewEquipmentBooking, NewVenueBooking, Store},
};
use common::{at, new_event, seed_venue, store, window};

fn venue_booking(venue_id: i32, from: u32, to: u32) -> NewVenueBooking {
    NewVenueBooking {
        venue_id,
        event_id: None,
        user_id: 1,
        window: window(from, to),
        notes: None,
    }
}

async fn seed_equipment(store: &dyn Store, name: &str, quantity: i32) -> i32 {
    store
        .create_equipment(NewEquipment {
            name: name.to_owned(),
            quantity,
            available_quantity: quantity,
            maintenance_status: MaintenanceStatus::Good,
            created_by: 1,
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn overlapping_venue_booking_is_rejected() {
    let store = store();
    let hall = seed_venue(&*store, "Main Hall", 200).await;

    store.book_venue(venue_booking(hall, 14, 16)).await.unwrap();

    let err = store
        .book_venue(venue_booking(hall, 15, 17))
        .await
        .unwrap_err();
    match err {
        AppError::Conflict { conflicts, .. } => assert_eq!(conflicts.len(), 1),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn back_to_back_venue_bookings_coexist() {
    let store = store();
    let hall = seed_venue(&*store, "Main Hall", 200).await;

    store.book_venue(venue_booking(hall, 14, 16)).await.unwrap();
    store.book_venue(venue_booking(hall, 16, 18)).await.unwrap();
}

#[tokio::test]
async fn closed_venue_rejects_bookings() {
    let store = store();
    let hall = seed_venue(&*store, "Main Hall", 200).await;
    store.set_venue_availability(hall, false).await.unwrap();

    let err = store
        .book_venue(venue_booking(hall, 14, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn duplicate_venue_name_is_a_conflict() {
    let store = store();
    seed_venue(&*store, "Main Hall", 200).await;

    let err = store
        .create_venue(campus_events::store::NewVenue {
            name: "Main Hall".to_owned(),
            capacity: 50,
            location: None,
            created_by: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));
}

#[tokio::test]
async fn venue_availability_reports_conflicts() {
    let store = store();
    let hall = seed_venue(&*store, "Main Hall", 200).await;
    store.book_venue(venue_booking(hall, 14, 16)).await.unwrap();

    let report = store.venue_availability(hall, window(15, 17)).await.unwrap();
    assert!(!report.available);
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.conflicts[0].start_time, at(14));

    let report = store.venue_availability(hall, window(16, 18)).await.unwrap();
    assert!(report.available);
    assert!(report.conflicts.is_empty());
}

#[tokio::test]
async fn racing_venue_bookings_admit_exactly_one() {
    let store = store();
    let hall = seed_venue(&*store, "Main Hall", 200).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.book_venue(venue_booking(hall, 14, 16)).await
        }));
    }

    let mut won = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            won += 1;
        }
    }
    assert_eq!(won, 1);
}

fn equipment_booking(equipment_id: i32, quantity: i32, from: u32, to: u32) -> NewEquipmentBooking {
    NewEquipmentBooking {
        equipment_id,
        event_id: None,
        user_id: 1,
        quantity,
        window: window(from, to),
    }
}

#[tokio::test]
async fn equipment_pool_never_oversubscribes() {
    let store = store();
    let chairs = seed_equipment(&*store, "Folding chair", 10).await;

    store
        .book_equipment(equipment_booking(chairs, 6, 14, 16))
        .await
        .unwrap();

    // 6 + 5 > 10 in the same window
    let err = store
        .book_equipment(equipment_booking(chairs, 5, 15, 17))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    // 6 + 4 = 10 fits exactly
    store
        .book_equipment(equipment_booking(chairs, 4, 15, 17))
        .await
        .unwrap();

    // the pool is fully drained in a window touching both bookings
    let err = store
        .book_equipment(equipment_booking(chairs, 1, 15, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    // but free again in a disjoint window
    store
        .book_equipment(equipment_booking(chairs, 10, 18, 20))
        .await
        .unwrap();
}

#[tokio::test]
async fn out_of_order_equipment_rejects_bookings() {
    let store = store();
    let projector = seed_equipment(&*store, "Projector", 2).await;
    store
        .update_equipment_status(projector, MaintenanceStatus::OutOfOrder, None)
        .await
        .unwrap();

    let err = store
        .book_equipment(equipment_booking(projector, 1, 14, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn maintenance_can_shrink_the_bookable_pool() {
    let store = store();
    let mics = seed_equipment(&*store, "Microphone", 5).await;
    store
        .update_equipment_status(mics, MaintenanceStatus::NeedsRepair, Some(2))
        .await
        .unwrap();

    let err = store
        .book_equipment(equipment_booking(mics, 3, 14, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    store
        .book_equipment(equipment_booking(mics, 2, 14, 16))
        .await
        .unwrap();
}

#[tokio::test]
async fn racing_equipment_bookings_respect_the_pool() {
    let store = store();
    let chairs = seed_equipment(&*store, "Folding chair", 10).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.book_equipment(equipment_booking(chairs, 4, 14, 16)).await
        }));
    }

    let mut won = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            won += 1;
        }
    }
    // 4 + 4 = 8 fits, a third 4 would need 12
    assert_eq!(won, 2);
}

#[tokio::test]
async fn accepted_bookings_are_pairwise_disjoint() {
    use campus_events::conflict::{overlaps, Window};
    use rand::Rng;

    let store = store();
    let hall = seed_venue(&*store, "Main Hall", 200).await;

    let mut rng = rand::thread_rng();
    let mut accepted: Vec<Window> = Vec::new();
    for _ in 0..200 {
        let from = rng.gen_range(0..22);
        let to = rng.gen_range(from + 1..24);
        let attempt = window(from, to);
        if store.book_venue(venue_booking(hall, from, to)).await.is_ok() {
            accepted.push(attempt);
        }
    }

    assert!(!accepted.is_empty());
    for (i, a) in accepted.iter().enumerate() {
        for b in &accepted[i + 1..] {
            assert!(!overlaps(a, b), "accepted bookings {a:?} and {b:?} overlap");
        }
    }
}

#[tokio::test]
async fn colocated_approved_events_conflict_at_creation() {
    let store = store();

    let mut first = new_event("Orientation", Role::Hod, window(14, 16));
    first.location = Some("Quad lawn".to_owned());
    store.create_event(first).await.unwrap();

    let mut second = new_event("Club fair", Role::Hod, window(15, 17));
    second.location = Some("Quad lawn".to_owned());
    let err = store.create_event(second).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    // an existing pending event at the same spot does not block newcomers
    let mut pending = new_event("Bake sale", Role::ClubHead, window(16, 18));
    pending.location = Some("Quad lawn".to_owned());
    store.create_event(pending).await.unwrap();
    let mut alongside = new_event("Raffle", Role::ClubHead, window(16, 18));
    alongside.location = Some("Quad lawn".to_owned());
    store.create_event(alongside).await.unwrap();

    // and a different location is free
    let mut elsewhere = new_event("Debate", Role::Hod, window(15, 17));
    elsewhere.location = Some("Room 12".to_owned());
    store.create_event(elsewhere).await.unwrap();
}
