#![allow(dead_code)]

use std::sync::Arc;

use campus_events::{
    approval::{plan_creation, QuorumPolicy},
    conflict::Window,
    models::{EventStatus, Role, RsvpStatus},
    store::{Attendee, MemStore, NewEvent, NewVenue, RsvpRequest, Store},
};
use chrono::{DateTime, TimeZone, Utc};

pub fn store() -> Arc<MemStore> {
    Arc::new(MemStore::new())
}

/// Hour `h` on a fixed day, so windows read like the timetable they model.
pub fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 9, 14, h, 0, 0).unwrap()
}

pub fn window(from: u32, to: u32) -> Window {
    Window::new(at(from), at(to)).unwrap()
}

pub fn new_event(title: &str, organizer_role: Role, window: Window) -> NewEvent {
    let plan = plan_creation(organizer_role, false, &QuorumPolicy::default());
    NewEvent {
        title: title.to_owned(),
        description: None,
        category: "workshop".to_owned(),
        window,
        location: None,
        max_attendees: None,
        budget: None,
        organizer_id: 1,
        club_id: None,
        division_restriction: None,
        department_restriction: None,
        equipment_required: vec![],
        status: plan.status,
        requires_approval: plan.requires_approval,
        seats: plan.seats,
    }
}

/// An event created by a head of department, so it lands `approved` and can
/// accept RSVPs straight away.
pub async fn approved_event(store: &dyn Store, title: &str, max_attendees: Option<i32>) -> i32 {
    let mut new = new_event(title, Role::Hod, window(10, 12));
    new.max_attendees = max_attendees;
    let event = store.create_event(new).await.unwrap();
    assert_eq!(event.status, EventStatus::Approved);
    event.id
}

pub async fn seed_venue(store: &dyn Store, name: &str, capacity: i32) -> i32 {
    store
        .create_venue(NewVenue {
            name: name.to_owned(),
            capacity,
            location: None,
            created_by: 1,
        })
        .await
        .unwrap()
        .id
}

pub fn attendee(user_id: i32) -> Attendee {
    Attendee {
        user_id,
        email: format!("student{user_id}@campus.edu"),
        division: None,
        department: None,
    }
}

pub fn attending() -> RsvpRequest {
    RsvpRequest {
        status: RsvpStatus::Attending,
        registration_type: None,
        form_data: None,
    }
}
