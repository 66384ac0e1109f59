//! In-memory [`Store`] for tests and local development. Never a production
//! backend: durability aside, it models atomicity by holding one lock across
//! each compound operation, which only works in a single process.

use super::{
    Attendee, CheckInResult, EventFilter, NewEquipment, NewEquipmentBooking, NewEvent, NewVenue,
    NewVenueBooking, RsvpRequest, Store, VerdictOutcome,
};
use crate::availability::{self, VenueAvailability};
use crate::conflict::{self, ConflictDetail, Window};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApprovalStatus, BookingStatus, Equipment, EquipmentBooking, Event, EventApproval, EventRsvp,
    EventStatus, MaintenanceStatus, Role, Venue, VenueBooking, VerificationStatus,
};
use crate::{approval, rsvp};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    events: Vec<Event>,
    approvals: Vec<EventApproval>,
    rsvps: Vec<EventRsvp>,
    venues: Vec<Venue>,
    equipment: Vec<Equipment>,
    venue_bookings: Vec<VenueBooking>,
    equipment_bookings: Vec<EquipmentBooking>,
    next_id: i32,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn event(&self, id: i32) -> AppResult<&Event> {
        self.events
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::not_found("event"))
    }

    fn approved_venue_bookings(&self, venue_id: i32) -> Vec<VenueBooking> {
        self.venue_bookings
            .iter()
            .filter(|b| b.venue_id == venue_id && b.status == BookingStatus::Approved)
            .cloned()
            .collect()
    }

    fn approved_equipment_bookings(&self, equipment_id: i32) -> Vec<EquipmentBooking> {
        self.equipment_bookings
            .iter()
            .filter(|b| b.equipment_id == equipment_id && b.status == BookingStatus::Approved)
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn create_event(&self, new: NewEvent) -> AppResult<Event> {
        let mut inner = self.inner.lock().await;

        if let Some(location) = &new.location {
            let colocated: Vec<Event> = inner
                .events
                .iter()
                .filter(|e| {
                    e.status == EventStatus::Approved && e.location.as_deref() == Some(location)
                })
                .cloned()
                .collect();
            let conflicts: Vec<ConflictDetail> = conflict::find_conflicts(new.window, &colocated)
                .into_iter()
                .map(ConflictDetail::from)
                .collect();
            if !conflicts.is_empty() {
                return Err(AppError::conflict(
                    format!("{location} is already booked during this time"),
                    conflicts,
                ));
            }
        }

        let event = Event {
            id: inner.next_id(),
            title: new.title,
            description: new.description,
            category: new.category,
            start_date: new.window.start,
            end_date: new.window.end,
            location: new.location,
            max_attendees: new.max_attendees,
            budget: new.budget,
            status: new.status,
            organizer_id: new.organizer_id,
            club_id: new.club_id,
            requires_approval: new.requires_approval,
            division_restriction: new.division_restriction,
            department_restriction: new.department_restriction,
            equipment_required: new.equipment_required,
            created_at: Utc::now(),
        };
        for seat in &new.seats {
            let id = inner.next_id();
            inner.approvals.push(EventApproval {
                id,
                event_id: event.id,
                approver_id: None,
                approver_role: (*seat).into(),
                status: ApprovalStatus::Pending,
                comments: None,
                created_at: Utc::now(),
            });
        }
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn event(&self, id: i32) -> AppResult<Event> {
        let inner = self.inner.lock().await;
        inner.event(id).cloned()
    }

    async fn list_events(&self, filter: EventFilter) -> AppResult<Vec<Event>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .events
            .iter()
            .filter(|e| filter.status.map_or(true, |s| e.status == s))
            .filter(|e| filter.club_id.map_or(true, |c| e.club_id == Some(c)))
            .filter(|e| filter.organizer_id.map_or(true, |o| e.organizer_id == o))
            .cloned()
            .collect())
    }

    async fn cancel_event(&self, id: i32, caller_id: i32, caller_role: Role) -> AppResult<Event> {
        let mut inner = self.inner.lock().await;
        let event = inner.event(id)?;
        if event.organizer_id != caller_id && !caller_role.can_override_approvals() {
            return Err(AppError::forbidden("only the organizer or an admin can cancel"));
        }
        approval::ensure_cancellable(event.status)?;
        let idx = inner
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| anyhow::anyhow!("event disappeared under the store lock"))?;
        inner.events[idx].status = EventStatus::Cancelled;
        Ok(inner.events[idx].clone())
    }

    async fn approvals(&self, event_id: i32) -> AppResult<Vec<EventApproval>> {
        let inner = self.inner.lock().await;
        inner.event(event_id)?;
        Ok(inner
            .approvals
            .iter()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn record_verdict(
        &self,
        event_id: i32,
        approver_id: i32,
        approver_role: Role,
        verdict: ApprovalStatus,
        comments: Option<String>,
    ) -> AppResult<VerdictOutcome> {
        let mut inner = self.inner.lock().await;
        let event = inner.event(event_id)?;
        approval::ensure_accepts_verdicts(event.status)?;

        let event_idx = inner
            .events
            .iter()
            .position(|e| e.id == event_id)
            .ok_or_else(|| anyhow::anyhow!("event disappeared under the store lock"))?;

        if approver_role.can_override_approvals() {
            let new_status = match verdict {
                ApprovalStatus::Approved => EventStatus::Approved,
                ApprovalStatus::Rejected => EventStatus::Rejected,
                ApprovalStatus::Pending => {
                    return Err(AppError::validation("verdict must be approved or rejected"))
                }
            };
            let id = inner.next_id();
            let row = EventApproval {
                id,
                event_id,
                approver_id: Some(approver_id),
                approver_role,
                status: verdict,
                comments,
                created_at: Utc::now(),
            };
            inner.approvals.push(row.clone());
            inner.events[event_idx].status = new_status;
            return Ok(VerdictOutcome {
                approval: row,
                event_status: new_status,
            });
        }

        let seat_idx = inner
            .approvals
            .iter()
            .position(|a| a.event_id == event_id && a.approver_role == approver_role)
            .ok_or_else(|| {
                AppError::forbidden("this event has no approval seat for your role")
            })?;
        if inner.approvals[seat_idx].status != ApprovalStatus::Pending {
            return Err(AppError::invalid_state("this approval seat has already voted"));
        }
        inner.approvals[seat_idx].status = verdict;
        inner.approvals[seat_idx].approver_id = Some(approver_id);
        inner.approvals[seat_idx].comments = comments;
        let row = inner.approvals[seat_idx].clone();

        let verdicts: Vec<ApprovalStatus> = inner
            .approvals
            .iter()
            .filter(|a| a.event_id == event_id)
            .map(|a| a.status)
            .collect();
        let event_status = match approval::aggregate(&verdicts) {
            Some(status) => {
                inner.events[event_idx].status = status;
                status
            }
            None => inner.events[event_idx].status,
        };

        Ok(VerdictOutcome {
            approval: row,
            event_status,
        })
    }

    async fn list_venues(&self) -> AppResult<Vec<Venue>> {
        let inner = self.inner.lock().await;
        Ok(inner.venues.clone())
    }

    async fn create_venue(&self, new: NewVenue) -> AppResult<Venue> {
        let mut inner = self.inner.lock().await;
        if inner.venues.iter().any(|v| v.name == new.name) {
            return Err(AppError::conflict("venue name is already taken", vec![]));
        }
        let venue = Venue {
            id: inner.next_id(),
            name: new.name,
            capacity: new.capacity,
            location: new.location,
            is_available: true,
            created_by: Some(new.created_by),
            created_at: Utc::now(),
        };
        inner.venues.push(venue.clone());
        Ok(venue)
    }

    async fn set_venue_availability(&self, id: i32, is_available: bool) -> AppResult<Venue> {
        let mut inner = self.inner.lock().await;
        let venue = inner
            .venues
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| AppError::not_found("venue"))?;
        venue.is_available = is_available;
        Ok(venue.clone())
    }

    async fn venue_availability(
        &self,
        venue_id: i32,
        window: Window,
    ) -> AppResult<VenueAvailability> {
        let inner = self.inner.lock().await;
        let venue = inner
            .venues
            .iter()
            .find(|v| v.id == venue_id)
            .ok_or_else(|| AppError::not_found("venue"))?;
        let approved = inner.approved_venue_bookings(venue_id);
        Ok(availability::venue_availability(venue, &approved, window))
    }

    async fn book_venue(&self, new: NewVenueBooking) -> AppResult<VenueBooking> {
        let mut inner = self.inner.lock().await;
        let venue = inner
            .venues
            .iter()
            .find(|v| v.id == new.venue_id)
            .ok_or_else(|| AppError::not_found("venue"))?;
        let approved = inner.approved_venue_bookings(new.venue_id);
        availability::check_venue(venue, &approved, new.window)?;

        let booking = VenueBooking {
            id: inner.next_id(),
            venue_id: new.venue_id,
            event_id: new.event_id,
            user_id: new.user_id,
            start_time: new.window.start,
            end_time: new.window.end,
            status: BookingStatus::Approved,
            notes: new.notes,
            created_at: Utc::now(),
        };
        inner.venue_bookings.push(booking.clone());
        Ok(booking)
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let inner = self.inner.lock().await;
        Ok(inner.equipment.clone())
    }

    async fn create_equipment(&self, new: NewEquipment) -> AppResult<Equipment> {
        let mut inner = self.inner.lock().await;
        let item = Equipment {
            id: inner.next_id(),
            name: new.name,
            quantity: new.quantity,
            available_quantity: new.available_quantity,
            maintenance_status: new.maintenance_status,
            created_by: Some(new.created_by),
            created_at: Utc::now(),
        };
        inner.equipment.push(item.clone());
        Ok(item)
    }

    async fn update_equipment_status(
        &self,
        id: i32,
        maintenance_status: MaintenanceStatus,
        available_quantity: Option<i32>,
    ) -> AppResult<Equipment> {
        let mut inner = self.inner.lock().await;
        let item = inner
            .equipment
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AppError::not_found("equipment"))?;
        if let Some(qty) = available_quantity {
            if qty < 0 || qty > item.quantity {
                return Err(AppError::validation(
                    "available quantity must be between 0 and the total quantity",
                ));
            }
            item.available_quantity = qty;
        }
        item.maintenance_status = maintenance_status;
        Ok(item.clone())
    }

    async fn book_equipment(&self, new: NewEquipmentBooking) -> AppResult<EquipmentBooking> {
        let mut inner = self.inner.lock().await;
        let item = inner
            .equipment
            .iter()
            .find(|e| e.id == new.equipment_id)
            .ok_or_else(|| AppError::not_found("equipment"))?;
        let approved = inner.approved_equipment_bookings(new.equipment_id);
        availability::check_equipment(item, &approved, new.window, new.quantity)?;

        let booking = EquipmentBooking {
            id: inner.next_id(),
            equipment_id: new.equipment_id,
            event_id: new.event_id,
            user_id: new.user_id,
            quantity: new.quantity,
            start_time: new.window.start,
            end_time: new.window.end,
            status: BookingStatus::Approved,
            created_at: Utc::now(),
        };
        inner.equipment_bookings.push(booking.clone());
        Ok(booking)
    }

    async fn event_rsvps(&self, event_id: i32) -> AppResult<Vec<EventRsvp>> {
        let inner = self.inner.lock().await;
        inner.event(event_id)?;
        Ok(inner
            .rsvps
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn upsert_rsvp(
        &self,
        event_id: i32,
        attendee: Attendee,
        req: RsvpRequest,
    ) -> AppResult<(EventRsvp, bool)> {
        let mut inner = self.inner.lock().await;
        let event = inner.event(event_id)?.clone();
        if !matches!(event.status, EventStatus::Approved | EventStatus::Published) {
            return Err(AppError::invalid_state(
                "only approved events accept registrations",
            ));
        }
        rsvp::check_eligibility(
            &event,
            attendee.division.as_deref(),
            attendee.department.as_deref(),
        )?;
        // capacity gates slot-occupying responses; the caller's own row is
        // excluded so updating an existing RSVP never self-collides
        if req.status.occupies_slot() {
            let occupied = inner
                .rsvps
                .iter()
                .filter(|r| {
                    r.event_id == event_id
                        && r.user_id != attendee.user_id
                        && r.status.occupies_slot()
                })
                .count();
            rsvp::ensure_capacity(event.max_attendees, occupied)?;
        }

        if let Some(idx) = inner
            .rsvps
            .iter()
            .position(|r| r.event_id == event_id && r.user_id == attendee.user_id)
        {
            inner.rsvps[idx].status = req.status;
            if let Some(registration_type) = req.registration_type {
                inner.rsvps[idx].registration_type = registration_type;
            }
            if let Some(form_data) = req.form_data {
                inner.rsvps[idx].form_data = Some(form_data);
            }
            return Ok((inner.rsvps[idx].clone(), false));
        }

        let mut rsvp_number = rsvp::generate_rsvp_number();
        while inner.rsvps.iter().any(|r| r.rsvp_number == rsvp_number) {
            rsvp_number = rsvp::generate_rsvp_number();
        }
        let row = EventRsvp {
            id: inner.next_id(),
            event_id,
            user_id: attendee.user_id,
            user_email: attendee.email,
            status: req.status,
            registration_type: req.registration_type.unwrap_or_default(),
            rsvp_number,
            form_data: req.form_data,
            verification_status: VerificationStatus::Pending,
            created_at: Utc::now(),
        };
        inner.rsvps.push(row.clone());
        Ok((row, true))
    }

    async fn check_in_by_code(
        &self,
        rsvp_number: &str,
        event_id: i32,
    ) -> AppResult<CheckInResult> {
        let mut inner = self.inner.lock().await;
        let idx = inner
            .rsvps
            .iter()
            .position(|r| r.rsvp_number == rsvp_number && r.event_id == event_id)
            .ok_or_else(|| AppError::not_found("rsvp"))?;
        let (next, outcome) = rsvp::apply_check_in(inner.rsvps[idx].verification_status);
        inner.rsvps[idx].verification_status = next;
        Ok(CheckInResult::new(inner.rsvps[idx].clone(), outcome))
    }

    async fn check_in_by_email(&self, email: &str, event_id: i32) -> AppResult<CheckInResult> {
        let mut inner = self.inner.lock().await;
        let idx = inner
            .rsvps
            .iter()
            .position(|r| r.user_email == email && r.event_id == event_id)
            .ok_or_else(|| AppError::not_found("rsvp"))?;
        let (next, outcome) = rsvp::apply_check_in(inner.rsvps[idx].verification_status);
        inner.rsvps[idx].verification_status = next;
        Ok(CheckInResult::new(inner.rsvps[idx].clone(), outcome))
    }
}
