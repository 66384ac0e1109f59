//! The persistence seam. Handlers talk to `dyn Store`; production wires in
//! [`PgStore`], tests swap in [`MemStore`]. Every compound operation below is
//! atomic with respect to concurrent callers touching the same resource.
//! That contract keeps the no-overlap and capacity invariants true under
//! racing requests, so both implementations must uphold it (PgStore via
//! SERIALIZABLE transactions, MemStore by holding its lock across the whole
//! operation).

use crate::conflict::Window;
use crate::error::AppResult;
use crate::models::{
    ApprovalStatus, ApproverRole, Equipment, EquipmentBooking, Event, EventApproval, EventRsvp,
    EventStatus, MaintenanceStatus, RegistrationType, Role, RsvpStatus, Venue, VenueBooking,
};
use crate::rsvp::CheckIn;
use async_trait::async_trait;
use serde::Serialize;

pub mod memory;
pub mod pg;

pub use memory::MemStore;
pub use pg::PgStore;

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub window: Window,
    pub location: Option<String>,
    pub max_attendees: Option<i32>,
    pub budget: Option<i64>,
    pub organizer_id: i32,
    pub club_id: Option<i32>,
    pub division_restriction: Option<String>,
    pub department_restriction: Option<String>,
    pub equipment_required: Vec<String>,
    /// From [`crate::approval::plan_creation`].
    pub status: EventStatus,
    pub requires_approval: bool,
    pub seats: Vec<ApproverRole>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub club_id: Option<i32>,
    pub organizer_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictOutcome {
    pub approval: EventApproval,
    pub event_status: EventStatus,
}

#[derive(Debug, Clone)]
pub struct NewVenue {
    pub name: String,
    pub capacity: i32,
    pub location: Option<String>,
    pub created_by: i32,
}

#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub name: String,
    pub quantity: i32,
    pub available_quantity: i32,
    pub maintenance_status: MaintenanceStatus,
    pub created_by: i32,
}

#[derive(Debug, Clone)]
pub struct NewVenueBooking {
    pub venue_id: i32,
    pub event_id: Option<i32>,
    pub user_id: i32,
    pub window: Window,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewEquipmentBooking {
    pub equipment_id: i32,
    pub event_id: Option<i32>,
    pub user_id: i32,
    pub quantity: i32,
    pub window: Window,
}

#[derive(Debug, Clone)]
pub struct Attendee {
    pub user_id: i32,
    pub email: String,
    pub division: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RsvpRequest {
    pub status: RsvpStatus,
    /// `None` keeps the stored value on update and means `audience` on
    /// first registration.
    pub registration_type: Option<RegistrationType>,
    pub form_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResult {
    pub rsvp: EventRsvp,
    pub already_checked_in: bool,
}

impl CheckInResult {
    pub fn new(rsvp: EventRsvp, outcome: CheckIn) -> Self {
        CheckInResult {
            rsvp,
            already_checked_in: outcome == CheckIn::AlreadyCheckedIn,
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    // events
    /// Creates the event, runs the free-text location conflict check against
    /// other approved events, and seeds one pending approval row per seat,
    /// all atomically.
    async fn create_event(&self, new: NewEvent) -> AppResult<Event>;
    async fn event(&self, id: i32) -> AppResult<Event>;
    async fn list_events(&self, filter: EventFilter) -> AppResult<Vec<Event>>;
    /// Organizer/admin action; only valid on approved events.
    async fn cancel_event(&self, id: i32, caller_id: i32, caller_role: Role) -> AppResult<Event>;

    // approval workflow
    async fn approvals(&self, event_id: i32) -> AppResult<Vec<EventApproval>>;
    /// Records one reviewer's verdict and re-aggregates the event status in
    /// the same transaction. Terminal events return `InvalidState`.
    async fn record_verdict(
        &self,
        event_id: i32,
        approver_id: i32,
        approver_role: Role,
        verdict: ApprovalStatus,
        comments: Option<String>,
    ) -> AppResult<VerdictOutcome>;

    // venues
    async fn list_venues(&self) -> AppResult<Vec<Venue>>;
    async fn create_venue(&self, new: NewVenue) -> AppResult<Venue>;
    async fn set_venue_availability(&self, id: i32, is_available: bool) -> AppResult<Venue>;
    async fn venue_availability(
        &self,
        venue_id: i32,
        window: Window,
    ) -> AppResult<crate::availability::VenueAvailability>;
    /// Availability is re-validated inside the transaction that inserts the
    /// booking; on conflict nothing is written.
    async fn book_venue(&self, new: NewVenueBooking) -> AppResult<VenueBooking>;

    // equipment
    async fn list_equipment(&self) -> AppResult<Vec<Equipment>>;
    async fn create_equipment(&self, new: NewEquipment) -> AppResult<Equipment>;
    async fn update_equipment_status(
        &self,
        id: i32,
        maintenance_status: MaintenanceStatus,
        available_quantity: Option<i32>,
    ) -> AppResult<Equipment>;
    /// Same atomicity contract as `book_venue`, over the fungible pool.
    async fn book_equipment(&self, new: NewEquipmentBooking) -> AppResult<EquipmentBooking>;

    // rsvp ledger
    async fn event_rsvps(&self, event_id: i32) -> AppResult<Vec<EventRsvp>>;
    /// Upsert keyed on (event, user): a second RSVP updates the existing row
    /// and keeps its rsvp_number. Returns `true` when a row was created.
    /// Eligibility and capacity are enforced here, capacity atomically.
    async fn upsert_rsvp(
        &self,
        event_id: i32,
        attendee: Attendee,
        req: RsvpRequest,
    ) -> AppResult<(EventRsvp, bool)>;
    /// Door scan by confirmation code. A missing code and a code for another
    /// event are both plain `NotFound`.
    async fn check_in_by_code(&self, rsvp_number: &str, event_id: i32)
        -> AppResult<CheckInResult>;
    /// Manual fallback, keyed by attendee email; funnels into the same
    /// transition as the scan path.
    async fn check_in_by_email(&self, email: &str, event_id: i32) -> AppResult<CheckInResult>;
}
