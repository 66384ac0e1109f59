//! Postgres-backed [`Store`] on diesel-async. Every check-then-write
//! operation re-validates inside a SERIALIZABLE transaction so two racing
//! requests cannot both pass an availability or capacity check and both
//! commit.

use super::{
    Attendee, CheckInResult, EventFilter, NewEquipment, NewEquipmentBooking, NewEvent, NewVenue,
    NewVenueBooking, RsvpRequest, Store, VerdictOutcome,
};
use crate::availability::{self, VenueAvailability};
use crate::conflict::{ConflictDetail, Window};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApprovalStatus, BookingStatus, Equipment, EquipmentBooking, Event, EventApproval, EventRsvp,
    EventStatus, MaintenanceStatus, Role, RsvpStatus, Venue, VenueBooking, VerificationStatus,
};
use crate::schema::*;
use crate::{approval, rsvp, DbPool};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use scoped_futures::ScopedFutureExt;

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        PgStore { pool }
    }
}

/// Booking races are the principal correctness risk; SERIALIZABLE makes the
/// in-transaction re-check sound against concurrent writers.
async fn set_serializable(conn: &mut AsyncPgConnection) -> AppResult<()> {
    diesel::sql_query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(conn)
        .await?;
    Ok(())
}

/// A SERIALIZABLE transaction that loses a race aborts with a
/// serialization failure. That is a conflict with a concurrent writer, not
/// a server fault, so it must reach the caller as 409 and invite a retry.
fn map_serialization_failure(err: AppError) -> AppError {
    if let AppError::InternalServerError(inner) = &err {
        if let Some(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::SerializationFailure,
            _,
        )) = inner.downcast_ref::<diesel::result::Error>()
        {
            return AppError::conflict(
                "a concurrent request changed this resource, please retry",
                vec![],
            );
        }
    }
    err
}

#[derive(Insertable)]
#[diesel(table_name = events)]
struct NewEventRow {
    title: String,
    description: Option<String>,
    category: String,
    start_date: chrono::DateTime<chrono::Utc>,
    end_date: chrono::DateTime<chrono::Utc>,
    location: Option<String>,
    max_attendees: Option<i32>,
    budget: Option<i64>,
    status: EventStatus,
    organizer_id: i32,
    club_id: Option<i32>,
    requires_approval: bool,
    division_restriction: Option<String>,
    department_restriction: Option<String>,
    equipment_required: Vec<String>,
}

#[derive(Insertable)]
#[diesel(table_name = event_approvals)]
struct NewApprovalRow {
    event_id: i32,
    approver_id: Option<i32>,
    approver_role: Role,
    status: ApprovalStatus,
    comments: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = resource_bookings)]
struct NewVenueBookingRow {
    venue_id: i32,
    event_id: Option<i32>,
    user_id: i32,
    start_time: chrono::DateTime<chrono::Utc>,
    end_time: chrono::DateTime<chrono::Utc>,
    status: BookingStatus,
    notes: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = equipment_bookings)]
struct NewEquipmentBookingRow {
    equipment_id: i32,
    event_id: Option<i32>,
    user_id: i32,
    quantity: i32,
    start_time: chrono::DateTime<chrono::Utc>,
    end_time: chrono::DateTime<chrono::Utc>,
    status: BookingStatus,
}

#[derive(Insertable)]
#[diesel(table_name = event_rsvps)]
struct NewRsvpRow {
    event_id: i32,
    user_id: i32,
    user_email: String,
    status: RsvpStatus,
    registration_type: crate::models::RegistrationType,
    rsvp_number: String,
    form_data: Option<serde_json::Value>,
    verification_status: VerificationStatus,
}

#[async_trait]
impl Store for PgStore {
    async fn create_event(&self, new: NewEvent) -> AppResult<Event> {
        let mut conn = self.pool.get().await?;
        let conn = &mut *conn;

        conn.transaction::<Event, AppError, _>(|conn| {
            async move {
                set_serializable(conn).await?;

                // Ad-hoc location strings do not go through venue booking,
                // so approved events at the same literal location are
                // checked directly. Same half-open overlap formula.
                if let Some(location) = &new.location {
                    let colocated: Vec<Event> = events::table
                        .filter(events::status.eq(EventStatus::Approved))
                        .filter(events::location.eq(location.as_str()))
                        .filter(events::start_date.lt(new.window.end))
                        .filter(events::end_date.gt(new.window.start))
                        .load(conn)
                        .await?;
                    if !colocated.is_empty() {
                        let conflicts =
                            colocated.iter().map(ConflictDetail::from).collect();
                        return Err(AppError::conflict(
                            format!("{location} is already booked during this time"),
                            conflicts,
                        ));
                    }
                }

                let event: Event = diesel::insert_into(events::table)
                    .values(NewEventRow {
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
                    })
                    .get_result(conn)
                    .await?;

                let seats: Vec<NewApprovalRow> = new
                    .seats
                    .iter()
                    .map(|seat| NewApprovalRow {
                        event_id: event.id,
                        approver_id: None,
                        approver_role: (*seat).into(),
                        status: ApprovalStatus::Pending,
                        comments: None,
                    })
                    .collect();
                if !seats.is_empty() {
                    diesel::insert_into(event_approvals::table)
                        .values(seats)
                        .execute(conn)
                        .await?;
                }

                tracing::info!(event_id = event.id, status = %event.status, "event created");
                Ok(event)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_serialization_failure)
    }

    async fn event(&self, id: i32) -> AppResult<Event> {
        let mut conn = self.pool.get().await?;
        events::table
            .find(id)
            .first(&mut *conn)
            .await
            .optional()?
            .ok_or_else(|| AppError::not_found("event"))
    }

    async fn list_events(&self, filter: EventFilter) -> AppResult<Vec<Event>> {
        let mut conn = self.pool.get().await?;
        let mut query = events::table.into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(events::status.eq(status));
        }
        if let Some(club_id) = filter.club_id {
            query = query.filter(events::club_id.eq(club_id));
        }
        if let Some(organizer_id) = filter.organizer_id {
            query = query.filter(events::organizer_id.eq(organizer_id));
        }
        Ok(query.order(events::start_date.asc()).load(&mut *conn).await?)
    }

    async fn cancel_event(&self, id: i32, caller_id: i32, caller_role: Role) -> AppResult<Event> {
        let mut conn = self.pool.get().await?;
        let conn = &mut *conn;

        conn.transaction::<Event, AppError, _>(|conn| {
            async move {
                let event: Event = events::table
                    .find(id)
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("event"))?;
                if event.organizer_id != caller_id && !caller_role.can_override_approvals() {
                    return Err(AppError::forbidden(
                        "only the organizer or an admin can cancel",
                    ));
                }
                approval::ensure_cancellable(event.status)?;
                Ok(diesel::update(events::table.find(id))
                    .set(events::status.eq(EventStatus::Cancelled))
                    .get_result(conn)
                    .await?)
            }
            .scope_boxed()
        })
        .await
    }

    async fn approvals(&self, event_id: i32) -> AppResult<Vec<EventApproval>> {
        let mut conn = self.pool.get().await?;
        Ok(event_approvals::table
            .filter(event_approvals::event_id.eq(event_id))
            .order(event_approvals::id.asc())
            .load(&mut *conn)
            .await?)
    }

    async fn record_verdict(
        &self,
        event_id: i32,
        approver_id: i32,
        approver_role: Role,
        verdict: ApprovalStatus,
        comments: Option<String>,
    ) -> AppResult<VerdictOutcome> {
        let mut conn = self.pool.get().await?;
        let conn = &mut *conn;

        conn.transaction::<VerdictOutcome, AppError, _>(|conn| {
            async move {
                set_serializable(conn).await?;

                let event: Event = events::table
                    .find(event_id)
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("event"))?;
                approval::ensure_accepts_verdicts(event.status)?;

                if approver_role.can_override_approvals() {
                    let new_status = match verdict {
                        ApprovalStatus::Approved => EventStatus::Approved,
                        ApprovalStatus::Rejected => EventStatus::Rejected,
                        ApprovalStatus::Pending => {
                            return Err(AppError::validation(
                                "verdict must be approved or rejected",
                            ))
                        }
                    };
                    let row: EventApproval = diesel::insert_into(event_approvals::table)
                        .values(NewApprovalRow {
                            event_id,
                            approver_id: Some(approver_id),
                            approver_role,
                            status: verdict,
                            comments,
                        })
                        .get_result(conn)
                        .await?;
                    diesel::update(events::table.find(event_id))
                        .set(events::status.eq(new_status))
                        .execute(conn)
                        .await?;
                    tracing::info!(event_id, %new_status, "verdict override applied");
                    return Ok(VerdictOutcome {
                        approval: row,
                        event_status: new_status,
                    });
                }

                let seat: EventApproval = event_approvals::table
                    .filter(event_approvals::event_id.eq(event_id))
                    .filter(event_approvals::approver_role.eq(approver_role))
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| {
                        AppError::forbidden("this event has no approval seat for your role")
                    })?;
                if seat.status != ApprovalStatus::Pending {
                    return Err(AppError::invalid_state(
                        "this approval seat has already voted",
                    ));
                }

                let row: EventApproval = diesel::update(event_approvals::table.find(seat.id))
                    .set((
                        event_approvals::status.eq(verdict),
                        event_approvals::approver_id.eq(Some(approver_id)),
                        event_approvals::comments.eq(comments),
                    ))
                    .get_result(conn)
                    .await?;

                let verdicts: Vec<ApprovalStatus> = event_approvals::table
                    .filter(event_approvals::event_id.eq(event_id))
                    .select(event_approvals::status)
                    .load(conn)
                    .await?;
                let event_status = match approval::aggregate(&verdicts) {
                    Some(status) => {
                        diesel::update(events::table.find(event_id))
                            .set(events::status.eq(status))
                            .execute(conn)
                            .await?;
                        tracing::info!(event_id, %status, "approval quorum resolved");
                        status
                    }
                    None => event.status,
                };

                Ok(VerdictOutcome {
                    approval: row,
                    event_status,
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_serialization_failure)
    }

    async fn list_venues(&self) -> AppResult<Vec<Venue>> {
        let mut conn = self.pool.get().await?;
        Ok(venues::table
            .order(venues::name.asc())
            .load(&mut *conn)
            .await?)
    }

    async fn create_venue(&self, new: NewVenue) -> AppResult<Venue> {
        #[derive(Insertable)]
        #[diesel(table_name = venues)]
        struct NewVenueRow {
            name: String,
            capacity: i32,
            location: Option<String>,
            is_available: bool,
            created_by: Option<i32>,
        }

        let mut conn = self.pool.get().await?;
        let venue = diesel::insert_into(venues::table)
            .values(NewVenueRow {
                name: new.name,
                capacity: new.capacity,
                location: new.location,
                is_available: true,
                created_by: Some(new.created_by),
            })
            .on_conflict(venues::name)
            .do_nothing()
            .get_result(&mut *conn)
            .await
            .optional()?;

        venue.ok_or_else(|| AppError::conflict("venue name is already taken", vec![]))
    }

    async fn set_venue_availability(&self, id: i32, is_available: bool) -> AppResult<Venue> {
        let mut conn = self.pool.get().await?;
        diesel::update(venues::table.find(id))
            .set(venues::is_available.eq(is_available))
            .get_result(&mut *conn)
            .await
            .optional()?
            .ok_or_else(|| AppError::not_found("venue"))
    }

    async fn venue_availability(
        &self,
        venue_id: i32,
        window: Window,
    ) -> AppResult<VenueAvailability> {
        let mut conn = self.pool.get().await?;
        let venue: Venue = venues::table
            .find(venue_id)
            .first(&mut *conn)
            .await
            .optional()?
            .ok_or_else(|| AppError::not_found("venue"))?;
        let approved = approved_venue_bookings(&mut conn, venue_id, window).await?;
        Ok(availability::venue_availability(&venue, &approved, window))
    }

    async fn book_venue(&self, new: NewVenueBooking) -> AppResult<VenueBooking> {
        let mut conn = self.pool.get().await?;
        let conn = &mut *conn;

        conn.transaction::<VenueBooking, AppError, _>(|conn| {
            async move {
                set_serializable(conn).await?;

                let venue: Venue = venues::table
                    .find(new.venue_id)
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("venue"))?;
                let approved =
                    approved_venue_bookings(conn, new.venue_id, new.window).await?;
                availability::check_venue(&venue, &approved, new.window)?;

                let booking: VenueBooking = diesel::insert_into(resource_bookings::table)
                    .values(NewVenueBookingRow {
                        venue_id: new.venue_id,
                        event_id: new.event_id,
                        user_id: new.user_id,
                        start_time: new.window.start,
                        end_time: new.window.end,
                        status: BookingStatus::Approved,
                        notes: new.notes,
                    })
                    .get_result(conn)
                    .await?;
                tracing::info!(booking_id = booking.id, venue_id = venue.id, "venue booked");
                Ok(booking)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_serialization_failure)
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let mut conn = self.pool.get().await?;
        Ok(equipment::table
            .order(equipment::name.asc())
            .load(&mut *conn)
            .await?)
    }

    async fn create_equipment(&self, new: NewEquipment) -> AppResult<Equipment> {
        #[derive(Insertable)]
        #[diesel(table_name = equipment)]
        struct NewEquipmentRow {
            name: String,
            quantity: i32,
            available_quantity: i32,
            maintenance_status: MaintenanceStatus,
            created_by: Option<i32>,
        }

        let mut conn = self.pool.get().await?;
        Ok(diesel::insert_into(equipment::table)
            .values(NewEquipmentRow {
                name: new.name,
                quantity: new.quantity,
                available_quantity: new.available_quantity,
                maintenance_status: new.maintenance_status,
                created_by: Some(new.created_by),
            })
            .get_result(&mut *conn)
            .await?)
    }

    async fn update_equipment_status(
        &self,
        id: i32,
        maintenance_status: MaintenanceStatus,
        available_quantity: Option<i32>,
    ) -> AppResult<Equipment> {
        let mut conn = self.pool.get().await?;
        let conn = &mut *conn;

        conn.transaction::<Equipment, AppError, _>(|conn| {
            async move {
                let item: Equipment = equipment::table
                    .find(id)
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("equipment"))?;
                if let Some(qty) = available_quantity {
                    if qty < 0 || qty > item.quantity {
                        return Err(AppError::validation(
                            "available quantity must be between 0 and the total quantity",
                        ));
                    }
                }
                Ok(diesel::update(equipment::table.find(id))
                    .set((
                        equipment::maintenance_status.eq(maintenance_status),
                        equipment::available_quantity
                            .eq(available_quantity.unwrap_or(item.available_quantity)),
                    ))
                    .get_result(conn)
                    .await?)
            }
            .scope_boxed()
        })
        .await
    }

    async fn book_equipment(&self, new: NewEquipmentBooking) -> AppResult<EquipmentBooking> {
        let mut conn = self.pool.get().await?;
        let conn = &mut *conn;

        conn.transaction::<EquipmentBooking, AppError, _>(|conn| {
            async move {
                set_serializable(conn).await?;

                let item: Equipment = equipment::table
                    .find(new.equipment_id)
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("equipment"))?;
                let approved: Vec<EquipmentBooking> = equipment_bookings::table
                    .filter(equipment_bookings::equipment_id.eq(new.equipment_id))
                    .filter(equipment_bookings::status.eq(BookingStatus::Approved))
                    .filter(equipment_bookings::start_time.lt(new.window.end))
                    .filter(equipment_bookings::end_time.gt(new.window.start))
                    .load(conn)
                    .await?;
                availability::check_equipment(&item, &approved, new.window, new.quantity)?;

                let booking: EquipmentBooking =
                    diesel::insert_into(equipment_bookings::table)
                        .values(NewEquipmentBookingRow {
                            equipment_id: new.equipment_id,
                            event_id: new.event_id,
                            user_id: new.user_id,
                            quantity: new.quantity,
                            start_time: new.window.start,
                            end_time: new.window.end,
                            status: BookingStatus::Approved,
                        })
                        .get_result(conn)
                        .await?;
                tracing::info!(
                    booking_id = booking.id,
                    equipment_id = item.id,
                    quantity = booking.quantity,
                    "equipment booked"
                );
                Ok(booking)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_serialization_failure)
    }

    async fn event_rsvps(&self, event_id: i32) -> AppResult<Vec<EventRsvp>> {
        let mut conn = self.pool.get().await?;
        Ok(event_rsvps::table
            .filter(event_rsvps::event_id.eq(event_id))
            .order(event_rsvps::id.asc())
            .load(&mut *conn)
            .await?)
    }

    async fn upsert_rsvp(
        &self,
        event_id: i32,
        attendee: Attendee,
        req: RsvpRequest,
    ) -> AppResult<(EventRsvp, bool)> {
        let mut conn = self.pool.get().await?;
        let conn = &mut *conn;

        conn.transaction::<(EventRsvp, bool), AppError, _>(|conn| {
            async move {
                set_serializable(conn).await?;

                let event: Event = events::table
                    .find(event_id)
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("event"))?;
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

                // capacity gates slot-occupying responses; the caller's own
                // row is excluded so updating an existing RSVP never
                // self-collides
                if req.status != RsvpStatus::NotAttending {
                    let occupied: i64 = event_rsvps::table
                        .filter(event_rsvps::event_id.eq(event_id))
                        .filter(event_rsvps::user_id.ne(attendee.user_id))
                        .filter(event_rsvps::status.ne(RsvpStatus::NotAttending))
                        .count()
                        .get_result(conn)
                        .await?;
                    rsvp::ensure_capacity(event.max_attendees, occupied as usize)?;
                }

                let existing: Option<EventRsvp> = event_rsvps::table
                    .filter(event_rsvps::event_id.eq(event_id))
                    .filter(event_rsvps::user_id.eq(attendee.user_id))
                    .first(conn)
                    .await
                    .optional()?;

                if let Some(existing) = existing {
                    let updated: EventRsvp =
                        diesel::update(event_rsvps::table.find(existing.id))
                            .set((
                                event_rsvps::status.eq(req.status),
                                event_rsvps::registration_type.eq(req
                                    .registration_type
                                    .unwrap_or(existing.registration_type)),
                                event_rsvps::form_data
                                    .eq(req.form_data.or(existing.form_data)),
                            ))
                            .get_result(conn)
                            .await?;
                    return Ok((updated, false));
                }

                // regenerate on collision; the unique constraint backstops
                // anything this select misses
                let mut rsvp_number = rsvp::generate_rsvp_number();
                loop {
                    let taken: i64 = event_rsvps::table
                        .filter(event_rsvps::rsvp_number.eq(&rsvp_number))
                        .count()
                        .get_result(conn)
                        .await?;
                    if taken == 0 {
                        break;
                    }
                    rsvp_number = rsvp::generate_rsvp_number();
                }

                let row: EventRsvp = diesel::insert_into(event_rsvps::table)
                    .values(NewRsvpRow {
                        event_id,
                        user_id: attendee.user_id,
                        user_email: attendee.email,
                        status: req.status,
                        registration_type: req.registration_type.unwrap_or_default(),
                        rsvp_number,
                        form_data: req.form_data,
                        verification_status: VerificationStatus::Pending,
                    })
                    .get_result(conn)
                    .await?;
                Ok((row, true))
            }
            .scope_boxed()
        })
        .await
        .map_err(map_serialization_failure)
    }

    async fn check_in_by_code(
        &self,
        rsvp_number: &str,
        event_id: i32,
    ) -> AppResult<CheckInResult> {
        let mut conn = self.pool.get().await?;
        let conn = &mut *conn;
        let rsvp_number = rsvp_number.to_owned();

        conn.transaction::<CheckInResult, AppError, _>(|conn| {
            async move {
                let row: EventRsvp = event_rsvps::table
                    .filter(event_rsvps::rsvp_number.eq(&rsvp_number))
                    .filter(event_rsvps::event_id.eq(event_id))
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("rsvp"))?;
                finish_check_in(conn, row).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn check_in_by_email(&self, email: &str, event_id: i32) -> AppResult<CheckInResult> {
        let mut conn = self.pool.get().await?;
        let conn = &mut *conn;
        let email = email.to_owned();

        conn.transaction::<CheckInResult, AppError, _>(|conn| {
            async move {
                let row: EventRsvp = event_rsvps::table
                    .filter(event_rsvps::user_email.eq(&email))
                    .filter(event_rsvps::event_id.eq(event_id))
                    .first(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::not_found("rsvp"))?;
                finish_check_in(conn, row).await
            }
            .scope_boxed()
        })
        .await
    }
}

/// Approved bookings for a venue that touch `window`; the SQL range filter
/// encodes the same half-open overlap as `conflict::overlaps`.
async fn approved_venue_bookings(
    conn: &mut AsyncPgConnection,
    venue_id: i32,
    window: Window,
) -> AppResult<Vec<VenueBooking>> {
    Ok(resource_bookings::table
        .filter(resource_bookings::venue_id.eq(venue_id))
        .filter(resource_bookings::status.eq(BookingStatus::Approved))
        .filter(resource_bookings::start_time.lt(window.end))
        .filter(resource_bookings::end_time.gt(window.start))
        .load(conn)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    #[test]
    fn lost_serialization_races_surface_as_conflict() {
        let lost: AppError = DieselError::DatabaseError(
            DatabaseErrorKind::SerializationFailure,
            Box::new("could not serialize access".to_string()),
        )
        .into();
        assert!(matches!(
            map_serialization_failure(lost),
            AppError::Conflict { .. }
        ));
    }

    #[test]
    fn other_database_errors_stay_internal() {
        let broken: AppError = DieselError::BrokenTransactionManager.into();
        assert!(matches!(
            map_serialization_failure(broken),
            AppError::InternalServerError(_)
        ));
        assert!(matches!(
            map_serialization_failure(AppError::CapacityExceeded),
            AppError::CapacityExceeded
        ));
    }
}

/// Shared tail of both check-in paths: one transition function, one update.
async fn finish_check_in(
    conn: &mut AsyncPgConnection,
    row: EventRsvp,
) -> AppResult<CheckInResult> {
    let (next, outcome) = rsvp::apply_check_in(row.verification_status);
    let updated: EventRsvp = diesel::update(event_rsvps::table.find(row.id))
        .set(event_rsvps::verification_status.eq(next))
        .get_result(conn)
        .await?;
    Ok(CheckInResult::new(updated, outcome))
}
