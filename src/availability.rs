//! Availability decisions for venues (exclusive) and equipment (fungible
//! pool). Pure over already-fetched rows; both store backends call these
//! inside their own atomic section so the check and the insert cannot be
//! interleaved by another writer.

use crate::conflict::{self, ConflictDetail, Window};
use crate::error::{AppError, AppResult};
use crate::models::{Equipment, EquipmentBooking, MaintenanceStatus, Venue, VenueBooking};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueAvailability {
    pub available: bool,
    pub conflicts: Vec<ConflictDetail>,
}

/// A venue is free iff its manual override allows bookings and no approved
/// booking overlaps the window. `approved` must contain approved bookings
/// only; pending and rejected ones never block.
pub fn venue_availability(
    venue: &Venue,
    approved: &[VenueBooking],
    window: Window,
) -> VenueAvailability {
    let conflicts: Vec<ConflictDetail> = conflict::find_conflicts(window, approved)
        .into_iter()
        .map(ConflictDetail::from)
        .collect();
    VenueAvailability {
        available: venue.is_available && conflicts.is_empty(),
        conflicts,
    }
}

pub fn check_venue(venue: &Venue, approved: &[VenueBooking], window: Window) -> AppResult<()> {
    if !venue.is_available {
        return Err(AppError::invalid_state(format!(
            "venue {} is closed for bookings",
            venue.name
        )));
    }
    let availability = venue_availability(venue, approved, window);
    if !availability.available {
        return Err(AppError::conflict(
            format!("venue {} is already booked during this time", venue.name),
            availability.conflicts,
        ));
    }
    Ok(())
}

/// Units of the pool already promised to approved bookings overlapping the
/// window. Non-overlapping bookings share nothing: each may use the full
/// inventory.
pub fn overlapping_usage(approved: &[EquipmentBooking], window: Window) -> i32 {
    conflict::find_conflicts(window, approved)
        .iter()
        .map(|b| b.quantity)
        .sum()
}

/// Whether `requested` units fit in the pool for the window.
///
/// `available_quantity` is the pool ceiling (units not withdrawn for
/// maintenance); overlapping approved bookings share it.
pub fn check_equipment(
    item: &Equipment,
    approved: &[EquipmentBooking],
    window: Window,
    requested: i32,
) -> AppResult<()> {
    if requested < 1 {
        return Err(AppError::validation("quantity must be at least 1"));
    }
    if item.maintenance_status == MaintenanceStatus::OutOfOrder {
        return Err(AppError::invalid_state(format!(
            "equipment {} is out of order",
            item.name
        )));
    }
    if item.available_quantity < requested {
        return Err(AppError::conflict(
            format!(
                "only {} of {} available",
                item.available_quantity, item.name
            ),
            vec![],
        ));
    }
    let used = overlapping_usage(approved, window);
    if item.available_quantity - used < requested {
        let conflicts = conflict::find_conflicts(window, approved)
            .into_iter()
            .map(ConflictDetail::from)
            .collect();
        return Err(AppError::conflict(
            format!(
                "{} of {} already reserved in this window, {} requested of {} total",
                used, item.name, requested, item.available_quantity
            ),
            conflicts,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, hour, 0, 0).unwrap()
    }

    fn win(start: u32, end: u32) -> Window {
        Window::new(at(start), at(end)).unwrap()
    }

    fn venue(is_available: bool) -> Venue {
        Venue {
            id: 1,
            name: "Main Auditorium".into(),
            capacity: 100,
            location: None,
            is_available,
            created_by: None,
            created_at: at(0),
        }
    }

    fn venue_booking(start: u32, end: u32) -> VenueBooking {
        VenueBooking {
            id: 7,
            venue_id: 1,
            event_id: Some(42),
            user_id: 3,
            start_time: at(start),
            end_time: at(end),
            status: BookingStatus::Approved,
            notes: None,
            created_at: at(0),
        }
    }

    fn projector(available_quantity: i32, maintenance: MaintenanceStatus) -> Equipment {
        Equipment {
            id: 1,
            name: "Projector".into(),
            quantity: 10,
            available_quantity,
            maintenance_status: maintenance,
            created_by: None,
            created_at: at(0),
        }
    }

    fn eq_booking(quantity: i32, start: u32, end: u32) -> EquipmentBooking {
        EquipmentBooking {
            id: 9,
            equipment_id: 1,
            event_id: None,
            user_id: 3,
            quantity,
            start_time: at(start),
            end_time: at(end),
            status: BookingStatus::Approved,
            created_at: at(0),
        }
    }

    #[test]
    fn overlapping_venue_booking_blocks() {
        let existing = vec![venue_booking(14, 16)];
        let err = check_venue(&venue(true), &existing, win(15, 17)).unwrap_err();
        match err {
            AppError::Conflict { conflicts, .. } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].event_id, Some(42));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn back_to_back_venue_booking_passes() {
        let existing = vec![venue_booking(14, 16)];
        assert!(check_venue(&venue(true), &existing, win(16, 18)).is_ok());
    }

    #[test]
    fn closed_venue_never_available() {
        let availability = venue_availability(&venue(false), &[], win(10, 12));
        assert!(!availability.available);
        assert!(availability.conflicts.is_empty());
        assert!(check_venue(&venue(false), &[], win(10, 12)).is_err());
    }

    #[test]
    fn equipment_pool_shares_overlap_only() {
        let approved = vec![eq_booking(6, 10, 12)];
        let item = projector(10, MaintenanceStatus::Good);
        // 6 + 5 > 10 during the 11:00-12:00 overlap
        assert!(check_equipment(&item, &approved, win(11, 13), 5).is_err());
        // 6 + 4 = 10, exactly at capacity
        assert!(check_equipment(&item, &approved, win(11, 13), 4).is_ok());
        // disjoint window gets the whole pool
        assert!(check_equipment(&item, &approved, win(12, 14), 10).is_ok());
    }

    #[test]
    fn withdrawn_units_cap_the_pool() {
        let item = projector(3, MaintenanceStatus::Good);
        assert!(check_equipment(&item, &[], win(10, 12), 4).is_err());
        assert!(check_equipment(&item, &[], win(10, 12), 3).is_ok());
    }

    #[test]
    fn out_of_order_equipment_is_unbookable() {
        let item = projector(10, MaintenanceStatus::OutOfOrder);
        assert!(check_equipment(&item, &[], win(10, 12), 1).is_err());
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let item = projector(10, MaintenanceStatus::Good);
        assert!(matches!(
            check_equipment(&item, &[], win(10, 12), 0),
            Err(AppError::Validation(_))
        ));
    }
}
