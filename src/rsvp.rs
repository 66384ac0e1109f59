//! RSVP ledger rules: confirmation codes, eligibility, capacity and the
//! check-in transition.

use crate::error::{AppError, AppResult};
use crate::models::{Event, VerificationStatus};
use nanoid::nanoid;

/// Code alphabet without visually ambiguous characters (0/O, 1/I/L), since
/// these codes get read out loud and typed at the door.
const CODE_ALPHABET: [char; 30] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'M',
    'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
];

const CODE_LEN: usize = 10;

/// A fresh confirmation code, e.g. `RSVP-7KQXW24MNP`. 30^10 possibilities
/// makes both collisions and enumeration impractical; the unique column
/// constraint backstops the former.
pub fn generate_rsvp_number() -> String {
    format!("RSVP-{}", nanoid!(CODE_LEN, &CODE_ALPHABET))
}

/// Division/department eligibility for an event, checked before any write.
pub fn check_eligibility(
    event: &Event,
    division: Option<&str>,
    department: Option<&str>,
) -> AppResult<()> {
    if let Some(required) = event.division_restriction.as_deref() {
        if division != Some(required) {
            return Err(AppError::forbidden(format!(
                "this event is restricted to {required}"
            )));
        }
    }
    if let Some(required) = event.department_restriction.as_deref() {
        if department != Some(required) {
            return Err(AppError::forbidden(format!(
                "this event is restricted to {required}"
            )));
        }
    }
    Ok(())
}

/// Capacity gate. `occupied` counts existing slot-holding RSVPs, so the
/// N-th registration passes and the (N+1)-th fails.
pub fn ensure_capacity(max_attendees: Option<i32>, occupied: usize) -> AppResult<()> {
    if let Some(max) = max_attendees {
        if occupied >= max.max(0) as usize {
            return Err(AppError::CapacityExceeded);
        }
    }
    Ok(())
}

/// Outcome of presenting a code (or email) at the door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckIn {
    Recorded,
    /// Duplicate scan: already attended, state untouched. Deliberately not
    /// an error so staff can tell a re-scan from an invalid code.
    AlreadyCheckedIn,
}

/// The single check-in transition, used by both scan and manual check-in.
/// Monotonic: once `attended`, re-applying never reverts.
pub fn apply_check_in(current: VerificationStatus) -> (VerificationStatus, CheckIn) {
    match current {
        VerificationStatus::Attended => (VerificationStatus::Attended, CheckIn::AlreadyCheckedIn),
        VerificationStatus::Pending | VerificationStatus::Verified => {
            (VerificationStatus::Attended, CheckIn::Recorded)
        }
    }
}
