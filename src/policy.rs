//! The role -> action capability table. Every handler consults this instead
//! of re-deriving access rules from role-name lists.

use crate::error::{AppError, AppResult};
use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateEvent,
    ApproveEvent,
    CancelEvent,
    BookResources,
    ManageInventory,
    CheckInAttendees,
    ViewRsvps,
}

pub fn allows(role: Role, action: Action) -> bool {
    use Action::*;
    use Role::*;

    match action {
        CreateEvent => true,
        ApproveEvent => matches!(role, Teacher | Registrar | FinancialHead | Hod | Admin),
        // ownership is checked separately against the event's organizer
        CancelEvent => true,
        BookResources => matches!(role, ClubMember | ClubHead | Teacher | Hod | Admin),
        ManageInventory => matches!(role, TechnicalStaff | Admin),
        CheckInAttendees | ViewRsvps => {
            matches!(role, ClubHead | Teacher | Registrar | Hod | TechnicalStaff | Admin)
        }
    }
}

pub fn require(role: Role, action: Action) -> AppResult<()> {
    if allows(role, action) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "role {role} may not perform this action"
        )))
    }
}
