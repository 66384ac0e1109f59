//! Event approval workflow: quorum policy and verdict aggregation.
//!
//! Events start `pending` with one approval seat per required role. A single
//! rejection vetoes the event immediately; it becomes `approved` only once
//! every seat holds an approval. Aggregation is pure; the store commits the
//! verdict write and the resulting event-status write in one transaction.

use crate::error::{AppError, AppResult};
use crate::models::{ApprovalStatus, ApproverRole, EventStatus, Role};

/// Which approver roles an event needs before it can go `approved`.
///
/// The roles are configuration, not code: construct a different policy to
/// change the quorum.
#[derive(Debug, Clone)]
pub struct QuorumPolicy {
    /// Seats every approval-requiring event gets.
    pub required: Vec<ApproverRole>,
    /// Extra seats for events that request a budget.
    pub budget_roles: Vec<ApproverRole>,
}

impl Default for QuorumPolicy {
    fn default() -> Self {
        QuorumPolicy {
            required: vec![ApproverRole::Teacher, ApproverRole::Registrar],
            budget_roles: vec![ApproverRole::FinancialHead],
        }
    }
}

impl QuorumPolicy {
    /// The full seat list for an event, deduplicated, in policy order.
    pub fn required_for(&self, has_budget: bool) -> Vec<ApproverRole> {
        let mut seats = self.required.clone();
        if has_budget {
            for role in &self.budget_roles {
                if !seats.contains(role) {
                    seats.push(*role);
                }
            }
        }
        seats
    }
}

/// Folds the current verdict set (one entry per approval seat) into an
/// event status, if the set is decisive. `None` means the event stays
/// `pending`.
pub fn aggregate(verdicts: &[ApprovalStatus]) -> Option<EventStatus> {
    if verdicts.contains(&ApprovalStatus::Rejected) {
        return Some(EventStatus::Rejected);
    }
    if !verdicts.is_empty() && verdicts.iter().all(|v| *v == ApprovalStatus::Approved) {
        return Some(EventStatus::Approved);
    }
    None
}

/// How a freshly created event enters the workflow.
#[derive(Debug, Clone)]
pub struct CreationPlan {
    pub status: EventStatus,
    pub requires_approval: bool,
    pub seats: Vec<ApproverRole>,
}

/// Heads of department are trusted to run their own events: their events are
/// born approved with no approval seats. Everyone else starts `pending` with
/// the policy's seat list.
pub fn plan_creation(organizer_role: Role, has_budget: bool, policy: &QuorumPolicy) -> CreationPlan {
    if organizer_role == Role::Hod {
        return CreationPlan {
            status: EventStatus::Approved,
            requires_approval: false,
            seats: vec![],
        };
    }
    CreationPlan {
        status: EventStatus::Pending,
        requires_approval: true,
        seats: policy.required_for(has_budget),
    }
}

/// Guard for verdict submission: terminal events accept no further verdicts.
pub fn ensure_accepts_verdicts(status: EventStatus) -> AppResult<()> {
    if status.is_terminal() {
        return Err(AppError::invalid_state(format!(
            "event is already {status} and accepts no further verdicts"
        )));
    }
    Ok(())
}

/// Guard for cancellation: only approved events can be cancelled.
pub fn ensure_cancellable(status: EventStatus) -> AppResult<()> {
    if status != EventStatus::Approved {
        return Err(AppError::invalid_state(format!(
            "only approved events can be cancelled, this one is {status}"
        )));
    }
    Ok(())
}
