//! The approval workflow end to end: seat seeding, veto, quorum, overrides,
//! and terminal-state guards.

mod common;

use std::sync::Arc;

use campus_events::{
    error::AppError,
    models::{ApprovalStatus, EventStatus, Role},
    store::{Store, VerdictOutcome},
};
use common::{new_event, store, window};

async fn pending_event(store: &dyn Store, budget: Option<i64>) -> i32 {
    let mut new = new_event("Tech fest", Role::ClubHead, window(9, 17));
    if budget.is_some() {
        // re-plan with the budget seat included
        let plan = campus_events::approval::plan_creation(
            Role::ClubHead,
            true,
            &campus_events::approval::QuorumPolicy::default(),
        );
        new.budget = budget;
        new.seats = plan.seats;
    }
    store.create_event(new).await.unwrap().id
}

async fn verdict(
    store: &dyn Store,
    event_id: i32,
    approver_id: i32,
    role: Role,
    verdict: ApprovalStatus,
) -> Result<VerdictOutcome, AppError> {
    store
        .record_verdict(event_id, approver_id, role, verdict, None)
        .await
}

#[tokio::test]
async fn event_without_budget_seeds_two_seats() {
    let store = store();
    let id = pending_event(&*store, None).await;

    let seats = store.approvals(id).await.unwrap();
    assert_eq!(seats.len(), 2);
    assert!(seats.iter().all(|s| s.status == ApprovalStatus::Pending));
    assert!(seats.iter().all(|s| s.approver_id.is_none()));
}

#[tokio::test]
async fn budget_event_adds_the_financial_seat() {
    let store = store();
    let id = pending_event(&*store, Some(50_000)).await;
    assert_eq!(store.approvals(id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn quorum_approves_only_when_every_seat_agrees() {
    let store = store();
    let id = pending_event(&*store, None).await;

    let outcome = verdict(&*store, id, 10, Role::Teacher, ApprovalStatus::Approved)
        .await
        .unwrap();
    assert_eq!(outcome.event_status, EventStatus::Pending);

    let outcome = verdict(&*store, id, 11, Role::Registrar, ApprovalStatus::Approved)
        .await
        .unwrap();
    assert_eq!(outcome.event_status, EventStatus::Approved);
    assert_eq!(
        store.event(id).await.unwrap().status,
        EventStatus::Approved
    );
}

#[tokio::test]
async fn one_rejection_vetoes_immediately() {
    let store = store();
    let id = pending_event(&*store, Some(1_000)).await;

    verdict(&*store, id, 10, Role::Teacher, ApprovalStatus::Approved)
        .await
        .unwrap();
    let outcome = verdict(&*store, id, 11, Role::Registrar, ApprovalStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(outcome.event_status, EventStatus::Rejected);

    // the remaining seat can no longer vote
    let err = verdict(&*store, id, 12, Role::FinancialHead, ApprovalStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(
        store.event(id).await.unwrap().status,
        EventStatus::Rejected
    );
}

#[tokio::test]
async fn a_seat_votes_once() {
    let store = store();
    let id = pending_event(&*store, None).await;

    verdict(&*store, id, 10, Role::Teacher, ApprovalStatus::Approved)
        .await
        .unwrap();
    let err = verdict(&*store, id, 20, Role::Teacher, ApprovalStatus::Rejected)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn roles_without_a_seat_are_forbidden() {
    let store = store();
    let id = pending_event(&*store, None).await;

    // no budget, so there is no financial seat
    let err = verdict(&*store, id, 12, Role::FinancialHead, ApprovalStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn hod_events_skip_the_workflow() {
    let store = store();
    let event = store
        .create_event(new_event("Faculty meet", Role::Hod, window(9, 11)))
        .await
        .unwrap();

    assert_eq!(event.status, EventStatus::Approved);
    assert!(!event.requires_approval);
    assert!(store.approvals(event.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn admin_override_decides_without_seats() {
    let store = store();
    let id = pending_event(&*store, None).await;

    let outcome = verdict(&*store, id, 99, Role::Admin, ApprovalStatus::Approved)
        .await
        .unwrap();
    assert_eq!(outcome.event_status, EventStatus::Approved);
    // the override is recorded alongside the untouched seats
    assert_eq!(store.approvals(id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn overrides_must_be_decisive() {
    let store = store();
    let id = pending_event(&*store, None).await;

    let err = verdict(&*store, id, 99, Role::Admin, ApprovalStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn cancel_requires_an_approved_event() {
    let store = store();
    let id = pending_event(&*store, None).await;

    let err = store.cancel_event(id, 1, Role::ClubHead).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    verdict(&*store, id, 10, Role::Teacher, ApprovalStatus::Approved)
        .await
        .unwrap();
    verdict(&*store, id, 11, Role::Registrar, ApprovalStatus::Approved)
        .await
        .unwrap();

    // organizer_id is 1 in the fixtures; a stranger cannot cancel
    let err = store.cancel_event(id, 42, Role::ClubHead).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let event = store.cancel_event(id, 1, Role::ClubHead).await.unwrap();
    assert_eq!(event.status, EventStatus::Cancelled);

    // cancellation is terminal
    let err = verdict(&*store, id, 10, Role::Teacher, ApprovalStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn racing_final_verdicts_settle_once() {
    let store = store();
    let id = pending_event(&*store, None).await;
    verdict(&*store, id, 10, Role::Teacher, ApprovalStatus::Approved)
        .await
        .unwrap();

    let approve = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .record_verdict(id, 11, Role::Registrar, ApprovalStatus::Approved, None)
                .await
        })
    };
    let reject = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .record_verdict(id, 21, Role::Registrar, ApprovalStatus::Rejected, None)
                .await
        })
    };

    let results = [approve.await.unwrap(), reject.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

    // whichever verdict landed first decided the event; the loser got
    // InvalidState, not a second decision
    let status = store.event(id).await.unwrap().status;
    assert!(matches!(
        status,
        EventStatus::Approved | EventStatus::Rejected
    ));
}
