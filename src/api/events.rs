use std::sync::Arc;

use crate::{
    approval::{self, QuorumPolicy},
    auth::ExtractAuth,
    conflict::Window,
    error::{AppError, AppResult},
    models::{ApprovalStatus, Event, EventApproval, EventRsvp, EventStatus, RegistrationType, RsvpStatus},
    policy::{self, Action},
    store::{Attendee, EventFilter, NewEvent, RsvpRequest, Store},
};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub max_attendees: Option<i32>,
    pub budget: Option<i64>,
    pub club_id: Option<i32>,
    pub division_restriction: Option<String>,
    pub department_restriction: Option<String>,
    #[serde(default)]
    pub equipment_required: Vec<String>,
}

async fn create(
    Extension(store): Extension<Arc<dyn Store>>,
    Extension(quorum): Extension<Arc<QuorumPolicy>>,
    Json(req): Json<CreateEventRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<(StatusCode, Json<Event>)> {
    policy::require(claims.role, Action::CreateEvent)?;
    if req.title.trim().is_empty() {
        return Err(AppError::validation("title must not be empty"));
    }
    if let Some(max) = req.max_attendees {
        if max < 1 {
            return Err(AppError::validation("maxAttendees must be positive"));
        }
    }
    let window = Window::new(req.start_date, req.end_date)?;

    let plan = approval::plan_creation(claims.role, req.budget.is_some(), &quorum);
    let event = store
        .create_event(NewEvent {
            title: req.title,
            description: req.description,
            category: req.category,
            window,
            location: req.location,
            max_attendees: req.max_attendees,
            budget: req.budget,
            organizer_id: claims.sub,
            club_id: req.club_id,
            division_restriction: req.division_restriction,
            department_restriction: req.department_restriction,
            equipment_required: req.equipment_required,
            status: plan.status,
            requires_approval: plan.requires_approval,
            seats: plan.seats,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEventsQuery {
    pub status: Option<EventStatus>,
    pub club_id: Option<i32>,
    pub organizer_id: Option<i32>,
}

async fn list(
    Extension(store): Extension<Arc<dyn Store>>,
    Query(query): Query<ListEventsQuery>,
    ExtractAuth(_claims): ExtractAuth,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(
        store
            .list_events(EventFilter {
                status: query.status,
                club_id: query.club_id,
                organizer_id: query.organizer_id,
            })
            .await?,
    ))
}

async fn info(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(event_id): Path<i32>,
    ExtractAuth(_claims): ExtractAuth,
) -> AppResult<Json<Event>> {
    Ok(Json(store.event(event_id).await?))
}

async fn list_approvals(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(event_id): Path<i32>,
    ExtractAuth(_claims): ExtractAuth,
) -> AppResult<Json<Vec<EventApproval>>> {
    store.event(event_id).await?;
    Ok(Json(store.approvals(event_id).await?))
}

#[derive(Deserialize)]
struct VerdictRequest {
    pub comments: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerdictResponse {
    pub approval: EventApproval,
    pub event_status: EventStatus,
}

async fn record_verdict(
    store: Arc<dyn Store>,
    event_id: i32,
    claims: crate::auth::Claims,
    verdict: ApprovalStatus,
    comments: Option<String>,
) -> AppResult<Json<VerdictResponse>> {
    policy::require(claims.role, Action::ApproveEvent)?;
    let outcome = store
        .record_verdict(event_id, claims.sub, claims.role, verdict, comments)
        .await?;
    Ok(Json(VerdictResponse {
        approval: outcome.approval,
        event_status: outcome.event_status,
    }))
}

async fn approve(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(event_id): Path<i32>,
    Json(req): Json<VerdictRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<VerdictResponse>> {
    record_verdict(store, event_id, claims, ApprovalStatus::Approved, req.comments).await
}

async fn reject(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(event_id): Path<i32>,
    Json(req): Json<VerdictRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<VerdictResponse>> {
    record_verdict(store, event_id, claims, ApprovalStatus::Rejected, req.comments).await
}

async fn cancel(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(event_id): Path<i32>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<Event>> {
    policy::require(claims.role, Action::CancelEvent)?;
    Ok(Json(
        store.cancel_event(event_id, claims.sub, claims.role).await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RsvpUpsertRequest {
    pub status: RsvpStatus,
    /// Omitted on an update keeps the registration type already on file.
    pub registration_type: Option<RegistrationType>,
    pub form_data: Option<serde_json::Value>,
}

async fn upsert_rsvp(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(event_id): Path<i32>,
    Json(req): Json<RsvpUpsertRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<(StatusCode, Json<EventRsvp>)> {
    let (rsvp, created) = store
        .upsert_rsvp(
            event_id,
            Attendee {
                user_id: claims.sub,
                email: claims.email,
                division: claims.division,
                department: claims.department,
            },
            RsvpRequest {
                status: req.status,
                registration_type: req.registration_type,
                form_data: req.form_data,
            },
        )
        .await?;
    let code = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((code, Json(rsvp)))
}

async fn list_rsvps(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(event_id): Path<i32>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<Vec<EventRsvp>>> {
    policy::require(claims.role, Action::ViewRsvps)?;
    store.event(event_id).await?;
    Ok(Json(store.event_rsvps(event_id).await?))
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:event_id", get(info))
        .route("/:event_id/approvals", get(list_approvals))
        .route("/:event_id/approve", post(approve))
        .route("/:event_id/reject", post(reject))
        .route("/:event_id/cancel", post(cancel))
        .route("/:event_id/rsvp", post(upsert_rsvp))
        .route("/:event_id/rsvps", get(list_rsvps))
}
