use std::sync::Arc;

use crate::{
    auth::ExtractAuth,
    error::AppResult,
    models::EventRsvp,
    policy::{self, Action},
    store::{CheckInResult, Store},
};
use axum::{routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckInResponse {
    pub rsvp: EventRsvp,
    pub already_checked_in: bool,
    pub message: String,
}

impl From<CheckInResult> for CheckInResponse {
    fn from(result: CheckInResult) -> Self {
        let message = if result.already_checked_in {
            "attendee was already checked in".to_owned()
        } else {
            "check-in recorded".to_owned()
        };
        CheckInResponse {
            rsvp: result.rsvp,
            already_checked_in: result.already_checked_in,
            message,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanRequest {
    pub rsvp_number: String,
    pub event_id: i32,
}

async fn scan(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(req): Json<ScanRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<CheckInResponse>> {
    policy::require(claims.role, Action::CheckInAttendees)?;
    let result = store.check_in_by_code(&req.rsvp_number, req.event_id).await?;
    Ok(Json(result.into()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManualCheckInRequest {
    pub email: String,
    pub event_id: i32,
}

async fn manual_check_in(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(req): Json<ManualCheckInRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<CheckInResponse>> {
    policy::require(claims.role, Action::CheckInAttendees)?;
    let result = store.check_in_by_email(&req.email, req.event_id).await?;
    Ok(Json(result.into()))
}

pub fn app() -> Router {
    Router::new()
        .route("/scan", post(scan))
        .route("/manual-checkin", post(manual_check_in))
}
