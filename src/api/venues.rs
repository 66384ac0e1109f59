use std::sync::Arc;

use crate::{
    auth::ExtractAuth,
    availability::VenueAvailability,
    conflict::Window,
    error::{AppError, AppResult},
    models::{Venue, VenueBooking},
    policy::{self, Action},
    store::{NewVenue, NewVenueBooking, Store},
};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

async fn list(
    Extension(store): Extension<Arc<dyn Store>>,
    ExtractAuth(_claims): ExtractAuth,
) -> AppResult<Json<Vec<Venue>>> {
    Ok(Json(store.list_venues().await?))
}

#[derive(Deserialize)]
struct CreateVenueRequest {
    pub name: String,
    pub capacity: i32,
    pub location: Option<String>,
}

async fn create(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(req): Json<CreateVenueRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<(StatusCode, Json<Venue>)> {
    policy::require(claims.role, Action::ManageInventory)?;
    if req.name.trim().is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    if req.capacity < 1 {
        return Err(AppError::validation("capacity must be positive"));
    }
    let venue = store
        .create_venue(NewVenue {
            name: req.name,
            capacity: req.capacity,
            location: req.location,
            created_by: claims.sub,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(venue)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityUpdateRequest {
    pub is_available: bool,
}

async fn set_availability(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(venue_id): Path<i32>,
    Json(req): Json<AvailabilityUpdateRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<Venue>> {
    policy::require(claims.role, Action::ManageInventory)?;
    Ok(Json(
        store.set_venue_availability(venue_id, req.is_available).await?,
    ))
}

#[derive(Deserialize)]
struct AvailabilityQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

async fn availability(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(venue_id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
    ExtractAuth(_claims): ExtractAuth,
) -> AppResult<Json<VenueAvailability>> {
    let window = Window::new(query.start, query.end)?;
    Ok(Json(store.venue_availability(venue_id, window).await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookVenueRequest {
    pub event_id: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notes: Option<String>,
}

async fn book(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(venue_id): Path<i32>,
    Json(req): Json<BookVenueRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<(StatusCode, Json<VenueBooking>)> {
    policy::require(claims.role, Action::BookResources)?;
    let window = Window::new(req.start_time, req.end_time)?;
    let booking = store
        .book_venue(NewVenueBooking {
            venue_id,
            event_id: req.event_id,
            user_id: claims.sub,
            window,
            notes: req.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:venue_id/availability", get(availability).patch(set_availability))
        .route("/:venue_id/book", post(book))
}
