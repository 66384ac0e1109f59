use std::sync::Arc;

use crate::{
    auth::ExtractAuth,
    conflict::Window,
    error::{AppError, AppResult},
    models::{Equipment, EquipmentBooking, MaintenanceStatus},
    policy::{self, Action},
    store::{NewEquipment, NewEquipmentBooking, Store},
};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

async fn list(
    Extension(store): Extension<Arc<dyn Store>>,
    ExtractAuth(_claims): ExtractAuth,
) -> AppResult<Json<Vec<Equipment>>> {
    Ok(Json(store.list_equipment().await?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEquipmentRequest {
    pub name: String,
    pub quantity: i32,
    pub available_quantity: Option<i32>,
}

async fn create(
    Extension(store): Extension<Arc<dyn Store>>,
    Json(req): Json<CreateEquipmentRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    policy::require(claims.role, Action::ManageInventory)?;
    if req.name.trim().is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    if req.quantity < 1 {
        return Err(AppError::validation("quantity must be positive"));
    }
    let available_quantity = req.available_quantity.unwrap_or(req.quantity);
    if available_quantity < 0 || available_quantity > req.quantity {
        return Err(AppError::validation(
            "availableQuantity must be between 0 and quantity",
        ));
    }
    let item = store
        .create_equipment(NewEquipment {
            name: req.name,
            quantity: req.quantity,
            available_quantity,
            maintenance_status: MaintenanceStatus::Good,
            created_by: claims.sub,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaintenanceRequest {
    pub maintenance_status: MaintenanceStatus,
    pub available_quantity: Option<i32>,
}

async fn set_maintenance(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(equipment_id): Path<i32>,
    Json(req): Json<MaintenanceRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<Json<Equipment>> {
    policy::require(claims.role, Action::ManageInventory)?;
    Ok(Json(
        store
            .update_equipment_status(equipment_id, req.maintenance_status, req.available_quantity)
            .await?,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookEquipmentRequest {
    pub event_id: Option<i32>,
    pub quantity: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

async fn book(
    Extension(store): Extension<Arc<dyn Store>>,
    Path(equipment_id): Path<i32>,
    Json(req): Json<BookEquipmentRequest>,
    ExtractAuth(claims): ExtractAuth,
) -> AppResult<(StatusCode, Json<EquipmentBooking>)> {
    policy::require(claims.role, Action::BookResources)?;
    let window = Window::new(req.start_time, req.end_time)?;
    let booking = store
        .book_equipment(NewEquipmentBooking {
            equipment_id,
            event_id: req.event_id,
            user_id: claims.sub,
            quantity: req.quantity,
            window,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub fn app() -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:equipment_id/maintenance", patch(set_maintenance))
        .route("/:equipment_id/book", post(book))
}
