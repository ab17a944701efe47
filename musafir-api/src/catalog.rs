use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use musafir_booking::audit::InventoryAuditEntry;
use musafir_booking::InventoryAuditLog;
use musafir_catalog::room_type::{NewRoomType, RoomType};
use musafir_catalog::RoomTypeRepository;
use musafir_core::BookingError;
use musafir_shared::events::{InventoryAdjustedEvent, InventoryEvent};
use serde::Deserialize;
use uuid::Uuid;

use crate::bookings::actor_from;
use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/room-types", post(create_room_type))
        .route("/v1/room-types/{id}", get(get_room_type).put(update_room_type))
        .route("/v1/properties/{id}/room-types", get(list_room_types))
        .route("/v1/room-types/{id}/inventory", post(adjust_inventory))
        .route("/v1/room-types/{id}/inventory-log", get(inventory_log))
}

async fn create_room_type(
    State(state): State<AppState>,
    Json(req): Json<NewRoomType>,
) -> Result<(StatusCode, Json<RoomType>), AppError> {
    let room = state
        .catalog
        .create_room_type(&req)
        .await
        .map_err(AppError::from_storage)?;
    Ok((StatusCode::CREATED, Json(room)))
}

async fn get_room_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomType>, AppError> {
    let room = state
        .catalog
        .get_room_type(id)
        .await
        .map_err(AppError::from_storage)?
        .ok_or(BookingError::RoomTypeNotFound(id))?;
    Ok(Json(room))
}

async fn list_room_types(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<RoomType>>, AppError> {
    let rooms = state
        .catalog
        .list_room_types(property_id)
        .await
        .map_err(AppError::from_storage)?;
    Ok(Json(rooms))
}

async fn update_room_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NewRoomType>,
) -> Result<StatusCode, AppError> {
    state
        .catalog
        .update_room_type(id, &req)
        .await
        .map_err(AppError::from_storage)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct AdjustInventoryRequest {
    new_available: i32,
    actor_id: Uuid,
    #[serde(default)]
    actor_role: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

/// Provider adjustment of the advertised counter. Clamped to physical
/// stock and always audited.
async fn adjust_inventory(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdjustInventoryRequest>,
) -> Result<Json<InventoryAuditEntry>, AppError> {
    let actor = actor_from(req.actor_id, req.actor_role.as_deref());
    let entry = state
        .engine
        .adjust_inventory(id, req.new_available, actor, req.note)
        .await?;

    let _ = state
        .events_tx
        .send(InventoryEvent::InventoryAdjusted(InventoryAdjustedEvent {
            room_type_id: entry.room_type_id,
            old_available: entry.old_available,
            new_available: entry.new_available,
            adjusted_at: Utc::now().timestamp(),
        }));
    Ok(Json(entry))
}

async fn inventory_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<InventoryAuditEntry>>, AppError> {
    let entries = state
        .audit_log
        .recent_for_room_type(id, state.booking_rules.audit_log_limit)
        .await?;
    Ok(Json(entries))
}
