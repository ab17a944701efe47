use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use musafir_booking::reservation::Reservation;
use musafir_booking::stay::{parse_calendar_date, StayInterval, StayPlan, TourSpan};
use musafir_booking::SubmitReservation;
use musafir_core::identity::{Actor, ActorRole};
use musafir_core::BookingError;
use musafir_shared::events::{
    InventoryEvent, ReservationCancelledEvent, ReservationConfirmedEvent,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/room-types/{id}/availability", get(preview_availability))
        .route("/v1/reservations", post(create_reservation))
        .route("/v1/reservations/tour", post(create_tour_reservation))
        .route("/v1/reservations/{id}", get(get_reservation))
        .route("/v1/reservations/{id}/cancel", post(cancel_reservation))
        .route("/v1/reservations/{id}/complete", post(complete_reservation))
}

pub(crate) fn actor_from(actor_id: Uuid, role: Option<&str>) -> Actor {
    Actor::new(actor_id, ActorRole::normalize(role.unwrap_or("customer")))
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    check_in: String,
    check_out: String,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    room_type_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    nights: i64,
    free_rooms: i32,
}

/// Non-authoritative preview for display; the submission path re-checks
/// under the row lock.
async fn preview_availability(
    State(state): State<AppState>,
    Path(room_type_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let stay = StayInterval::parse(&query.check_in, &query.check_out)?;
    let free_rooms = state
        .engine
        .preview_availability(room_type_id, stay.check_in(), stay.check_out())
        .await?;

    Ok(Json(AvailabilityResponse {
        room_type_id,
        check_in: stay.check_in(),
        check_out: stay.check_out(),
        nights: stay.nights(),
        free_rooms,
    }))
}

#[derive(Debug, Deserialize)]
struct CreateReservationRequest {
    room_type_id: Uuid,
    check_in: String,
    check_out: String,
    quantity: i32,
    #[serde(default)]
    guests_count: Option<i32>,
    actor_id: Uuid,
    #[serde(default)]
    actor_role: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let stay = StayInterval::parse(&req.check_in, &req.check_out)?;
    let actor = actor_from(req.actor_id, req.actor_role.as_deref());

    let reservation = state
        .engine
        .submit_reservation(SubmitReservation {
            room_type_id: req.room_type_id,
            stay,
            quantity: req.quantity,
            guests_count: req.guests_count.unwrap_or(req.quantity),
            actor,
            note: req.note,
        })
        .await?;

    publish_confirmed(&state, &reservation);
    Ok((StatusCode::CREATED, Json(reservation)))
}

#[derive(Debug, Deserialize)]
struct StayPlanBody {
    check_in: String,
    check_out: String,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateTourReservationRequest {
    room_type_id: Uuid,
    tour_start: String,
    #[serde(default)]
    tour_end: Option<String>,
    #[serde(default)]
    stay_plan: Option<StayPlanBody>,
    quantity: i32,
    #[serde(default)]
    guests_count: Option<i32>,
    actor_id: Uuid,
    #[serde(default)]
    actor_role: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

/// Tour-linked stay: dates derive from the stored stay plan, or from the
/// tour's own span when no plan exists.
async fn create_tour_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateTourReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let tour = TourSpan {
        start_date: parse_calendar_date(&req.tour_start)?,
        end_date: req
            .tour_end
            .as_deref()
            .map(parse_calendar_date)
            .transpose()?,
    };
    let plan = req
        .stay_plan
        .map(|body| -> Result<StayPlan, BookingError> {
            Ok(StayPlan {
                check_in: parse_calendar_date(&body.check_in)?,
                check_out: parse_calendar_date(&body.check_out)?,
                notes: body.notes,
            })
        })
        .transpose()?;
    let actor = actor_from(req.actor_id, req.actor_role.as_deref());

    let reservation = state
        .engine
        .submit_tour_reservation(
            &tour,
            plan.as_ref(),
            req.room_type_id,
            req.quantity,
            req.guests_count.unwrap_or(req.quantity),
            actor,
            req.note,
        )
        .await?;

    publish_confirmed(&state, &reservation);
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state
        .engine
        .get_reservation(id)
        .await?
        .ok_or(BookingError::ReservationNotFound(id))?;
    Ok(Json(reservation))
}

#[derive(Debug, Deserialize)]
struct StatusTransitionRequest {
    actor_id: Uuid,
    #[serde(default)]
    actor_role: Option<String>,
}

async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusTransitionRequest>,
) -> Result<Json<Reservation>, AppError> {
    let actor = actor_from(req.actor_id, req.actor_role.as_deref());
    let reservation = state.engine.cancel_reservation(id, actor).await?;

    let _ = state.events_tx.send(InventoryEvent::ReservationCancelled(
        ReservationCancelledEvent {
            reservation_id: reservation.id,
            room_type_id: reservation.room_type_id,
            quantity: reservation.quantity,
            check_in: reservation.check_in,
            check_out: reservation.check_out,
            cancelled_at: Utc::now().timestamp(),
        },
    ));
    Ok(Json(reservation))
}

async fn complete_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusTransitionRequest>,
) -> Result<Json<Reservation>, AppError> {
    let actor = actor_from(req.actor_id, req.actor_role.as_deref());
    let reservation = state.engine.complete_reservation(id, actor).await?;
    Ok(Json(reservation))
}

fn publish_confirmed(state: &AppState, reservation: &Reservation) {
    let _ = state.events_tx.send(InventoryEvent::ReservationConfirmed(
        ReservationConfirmedEvent {
            reservation_id: reservation.id,
            room_type_id: reservation.room_type_id,
            property_id: reservation.property_id,
            quantity: reservation.quantity,
            check_in: reservation.check_in,
            check_out: reservation.check_out,
            confirmed_at: Utc::now().timestamp(),
        },
    ));
}
