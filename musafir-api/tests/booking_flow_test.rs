use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use musafir_api::{app, AppState};
use musafir_booking::{BookingEngine, InMemoryInventory};
use musafir_store::app_config::BookingRules;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> Router {
    let store = Arc::new(InMemoryInventory::new());
    let engine = Arc::new(BookingEngine::new(store.clone()));
    let (events_tx, _) = tokio::sync::broadcast::channel(16);

    app(AppState {
        engine,
        catalog: store.clone(),
        audit_log: store,
        events_tx,
        booking_rules: BookingRules { audit_log_limit: 20 },
    })
}

async fn request_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_room_type(app: &Router, total_rooms: i64) -> String {
    let (status, body) = request_json(
        app,
        "POST",
        "/v1/room-types",
        Some(json!({
            "property_id": Uuid::new_v4(),
            "name": "Deluxe Double",
            "max_guests": 3,
            "total_rooms": total_rooms,
            "available_rooms": total_rooms,
            "base_price": "4500.00",
            "tax_percent": "0.00",
            "refundable": true,
            "description": "Garden-facing room"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn reservation_body(room_type_id: &str, quantity: i64, check_in: &str, check_out: &str) -> Value {
    json!({
        "room_type_id": room_type_id,
        "check_in": check_in,
        "check_out": check_out,
        "quantity": quantity,
        "actor_id": Uuid::new_v4(),
    })
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = request_json(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_partial_overlap_booking_flow() {
    let app = test_app();
    let room_id = create_room_type(&app, 3).await;

    // Fresh room type: everything free.
    let uri = format!(
        "/v1/room-types/{room_id}/availability?check_in=2026-06-03&check_out=2026-06-06"
    );
    let (status, body) = request_json(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["free_rooms"], 3);
    assert_eq!(body["nights"], 3);

    // Existing booking: 2 rooms on [Jun 1, Jun 5).
    let (status, _) = request_json(
        &app,
        "POST",
        "/v1/reservations",
        Some(reservation_body(&room_id, 2, "2026-06-01", "2026-06-05")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // [Jun 3, Jun 6) overlaps it: one room free.
    let (_, body) = request_json(&app, "GET", &uri, None).await;
    assert_eq!(body["free_rooms"], 1);

    // Two rooms cannot be had.
    let (status, body) = request_json(
        &app,
        "POST",
        "/v1/reservations",
        Some(reservation_body(&room_id, 2, "2026-06-03", "2026-06-06")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Insufficient"));

    // One room can.
    let (status, body) = request_json(
        &app,
        "POST",
        "/v1/reservations",
        Some(reservation_body(&room_id, 1, "2026-06-03", "2026-06-06")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "confirmed");
    // 1 room x 3 nights at 4500.00
    assert_eq!(body["total_amount"], "13500.00");

    let (_, body) = request_json(&app, "GET", &uri, None).await;
    assert_eq!(body["free_rooms"], 0);
}

#[tokio::test]
async fn test_invalid_dates_rejected() {
    let app = test_app();
    let room_id = create_room_type(&app, 2).await;

    let (status, _) = request_json(
        &app,
        "POST",
        "/v1/reservations",
        Some(reservation_body(&room_id, 1, "2026-06-05", "2026-06-05")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request_json(
        &app,
        "POST",
        "/v1/reservations",
        Some(reservation_body(&room_id, 1, "garbage", "2026-06-05")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was created.
    let uri = format!(
        "/v1/room-types/{room_id}/availability?check_in=2026-06-01&check_out=2026-06-08"
    );
    let (_, body) = request_json(&app, "GET", &uri, None).await;
    assert_eq!(body["free_rooms"], 2);
}

#[tokio::test]
async fn test_cancellation_flow_frees_capacity() {
    let app = test_app();
    let room_id = create_room_type(&app, 1).await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/v1/reservations",
        Some(reservation_body(&room_id, 1, "2099-03-01", "2099-03-03")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let reservation_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = request_json(
        &app,
        "POST",
        "/v1/reservations",
        Some(reservation_body(&room_id, 1, "2099-03-01", "2099-03-03")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/v1/reservations/{reservation_id}/cancel"),
        Some(json!({ "actor_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    // A second cancel hits the terminal-state guard.
    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/v1/reservations/{reservation_id}/cancel"),
        Some(json!({ "actor_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The interval is bookable again.
    let (status, _) = request_json(
        &app,
        "POST",
        "/v1/reservations",
        Some(reservation_body(&room_id, 1, "2099-03-01", "2099-03-03")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_tour_reservation_resolves_stay() {
    let app = test_app();
    let room_id = create_room_type(&app, 2).await;

    let (status, body) = request_json(
        &app,
        "POST",
        "/v1/reservations/tour",
        Some(json!({
            "room_type_id": room_id,
            "tour_start": "2026-10-01",
            "tour_end": "2026-10-06",
            "quantity": 1,
            "actor_id": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["check_in"], "2026-10-01");
    // Checkout the morning after the final tour day.
    assert_eq!(body["check_out"], "2026-10-07");

    // A stay plan outside the tour span is rejected.
    let (status, _) = request_json(
        &app,
        "POST",
        "/v1/reservations/tour",
        Some(json!({
            "room_type_id": room_id,
            "tour_start": "2026-10-01",
            "tour_end": "2026-10-06",
            "stay_plan": { "check_in": "2026-09-28", "check_out": "2026-10-02" },
            "quantity": 1,
            "actor_id": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_provider_adjustment_and_ledger() {
    let app = test_app();
    let room_id = create_room_type(&app, 4).await;
    let provider = Uuid::new_v4();

    // Clamped to physical stock.
    let (status, body) = request_json(
        &app,
        "POST",
        &format!("/v1/room-types/{room_id}/inventory"),
        Some(json!({
            "new_available": 99,
            "actor_id": provider,
            "actor_role": "provider",
            "note": "season reopening"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["new_available"], 4);

    let (status, _) = request_json(
        &app,
        "POST",
        "/v1/reservations",
        Some(reservation_body(&room_id, 3, "2026-11-01", "2026-11-04")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request_json(
        &app,
        "GET",
        &format!("/v1/room-types/{room_id}/inventory-log"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    // Booking entry first (most recent), then the provider adjustment.
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["old_available"], 4);
    assert_eq!(entries[0]["new_available"], 1);
    assert_eq!(entries[1]["note"], "season reopening");

    // Unknown room type is a 404.
    let (status, _) = request_json(
        &app,
        "POST",
        &format!("/v1/room-types/{}/inventory", Uuid::new_v4()),
        Some(json!({ "new_available": 1, "actor_id": provider })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
