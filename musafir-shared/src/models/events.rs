use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationConfirmedEvent {
    pub reservation_id: Uuid,
    pub room_type_id: Uuid,
    pub property_id: Uuid,
    pub quantity: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub confirmed_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationCancelledEvent {
    pub reservation_id: Uuid,
    pub room_type_id: Uuid,
    pub quantity: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub cancelled_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct InventoryAdjustedEvent {
    pub room_type_id: Uuid,
    pub old_available: i32,
    pub new_available: i32,
    pub adjusted_at: i64,
}

/// Union streamed to clients watching a room type.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryEvent {
    ReservationConfirmed(ReservationConfirmedEvent),
    ReservationCancelled(ReservationCancelledEvent),
    InventoryAdjusted(InventoryAdjustedEvent),
}

impl InventoryEvent {
    pub fn room_type_id(&self) -> Uuid {
        match self {
            InventoryEvent::ReservationConfirmed(e) => e.room_type_id,
            InventoryEvent::ReservationCancelled(e) => e.room_type_id,
            InventoryEvent::InventoryAdjusted(e) => e.room_type_id,
        }
    }
}
