use async_trait::async_trait;
use chrono::NaiveDate;
use musafir_core::identity::Actor;
use musafir_core::BookingResult;
use uuid::Uuid;

use crate::audit::InventoryAuditEntry;
use crate::reservation::Reservation;
use crate::stay::StayInterval;

/// A validated, ready-to-commit reservation request.
#[derive(Debug, Clone)]
pub struct SubmitReservation {
    pub room_type_id: Uuid,
    pub stay: StayInterval,
    pub quantity: i32,
    pub guests_count: i32,
    pub actor: Actor,
    pub note: Option<String>,
}

/// Storage contract for the reservation protocol.
///
/// `submit_reservation` must run as one unit of work: exclusive lock on
/// the room type's stock record, availability re-check inside the lock
/// scope, then commit or abort with no partial effect. A plain
/// read-then-write is not a conforming implementation.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Lock-free read for display; may be stale by submission time.
    async fn preview_availability(
        &self,
        room_type_id: Uuid,
        stay: &StayInterval,
    ) -> BookingResult<i32>;

    /// The only path that creates a confirmed reservation.
    async fn submit_reservation(&self, request: &SubmitReservation) -> BookingResult<Reservation>;

    async fn get_reservation(&self, id: Uuid) -> BookingResult<Option<Reservation>>;

    async fn cancel_reservation(
        &self,
        reservation_id: Uuid,
        actor: &Actor,
        today: NaiveDate,
    ) -> BookingResult<Reservation>;

    async fn complete_reservation(
        &self,
        reservation_id: Uuid,
        actor: &Actor,
        today: NaiveDate,
    ) -> BookingResult<Reservation>;

    /// Provider path: set the advertised counter (clamped to physical
    /// stock) and append one audit entry under the same lock.
    async fn adjust_inventory(
        &self,
        room_type_id: Uuid,
        new_available: i32,
        actor: &Actor,
        note: Option<String>,
    ) -> BookingResult<InventoryAuditEntry>;
}

/// Read side of the append-only inventory ledger. Writes happen only
/// inside stock-affecting transactions.
#[async_trait]
pub trait InventoryAuditLog: Send + Sync {
    async fn recent_for_room_type(
        &self,
        room_type_id: Uuid,
        limit: i64,
    ) -> BookingResult<Vec<InventoryAuditEntry>>;
}
