use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use musafir_core::identity::Actor;
use musafir_core::{BookingError, BookingResult};
use uuid::Uuid;

use crate::audit::InventoryAuditEntry;
use crate::repository::{ReservationStore, SubmitReservation};
use crate::reservation::Reservation;
use crate::stay::{resolve_tour_stay, StayInterval, StayPlan, TourSpan};

/// Front door of the booking engine. Validates input and resolves stay
/// intervals, then delegates to the store, which owns the locking
/// protocol. The web layer talks only to this type.
pub struct BookingEngine {
    store: Arc<dyn ReservationStore>,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Non-authoritative preview for display. May be stale by the time
    /// the guest submits; the transaction re-checks under lock.
    pub async fn preview_availability(
        &self,
        room_type_id: Uuid,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> BookingResult<i32> {
        let stay = StayInterval::new(check_in, check_out)?;
        self.store.preview_availability(room_type_id, &stay).await
    }

    /// Direct hotel stay with explicit dates.
    pub async fn submit_reservation(
        &self,
        mut request: SubmitReservation,
    ) -> BookingResult<Reservation> {
        if request.quantity < 1 {
            return Err(BookingError::InvalidQuantity(request.quantity));
        }
        request.guests_count = request.guests_count.max(1);

        tracing::debug!(
            room_type_id = %request.room_type_id,
            quantity = request.quantity,
            nights = request.stay.nights(),
            "submitting reservation"
        );
        let reservation = self.store.submit_reservation(&request).await?;
        tracing::info!(
            reservation_id = %reservation.id,
            room_type_id = %reservation.room_type_id,
            "reservation confirmed"
        );
        Ok(reservation)
    }

    /// Tour-linked stay: dates come from the stored stay plan, or default
    /// to the tour's own span.
    pub async fn submit_tour_reservation(
        &self,
        tour: &TourSpan,
        plan: Option<&StayPlan>,
        room_type_id: Uuid,
        quantity: i32,
        guests_count: i32,
        actor: Actor,
        note: Option<String>,
    ) -> BookingResult<Reservation> {
        let stay = resolve_tour_stay(tour, plan)?;
        self.submit_reservation(SubmitReservation {
            room_type_id,
            stay,
            quantity,
            guests_count,
            actor,
            note,
        })
        .await
    }

    pub async fn get_reservation(&self, id: Uuid) -> BookingResult<Option<Reservation>> {
        self.store.get_reservation(id).await
    }

    pub async fn cancel_reservation(
        &self,
        reservation_id: Uuid,
        actor: Actor,
    ) -> BookingResult<Reservation> {
        let today = Utc::now().date_naive();
        let reservation = self
            .store
            .cancel_reservation(reservation_id, &actor, today)
            .await?;
        tracing::info!(reservation_id = %reservation.id, "reservation cancelled");
        Ok(reservation)
    }

    pub async fn complete_reservation(
        &self,
        reservation_id: Uuid,
        actor: Actor,
    ) -> BookingResult<Reservation> {
        let today = Utc::now().date_naive();
        self.store
            .complete_reservation(reservation_id, &actor, today)
            .await
    }

    /// Provider adjustment of the advertised counter.
    pub async fn adjust_inventory(
        &self,
        room_type_id: Uuid,
        new_available: i32,
        actor: Actor,
        note: Option<String>,
    ) -> BookingResult<InventoryAuditEntry> {
        let entry = self
            .store
            .adjust_inventory(room_type_id, new_available, &actor, note)
            .await?;
        tracing::info!(
            room_type_id = %room_type_id,
            old = entry.old_available,
            new = entry.new_available,
            "inventory adjusted"
        );
        Ok(entry)
    }
}
