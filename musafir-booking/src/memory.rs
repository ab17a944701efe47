use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use musafir_catalog::pricing;
use musafir_catalog::room_type::{clamp_available, NewRoomType, RoomType};
use musafir_catalog::RoomTypeRepository;
use musafir_core::identity::Actor;
use musafir_core::{BookingError, BookingResult};
use uuid::Uuid;

use crate::audit::InventoryAuditEntry;
use crate::availability::{free_units, overlapping_quantity};
use crate::repository::{InventoryAuditLog, ReservationStore, SubmitReservation};
use crate::reservation::{Reservation, ReservationStatus};
use crate::stay::StayInterval;

/// In-process inventory store. A per-room-type async mutex stands in for
/// the database row lock, so transactions on the same room type are fully
/// serialized while different room types proceed concurrently. Backs
/// single-process deployments and the test suite.
pub struct InMemoryInventory {
    room_types: RwLock<HashMap<Uuid, RoomType>>,
    reservations: RwLock<HashMap<Uuid, Reservation>>,
    audit: RwLock<Vec<InventoryAuditEntry>>,
    row_locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self {
            room_types: RwLock::new(HashMap::new()),
            reservations: RwLock::new(HashMap::new()),
            audit: RwLock::new(Vec::new()),
            row_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The lock outlives the map guard so it can be held across awaits.
    fn row_lock(&self, room_type_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.row_locks.lock().unwrap();
        locks
            .entry(room_type_id)
            .or_insert_with(Default::default)
            .clone()
    }

    fn room_type(&self, id: Uuid) -> BookingResult<RoomType> {
        self.room_types
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(BookingError::RoomTypeNotFound(id))
    }

    fn confirmed_overlap(&self, room_type_id: Uuid, stay: &StayInterval) -> i32 {
        let reservations = self.reservations.read().unwrap();
        overlapping_quantity(reservations.values(), room_type_id, stay)
    }

    /// Move the advertised counter and write the matching ledger entry.
    /// Callers must hold the room's row lock.
    fn apply_counter_change(
        &self,
        room_type_id: Uuid,
        new_available: i32,
        changed_by: Uuid,
        note: Option<String>,
    ) -> BookingResult<InventoryAuditEntry> {
        let mut rooms = self.room_types.write().unwrap();
        let room = rooms
            .get_mut(&room_type_id)
            .ok_or(BookingError::RoomTypeNotFound(room_type_id))?;

        let old_available = room.available_rooms;
        room.available_rooms = clamp_available(new_available, room.total_rooms);
        room.updated_at = Utc::now();

        let entry = InventoryAuditEntry::record(
            room_type_id,
            changed_by,
            old_available,
            room.available_rooms,
            note,
        );
        self.audit.write().unwrap().push(entry.clone());
        Ok(entry)
    }
}

impl Default for InMemoryInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationStore for InMemoryInventory {
    async fn preview_availability(
        &self,
        room_type_id: Uuid,
        stay: &StayInterval,
    ) -> BookingResult<i32> {
        let room = self.room_type(room_type_id)?;
        let overlap = self.confirmed_overlap(room_type_id, stay);
        Ok(free_units(room.total_rooms, overlap))
    }

    async fn submit_reservation(&self, request: &SubmitReservation) -> BookingResult<Reservation> {
        let lock = self.row_lock(request.room_type_id);
        let _row = lock.lock().await;

        // Authoritative re-check inside the lock scope, against physical
        // stock; the advertised counter is only a projection.
        let room = self.room_type(request.room_type_id)?;
        let overlap = self.confirmed_overlap(request.room_type_id, &request.stay);
        let available = free_units(room.total_rooms, overlap);
        if request.quantity > available {
            return Err(BookingError::InsufficientAvailability {
                requested: request.quantity,
                available,
            });
        }

        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            room_type_id: room.id,
            property_id: room.property_id,
            guest_id: request.actor.id,
            quantity: request.quantity,
            check_in: request.stay.check_in(),
            check_out: request.stay.check_out(),
            nights: request.stay.nights(),
            guests_count: request.guests_count,
            total_amount: pricing::quote(&room, request.quantity, request.stay.nights()),
            status: ReservationStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };

        self.reservations
            .write()
            .unwrap()
            .insert(reservation.id, reservation.clone());
        let note = request
            .note
            .clone()
            .or_else(|| Some(format!("Booked {} room(s)", request.quantity)));
        self.apply_counter_change(
            room.id,
            room.available_rooms - request.quantity,
            request.actor.id,
            note,
        )?;

        Ok(reservation)
    }

    async fn get_reservation(&self, id: Uuid) -> BookingResult<Option<Reservation>> {
        Ok(self.reservations.read().unwrap().get(&id).cloned())
    }

    async fn cancel_reservation(
        &self,
        reservation_id: Uuid,
        actor: &Actor,
        today: NaiveDate,
    ) -> BookingResult<Reservation> {
        let existing = self
            .get_reservation(reservation_id)
            .await?
            .ok_or(BookingError::ReservationNotFound(reservation_id))?;

        let lock = self.row_lock(existing.room_type_id);
        let _row = lock.lock().await;

        let mut reservation = self
            .get_reservation(reservation_id)
            .await?
            .ok_or(BookingError::ReservationNotFound(reservation_id))?;
        reservation.cancel(today)?;
        self.reservations
            .write()
            .unwrap()
            .insert(reservation.id, reservation.clone());

        // Restore the advertised projection; live availability already
        // frees the capacity via the overlap query.
        let room = self.room_type(reservation.room_type_id)?;
        self.apply_counter_change(
            room.id,
            room.available_rooms + reservation.quantity,
            actor.id,
            Some(format!("Reservation cancelled, {} room(s) released", reservation.quantity)),
        )?;

        Ok(reservation)
    }

    async fn complete_reservation(
        &self,
        reservation_id: Uuid,
        _actor: &Actor,
        today: NaiveDate,
    ) -> BookingResult<Reservation> {
        let mut reservations = self.reservations.write().unwrap();
        let reservation = reservations
            .get_mut(&reservation_id)
            .ok_or(BookingError::ReservationNotFound(reservation_id))?;
        reservation.complete(today)?;
        Ok(reservation.clone())
    }

    async fn adjust_inventory(
        &self,
        room_type_id: Uuid,
        new_available: i32,
        actor: &Actor,
        note: Option<String>,
    ) -> BookingResult<InventoryAuditEntry> {
        let lock = self.row_lock(room_type_id);
        let _row = lock.lock().await;

        self.apply_counter_change(room_type_id, new_available, actor.id, note)
    }
}

#[async_trait]
impl InventoryAuditLog for InMemoryInventory {
    async fn recent_for_room_type(
        &self,
        room_type_id: Uuid,
        limit: i64,
    ) -> BookingResult<Vec<InventoryAuditEntry>> {
        let audit = self.audit.read().unwrap();
        Ok(audit
            .iter()
            .rev()
            .filter(|e| e.room_type_id == room_type_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoomTypeRepository for InMemoryInventory {
    async fn create_room_type(
        &self,
        room_type: &NewRoomType,
    ) -> Result<RoomType, Box<dyn std::error::Error + Send + Sync>> {
        room_type.validate()?;
        let spec = room_type.clone().normalized();
        let now = Utc::now();
        let room = RoomType {
            id: Uuid::new_v4(),
            property_id: spec.property_id,
            name: spec.name,
            max_guests: spec.max_guests,
            total_rooms: spec.total_rooms,
            available_rooms: spec.available_rooms,
            base_price: spec.base_price,
            tax_percent: spec.tax_percent,
            refundable: spec.refundable,
            description: spec.description,
            created_at: now,
            updated_at: now,
        };
        self.room_types
            .write()
            .unwrap()
            .insert(room.id, room.clone());
        Ok(room)
    }

    async fn get_room_type(
        &self,
        id: Uuid,
    ) -> Result<Option<RoomType>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.room_types.read().unwrap().get(&id).cloned())
    }

    async fn list_room_types(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<RoomType>, Box<dyn std::error::Error + Send + Sync>> {
        let mut rooms: Vec<RoomType> = self
            .room_types
            .read()
            .unwrap()
            .values()
            .filter(|r| r.property_id == property_id)
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.base_price.cmp(&b.base_price));
        Ok(rooms)
    }

    async fn update_room_type(
        &self,
        id: Uuid,
        room_type: &NewRoomType,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        room_type.validate()?;
        let spec = room_type.clone().normalized();
        let mut rooms = self.room_types.write().unwrap();
        let room = rooms
            .get_mut(&id)
            .ok_or(BookingError::RoomTypeNotFound(id))?;
        room.name = spec.name;
        room.max_guests = spec.max_guests;
        room.total_rooms = spec.total_rooms;
        room.available_rooms = spec.available_rooms;
        room.base_price = spec.base_price;
        room.tax_percent = spec.tax_percent;
        room.refundable = spec.refundable;
        room.description = spec.description;
        room.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn actor() -> Actor {
        Actor::new(Uuid::new_v4(), musafir_core::identity::ActorRole::Customer)
    }

    async fn seed(store: &InMemoryInventory, total: i32) -> RoomType {
        store
            .create_room_type(&NewRoomType {
                property_id: Uuid::new_v4(),
                name: "Standard Twin".to_string(),
                max_guests: 2,
                total_rooms: total,
                available_rooms: total,
                base_price: Decimal::new(250000, 2),
                tax_percent: Decimal::ZERO,
                refundable: false,
                description: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_booking_decrements_counter_and_logs() {
        let store = InMemoryInventory::new();
        let room = seed(&store, 5).await;
        let who = actor();

        let stay = StayInterval::new(date(2026, 4, 1), date(2026, 4, 3)).unwrap();
        let reservation = store
            .submit_reservation(&SubmitReservation {
                room_type_id: room.id,
                stay,
                quantity: 2,
                guests_count: 4,
                actor: who,
                note: None,
            })
            .await
            .unwrap();

        assert_eq!(reservation.status, ReservationStatus::Confirmed);
        assert_eq!(reservation.nights, 2);
        // 2 rooms x 2 nights at 2500.00
        assert_eq!(reservation.total_amount, Decimal::new(1000000, 2));

        let refreshed = store.get_room_type(room.id).await.unwrap().unwrap();
        assert_eq!(refreshed.available_rooms, 3);

        let log = store.recent_for_room_type(room.id, 20).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].old_available, 5);
        assert_eq!(log[0].new_available, 3);
        assert_eq!(log[0].changed_by, who.id);
    }

    #[tokio::test]
    async fn test_cancellation_restores_counter() {
        let store = InMemoryInventory::new();
        let room = seed(&store, 1).await;
        let who = actor();

        let stay = StayInterval::new(date(2026, 3, 1), date(2026, 3, 3)).unwrap();
        let reservation = store
            .submit_reservation(&SubmitReservation {
                room_type_id: room.id,
                stay,
                quantity: 1,
                guests_count: 1,
                actor: who,
                note: None,
            })
            .await
            .unwrap();

        store
            .cancel_reservation(reservation.id, &who, date(2026, 2, 20))
            .await
            .unwrap();

        let refreshed = store.get_room_type(room.id).await.unwrap().unwrap();
        assert_eq!(refreshed.available_rooms, 1);
        assert_eq!(store.recent_for_room_type(room.id, 20).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_adjust_inventory_clamps_to_stock() {
        let store = InMemoryInventory::new();
        let room = seed(&store, 4).await;
        let provider = actor();

        let entry = store
            .adjust_inventory(room.id, 99, &provider, Some("restock".to_string()))
            .await
            .unwrap();
        assert_eq!(entry.new_available, 4);

        let entry = store.adjust_inventory(room.id, -2, &provider, None).await.unwrap();
        assert_eq!(entry.new_available, 0);
    }

    #[tokio::test]
    async fn test_unknown_room_type() {
        let store = InMemoryInventory::new();
        let stay = StayInterval::new(date(2026, 3, 1), date(2026, 3, 2)).unwrap();
        let err = store
            .preview_availability(Uuid::new_v4(), &stay)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::RoomTypeNotFound(_)));
    }
}
