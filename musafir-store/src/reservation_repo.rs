use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use musafir_booking::audit::InventoryAuditEntry;
use musafir_booking::availability::free_units;
use musafir_booking::repository::{ReservationStore, SubmitReservation};
use musafir_booking::reservation::{Reservation, ReservationStatus};
use musafir_booking::stay::StayInterval;
use musafir_catalog::pricing;
use musafir_catalog::room_type::{clamp_available, RoomType};
use musafir_core::identity::Actor;
use musafir_core::{BookingError, BookingResult};

/// Reservation store backed by PostgreSQL row locks: `SELECT ... FOR
/// UPDATE` on the room-type stock record serializes concurrent bookings of
/// the same room type across every service instance sharing the database.
pub struct StoreReservationRepository {
    pool: PgPool,
}

impl StoreReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The reservation protocol inside a caller-owned transaction, so a
    /// parent write (e.g. the tour booking row) can commit atomically with
    /// the room reservation. Steps: lock the room-type stock record,
    /// re-check availability in the lock scope, insert the confirmed row,
    /// move the advertised counter and append one audit entry. The caller
    /// commits; any error here must abort the whole transaction.
    pub async fn submit_reservation_in_tx(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        request: &SubmitReservation,
    ) -> BookingResult<Reservation> {
        let room = lock_room_type(tx, request.room_type_id).await?;

        let overlap = overlapping_quantity(&mut **tx, request.room_type_id, &request.stay)
            .await
            .map_err(tx_failed)?;
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

        sqlx::query(&format!(
            "INSERT INTO reservations ({RESERVATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(reservation.id)
        .bind(reservation.room_type_id)
        .bind(reservation.property_id)
        .bind(reservation.guest_id)
        .bind(reservation.quantity)
        .bind(reservation.check_in)
        .bind(reservation.check_out)
        .bind(reservation.nights)
        .bind(reservation.guests_count)
        .bind(reservation.total_amount)
        .bind(reservation.status.as_str())
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(tx_failed)?;

        let note = request
            .note
            .clone()
            .or_else(|| Some(format!("Booked {} room(s)", request.quantity)));
        apply_counter_change(
            tx,
            &room,
            room.available_rooms - request.quantity,
            request.actor.id,
            note,
        )
        .await
        .map_err(tx_failed)?;

        Ok(reservation)
    }
}

fn tx_failed(err: sqlx::Error) -> BookingError {
    BookingError::TransactionFailed(err.to_string())
}

const ROOM_TYPE_COLUMNS: &str = "id, property_id, name, max_guests, total_rooms, \
     available_rooms, base_price, tax_percent, refundable, description, created_at, updated_at";

const RESERVATION_COLUMNS: &str = "id, room_type_id, property_id, guest_id, quantity, \
     check_in_date, check_out_date, nights, guests_count, total_amount, status, created_at, updated_at";

#[derive(sqlx::FromRow)]
pub(crate) struct RoomTypeRow {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub max_guests: i32,
    pub total_rooms: i32,
    pub available_rooms: i32,
    pub base_price: Decimal,
    pub tax_percent: Decimal,
    pub refundable: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RoomTypeRow> for RoomType {
    fn from(row: RoomTypeRow) -> Self {
        RoomType {
            id: row.id,
            property_id: row.property_id,
            name: row.name,
            max_guests: row.max_guests,
            total_rooms: row.total_rooms,
            available_rooms: row.available_rooms,
            base_price: row.base_price,
            tax_percent: row.tax_percent,
            refundable: row.refundable,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    room_type_id: Uuid,
    property_id: Uuid,
    guest_id: Uuid,
    quantity: i32,
    check_in_date: NaiveDate,
    check_out_date: NaiveDate,
    nights: i64,
    guests_count: i32,
    total_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ReservationRow {
    fn into_reservation(self) -> BookingResult<Reservation> {
        let status = self
            .status
            .parse::<ReservationStatus>()
            .map_err(BookingError::TransactionFailed)?;
        Ok(Reservation {
            id: self.id,
            room_type_id: self.room_type_id,
            property_id: self.property_id,
            guest_id: self.guest_id,
            quantity: self.quantity,
            check_in: self.check_in_date,
            check_out: self.check_out_date,
            nights: self.nights,
            guests_count: self.guests_count,
            total_amount: self.total_amount,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Confirmed quantities overlapping the stay, half-open on both ends.
/// Runs either on the pool (advisory preview) or inside a transaction
/// that holds the room-type row lock (authoritative re-check).
async fn overlapping_quantity<'e, E>(
    executor: E,
    room_type_id: Uuid,
    stay: &StayInterval,
) -> Result<i32, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(quantity), 0)
        FROM reservations
        WHERE room_type_id = $1
          AND status = 'confirmed'
          AND check_in_date < $2
          AND check_out_date > $3
        "#,
    )
    .bind(room_type_id)
    .bind(stay.check_out())
    .bind(stay.check_in())
    .fetch_one(executor)
    .await?;
    Ok(total as i32)
}

async fn insert_audit_entry<'e, E>(
    executor: E,
    entry: &InventoryAuditEntry,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO room_inventory_logs (id, room_type_id, changed_by, old_available, new_available, note, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(entry.id)
    .bind(entry.room_type_id)
    .bind(entry.changed_by)
    .bind(entry.old_available)
    .bind(entry.new_available)
    .bind(entry.note.as_deref())
    .bind(entry.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Move the advertised counter and write the matching ledger entry.
/// Callers must hold the room-type row lock in the same transaction.
async fn apply_counter_change(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    room: &RoomType,
    new_available: i32,
    changed_by: Uuid,
    note: Option<String>,
) -> Result<InventoryAuditEntry, sqlx::Error> {
    let new_available = clamp_available(new_available, room.total_rooms);
    sqlx::query("UPDATE room_types SET available_rooms = $1, updated_at = NOW() WHERE id = $2")
        .bind(new_available)
        .bind(room.id)
        .execute(&mut **tx)
        .await?;

    let entry = InventoryAuditEntry::record(
        room.id,
        changed_by,
        room.available_rooms,
        new_available,
        note,
    );
    insert_audit_entry(&mut **tx, &entry).await?;
    Ok(entry)
}

async fn lock_room_type(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    room_type_id: Uuid,
) -> BookingResult<RoomType> {
    let row: Option<RoomTypeRow> = sqlx::query_as(&format!(
        "SELECT {ROOM_TYPE_COLUMNS} FROM room_types WHERE id = $1 FOR UPDATE"
    ))
    .bind(room_type_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(tx_failed)?;
    row.map(RoomType::from)
        .ok_or(BookingError::RoomTypeNotFound(room_type_id))
}

async fn lock_reservation(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    reservation_id: Uuid,
) -> BookingResult<Reservation> {
    let row: Option<ReservationRow> = sqlx::query_as(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1 FOR UPDATE"
    ))
    .bind(reservation_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(tx_failed)?;
    row.ok_or(BookingError::ReservationNotFound(reservation_id))?
        .into_reservation()
}

async fn update_reservation_status(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    reservation: &Reservation,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE reservations SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(reservation.status.as_str())
        .bind(reservation.id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl ReservationStore for StoreReservationRepository {
    async fn preview_availability(
        &self,
        room_type_id: Uuid,
        stay: &StayInterval,
    ) -> BookingResult<i32> {
        let baseline: Option<i32> =
            sqlx::query_scalar("SELECT total_rooms FROM room_types WHERE id = $1")
                .bind(room_type_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(tx_failed)?;
        let baseline = baseline.ok_or(BookingError::RoomTypeNotFound(room_type_id))?;

        let overlap = overlapping_quantity(&self.pool, room_type_id, stay)
            .await
            .map_err(tx_failed)?;
        Ok(free_units(baseline, overlap))
    }

    async fn submit_reservation(&self, request: &SubmitReservation) -> BookingResult<Reservation> {
        let mut tx = self.pool.begin().await.map_err(tx_failed)?;

        // A concurrent submission for the same room type blocks on the
        // row lock inside until we commit or roll back.
        let reservation = match Self::submit_reservation_in_tx(&mut tx, request).await {
            Ok(reservation) => reservation,
            Err(err) => {
                tx.rollback().await.map_err(tx_failed)?;
                return Err(err);
            }
        };

        tx.commit().await.map_err(tx_failed)?;
        Ok(reservation)
    }

    async fn get_reservation(&self, id: Uuid) -> BookingResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(tx_failed)?;
        row.map(ReservationRow::into_reservation).transpose()
    }

    async fn cancel_reservation(
        &self,
        reservation_id: Uuid,
        actor: &Actor,
        today: NaiveDate,
    ) -> BookingResult<Reservation> {
        let mut tx = self.pool.begin().await.map_err(tx_failed)?;

        let mut reservation = lock_reservation(&mut tx, reservation_id).await?;
        let room = lock_room_type(&mut tx, reservation.room_type_id).await?;

        reservation.cancel(today)?;
        update_reservation_status(&mut tx, &reservation)
            .await
            .map_err(tx_failed)?;

        // Restore the advertised projection; live availability already
        // frees the capacity via the overlap query.
        apply_counter_change(
            &mut tx,
            &room,
            room.available_rooms + reservation.quantity,
            actor.id,
            Some(format!(
                "Reservation cancelled, {} room(s) released",
                reservation.quantity
            )),
        )
        .await
        .map_err(tx_failed)?;

        tx.commit().await.map_err(tx_failed)?;
        Ok(reservation)
    }

    async fn complete_reservation(
        &self,
        reservation_id: Uuid,
        _actor: &Actor,
        today: NaiveDate,
    ) -> BookingResult<Reservation> {
        let mut tx = self.pool.begin().await.map_err(tx_failed)?;

        let mut reservation = lock_reservation(&mut tx, reservation_id).await?;
        reservation.complete(today)?;
        update_reservation_status(&mut tx, &reservation)
            .await
            .map_err(tx_failed)?;

        tx.commit().await.map_err(tx_failed)?;
        Ok(reservation)
    }

    async fn adjust_inventory(
        &self,
        room_type_id: Uuid,
        new_available: i32,
        actor: &Actor,
        note: Option<String>,
    ) -> BookingResult<InventoryAuditEntry> {
        let mut tx = self.pool.begin().await.map_err(tx_failed)?;

        let room = lock_room_type(&mut tx, room_type_id).await?;
        let entry = apply_counter_change(&mut tx, &room, new_available, actor.id, note)
            .await
            .map_err(tx_failed)?;

        tx.commit().await.map_err(tx_failed)?;
        Ok(entry)
    }
}
