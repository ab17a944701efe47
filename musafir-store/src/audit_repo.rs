use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use musafir_booking::audit::InventoryAuditEntry;
use musafir_booking::repository::InventoryAuditLog;
use musafir_core::{BookingError, BookingResult};

/// Read side of the inventory ledger. Entries are inserted only inside the
/// reservation/adjustment transactions; nothing here mutates.
pub struct StoreInventoryAuditLog {
    pool: PgPool,
}

impl StoreInventoryAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    room_type_id: Uuid,
    changed_by: Uuid,
    old_available: i32,
    new_available: i32,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for InventoryAuditEntry {
    fn from(row: AuditRow) -> Self {
        InventoryAuditEntry {
            id: row.id,
            room_type_id: row.room_type_id,
            changed_by: row.changed_by,
            old_available: row.old_available,
            new_available: row.new_available,
            note: row.note,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl InventoryAuditLog for StoreInventoryAuditLog {
    async fn recent_for_room_type(
        &self,
        room_type_id: Uuid,
        limit: i64,
    ) -> BookingResult<Vec<InventoryAuditEntry>> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT id, room_type_id, changed_by, old_available, new_available, note, created_at
            FROM room_inventory_logs
            WHERE room_type_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(room_type_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BookingError::TransactionFailed(e.to_string()))?;

        Ok(rows.into_iter().map(InventoryAuditEntry::from).collect())
    }
}
