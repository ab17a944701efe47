use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Immutable record of one change to a room type's advertised counter.
/// Created exactly once per stock-affecting transaction; never updated or
/// deleted. Providers read the ledger to reconcile disputes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryAuditEntry {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub changed_by: Uuid,
    pub old_available: i32,
    pub new_available: i32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InventoryAuditEntry {
    pub fn record(
        room_type_id: Uuid,
        changed_by: Uuid,
        old_available: i32,
        new_available: i32,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_type_id,
            changed_by,
            old_available,
            new_available,
            note,
            created_at: Utc::now(),
        }
    }

    pub fn delta(&self) -> i32 {
        self.new_available - self.old_available
    }
}
