use std::sync::Arc;

use musafir_booking::{BookingEngine, InventoryAuditLog};
use musafir_catalog::RoomTypeRepository;
use musafir_shared::events::InventoryEvent;
use musafir_store::app_config::BookingRules;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
    pub catalog: Arc<dyn RoomTypeRepository>,
    pub audit_log: Arc<dyn InventoryAuditLog>,
    pub events_tx: broadcast::Sender<InventoryEvent>,
    pub booking_rules: BookingRules,
}
