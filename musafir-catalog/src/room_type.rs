use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable unit class within a property (e.g. "Deluxe Double").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomType {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub max_guests: i32,
    /// Physical stock. Changes only through explicit provider action,
    /// never through booking.
    pub total_rooms: i32,
    /// Advertised available count. A denormalized projection kept in step
    /// by the reservation transaction and provider adjustments; the live
    /// overlap query remains authoritative for the booking invariant.
    pub available_rooms: i32,
    /// Nightly base price.
    pub base_price: Decimal,
    pub tax_percent: Decimal,
    pub refundable: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Provider input for creating or replacing a room type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoomType {
    pub property_id: Uuid,
    pub name: String,
    pub max_guests: i32,
    pub total_rooms: i32,
    pub available_rooms: i32,
    pub base_price: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
    #[serde(default)]
    pub refundable: bool,
    pub description: Option<String>,
}

impl NewRoomType {
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidRoomType(
                "room type name is required".to_string(),
            ));
        }
        if self.base_price < Decimal::ZERO {
            return Err(CatalogError::InvalidRoomType(
                "base price must not be negative".to_string(),
            ));
        }
        if self.tax_percent < Decimal::ZERO {
            return Err(CatalogError::InvalidRoomType(
                "tax percent must not be negative".to_string(),
            ));
        }
        if self.max_guests < 1 {
            return Err(CatalogError::InvalidRoomType(
                "max guests must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamp the stock counters into a consistent state: stock is never
    /// negative and the advertised count never exceeds it.
    pub fn normalized(mut self) -> Self {
        self.total_rooms = self.total_rooms.max(0);
        self.available_rooms = clamp_available(self.available_rooms, self.total_rooms);
        self
    }
}

/// Advertised counts live in `[0, total_rooms]`.
pub fn clamp_available(requested: i32, total_rooms: i32) -> i32 {
    requested.max(0).min(total_rooms.max(0))
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Room type not found: {0}")]
    NotFound(String),

    #[error("Invalid room type: {0}")]
    InvalidRoomType(String),
}
