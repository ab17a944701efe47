use async_trait::async_trait;
use uuid::Uuid;

use crate::room_type::{NewRoomType, RoomType};

/// Repository trait for room type catalog access. Read-mostly; stock
/// counters are mutated only by the reservation store and the provider
/// adjustment path, never through this trait.
#[async_trait]
pub trait RoomTypeRepository: Send + Sync {
    async fn create_room_type(
        &self,
        room_type: &NewRoomType,
    ) -> Result<RoomType, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_room_type(
        &self,
        id: Uuid,
    ) -> Result<Option<RoomType>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_room_types(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<RoomType>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update_room_type(
        &self,
        id: Uuid,
        room_type: &NewRoomType,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
