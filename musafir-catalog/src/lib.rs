pub mod pricing;
pub mod repository;
pub mod room_type;

pub use repository::RoomTypeRepository;
pub use room_type::{CatalogError, NewRoomType, RoomType};
