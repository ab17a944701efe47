use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use musafir_catalog::room_type::{CatalogError, NewRoomType, RoomType};
use musafir_catalog::RoomTypeRepository;

use crate::reservation_repo::RoomTypeRow;

pub struct StoreRoomTypeRepository {
    pool: PgPool,
}

impl StoreRoomTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, property_id, name, max_guests, total_rooms, available_rooms, \
     base_price, tax_percent, refundable, description, created_at, updated_at";

#[async_trait]
impl RoomTypeRepository for StoreRoomTypeRepository {
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

        sqlx::query(&format!(
            "INSERT INTO room_types ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(room.id)
        .bind(room.property_id)
        .bind(&room.name)
        .bind(room.max_guests)
        .bind(room.total_rooms)
        .bind(room.available_rooms)
        .bind(room.base_price)
        .bind(room.tax_percent)
        .bind(room.refundable)
        .bind(room.description.as_deref())
        .bind(room.created_at)
        .bind(room.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(room)
    }

    async fn get_room_type(
        &self,
        id: Uuid,
    ) -> Result<Option<RoomType>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<RoomTypeRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM room_types WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(RoomType::from))
    }

    async fn list_room_types(
        &self,
        property_id: Uuid,
    ) -> Result<Vec<RoomType>, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<RoomTypeRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM room_types WHERE property_id = $1 ORDER BY base_price ASC, id ASC"
        ))
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(RoomType::from).collect())
    }

    async fn update_room_type(
        &self,
        id: Uuid,
        room_type: &NewRoomType,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        room_type.validate()?;
        let spec = room_type.clone().normalized();

        let result = sqlx::query(
            r#"
            UPDATE room_types
            SET name = $1, max_guests = $2, total_rooms = $3, available_rooms = $4,
                base_price = $5, tax_percent = $6, refundable = $7, description = $8,
                updated_at = NOW()
            WHERE id = $9
            "#,
        )
        .bind(&spec.name)
        .bind(spec.max_guests)
        .bind(spec.total_rooms)
        .bind(spec.available_rooms)
        .bind(spec.base_price)
        .bind(spec.tax_percent)
        .bind(spec.refundable)
        .bind(spec.description.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(id.to_string()).into());
        }
        Ok(())
    }
}
