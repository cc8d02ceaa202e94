//! Room and membership repository implementation.

use sqlx::PgPool;

use chatline_core::error::{AppError, ErrorKind};
use chatline_core::result::AppResult;
use chatline_core::types::RoomId;
use chatline_entity::{Room, User};

/// Repository for rooms and their members.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    /// Create a new room repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a room by primary key.
    pub async fn find_by_id(&self, id: RoomId) -> AppResult<Option<Room>> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find room by id", e))
    }

    /// Members of a room in join order.
    pub async fn find_members(&self, room_id: RoomId) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN room_members rm ON rm.user_id = u.id \
             WHERE rm.room_id = $1 \
             ORDER BY rm.joined_at ASC, u.id ASC",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list room members", e))
    }
}
