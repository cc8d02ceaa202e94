//! Message repository implementation.

use sqlx::PgPool;

use chatline_core::error::{AppError, ErrorKind};
use chatline_core::result::AppResult;
use chatline_core::types::MessageId;
use chatline_entity::Message;

/// Repository for message lookups.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a message by primary key.
    pub async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find message by id", e)
            })
    }
}
