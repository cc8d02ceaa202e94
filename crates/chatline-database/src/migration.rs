//! Embedded chat schema.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use chatline_core::error::{AppError, ErrorKind};

/// Migrations under the workspace `migrations/` directory, compiled in.
static CHAT_SCHEMA: Migrator = sqlx::migrate!("../../migrations");

/// Apply whichever chat schema migrations the database has not seen yet.
pub async fn apply_chat_schema(pool: &PgPool) -> Result<(), AppError> {
    let latest = CHAT_SCHEMA.iter().map(|m| m.version).max().unwrap_or(0);
    info!(
        known = CHAT_SCHEMA.iter().count(),
        latest, "Applying chat schema"
    );

    CHAT_SCHEMA.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Chat schema migration failed: {e}"),
            e,
        )
    })?;

    info!(version = latest, "Chat schema up to date");
    Ok(())
}
