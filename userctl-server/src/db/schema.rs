//! Table definition for users
//!
//! Created if absent at startup. There is no migration history.

use sqlx::SqlitePool;

/// Create the users table if it does not exist yet
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    tracing::debug!("ensuring users table exists");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            name TEXT,
            surname TEXT,
            birthday TEXT,
            email TEXT,
            address TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
