//! User repository
//!
//! Every operation is a single statement:
//! - insert: INSERT, id from last_insert_rowid
//! - update/delete: affecting zero rows is a no-op, not an error

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

use crate::models::{UserFields, UserRecord};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence boundary for users (injected into handlers)
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Append a row and return the store-assigned id.
    async fn insert(&self, fields: &UserFields) -> Result<i64, DbError>;

    /// Every row, ordered by id.
    async fn select_all(&self) -> Result<Vec<UserRecord>, DbError>;

    /// The row with `id`, or `None`.
    async fn select_one(&self, id: i64) -> Result<Option<UserRecord>, DbError>;

    /// Overwrite all non-id columns. Returns rows affected.
    async fn update(&self, id: i64, fields: &UserFields) -> Result<u64, DbError>;

    /// Remove the row. Returns rows affected.
    async fn delete(&self, id: i64) -> Result<u64, DbError>;

    /// Cheap reachability check for health reporting.
    async fn ping(&self) -> Result<(), DbError>;
}

/// User row from database
#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    surname: String,
    birthday: String,
    email: String,
    address: String,
}

impl From<UserRow> for UserRecord {
    fn from(r: UserRow) -> Self {
        UserRecord::new(
            r.id,
            UserFields::from_stored(r.name, r.surname, r.birthday, r.email, r.address),
        )
    }
}

/// SQLite-backed user store
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn insert(&self, fields: &UserFields) -> Result<i64, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, surname, birthday, email, address)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(fields.name())
        .bind(fields.surname())
        .bind(fields.birthday())
        .bind(fields.email())
        .bind(fields.address())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn select_all(&self) -> Result<Vec<UserRecord>, DbError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, surname, birthday, email, address
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn select_one(&self, id: i64) -> Result<Option<UserRecord>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, surname, birthday, email, address
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRecord::from))
    }

    async fn update(&self, id: i64, fields: &UserFields) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = ?1, surname = ?2, birthday = ?3, email = ?4, address = ?5
            WHERE id = ?6
            "#,
        )
        .bind(fields.name())
        .bind(fields.surname())
        .bind(fields.birthday())
        .bind(fields.email())
        .bind(fields.address())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
