//! PostgreSQL user store

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId};
use domain_account::{User, UserStore};

use crate::error::DatabaseError;

/// Row shape of the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::new(UserId::new(row.id), row.email, row.password_hash)
    }
}

/// `UserStore` backed by the `users` table
///
/// Email uniqueness is enforced by the table's unique index; a duplicate
/// insert surfaces as `PortError::Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PostgresUserStore {}

#[async_trait]
impl HealthCheckable for PostgresUserStore {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-user-store").await
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, password_hash))]
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, PortError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        debug!(user_id = row.id, "User inserted");
        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PortError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash FROM users WHERE id = $1",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(row.map(User::from))
    }
}
