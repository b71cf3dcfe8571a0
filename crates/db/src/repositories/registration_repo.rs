//! Repository for the `registrations` join table.

use gather_core::types::DbId;
use sqlx::PgPool;

/// Registers users for events and cancels registrations.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Register `user_id` for `event_id`.
    ///
    /// Returns `false` when the user was already registered; registering
    /// twice is not an error.
    pub async fn register(pool: &PgPool, event_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO registrations (event_id, user_id) \
             VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_registrations_event_user DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a registration. Returns `true` if one existed.
    pub async fn cancel(pool: &PgPool, event_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM registrations WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `user_id` is registered for `event_id`.
    pub async fn is_registered(
        pool: &PgPool,
        event_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM registrations WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
