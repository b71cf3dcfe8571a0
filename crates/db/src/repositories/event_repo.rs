//! Repository for the `events` table.

use gather_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event};

/// Column list for `events` queries.
const COLUMNS: &str = "id, name, description, location, starts_at, user_id, created_at";

/// Provides create and lookup for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert an event, returning the full row.
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (name, description, location, starts_at, user_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.name)
            .bind(input.description.as_deref().unwrap_or_default())
            .bind(input.location.as_deref().unwrap_or_default())
            .bind(input.starts_at)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// Find an event by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
