//! Event entity model and DTOs.

use gather_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub starts_at: Timestamp,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for creating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Timestamp,
    pub user_id: DbId,
}
