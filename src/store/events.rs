use sqlx::PgPool;

use super::filter::{build_list, ListFilter};
use super::SqlValue;
use crate::models::event::Event;
use crate::utils::error::AppError;

const EVENT_COLUMNS: &str =
    "id, user_id, title, description, start_date, end_date, location, status, flags";

/// Read access to the published `events` table. Mutation goes through the
/// patch engine; publication itself is owned by the queue store.
#[derive(Clone)]
pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<Event>, AppError> {
        let query = build_list("events", EVENT_COLUMNS, filter, true);

        let mut q = sqlx::query_as::<_, Event>(&query.sql);
        for value in query.binds {
            q = match value {
                SqlValue::Text(v) => q.bind(v),
                SqlValue::BigInt(v) => q.bind(v),
                SqlValue::Timestamp(v) => q.bind(v),
                SqlValue::Json(v) => q.bind(v),
            };
        }

        let events = q.fetch_all(&self.pool).await?;
        Ok(events)
    }
}
