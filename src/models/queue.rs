use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A pending submission in `events_queue`. Same shape as a published event
/// minus `status` (queued rows are implicitly pending) plus the submission
/// timestamp. The id is queue-local: promotion assigns a fresh id in
/// `events` and this one is dead afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueuedEvent {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub location: Option<String>,
    pub flags: Value,
}

/// Submission payload: a queued event minus the store-assigned fields.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQueuedEvent {
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(default = "default_flags")]
    pub flags: Value,
}

fn default_flags() -> Value {
    Value::Object(serde_json::Map::new())
}
