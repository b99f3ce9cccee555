use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A published calendar event. Rows are created either directly or by
/// promoting a queued submission; `flags` is an open-ended JSONB attribute
/// bag for extension data with no fixed schema.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    /// Absent means the event is unattributed.
    pub user_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub status: String,
    pub flags: Value,
}
