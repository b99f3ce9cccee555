pub mod events;
pub mod filter;
pub mod patch;
pub mod queue;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A coerced bind parameter for a dynamically built statement. Carrying the
/// parameters as a typed list keeps their positions aligned with the
/// generated placeholders; identifiers never travel through here.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    BigInt(Option<i64>),
    Timestamp(Option<DateTime<Utc>>),
    Json(Value),
}
