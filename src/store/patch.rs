use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;

use super::SqlValue;
use crate::utils::error::AppError;

/// Value shape a writable column accepts. Incoming JSON is coerced here,
/// before any SQL text exists, so a type mismatch never reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    BigInt,
    Timestamp,
    Json,
}

/// An updatable table: its name and the columns a PATCH may touch.
///
/// Column names used as SQL identifiers come exclusively from these
/// constants. Identifiers cannot be parameter-bound, so this allow-list is
/// the injection boundary for the whole update path. `id` and `created_at`
/// are store-assigned and never writable.
pub struct TableSpec {
    pub table: &'static str,
    pub writable: &'static [(&'static str, ColumnKind)],
}

pub const EVENTS: TableSpec = TableSpec {
    table: "events",
    writable: &[
        ("user_id", ColumnKind::BigInt),
        ("title", ColumnKind::Text),
        ("description", ColumnKind::Text),
        ("start_date", ColumnKind::Timestamp),
        ("end_date", ColumnKind::Timestamp),
        ("location", ColumnKind::Text),
        ("status", ColumnKind::Text),
        ("flags", ColumnKind::Json),
    ],
};

pub const EVENTS_QUEUE: TableSpec = TableSpec {
    table: "events_queue",
    writable: &[
        ("user_id", ColumnKind::BigInt),
        ("title", ColumnKind::Text),
        ("description", ColumnKind::Text),
        ("start_date", ColumnKind::Timestamp),
        ("end_date", ColumnKind::Timestamp),
        ("location", ColumnKind::Text),
        ("flags", ColumnKind::Json),
    ],
};

pub const USERS: TableSpec = TableSpec {
    table: "users",
    writable: &[
        ("first_name", ColumnKind::Text),
        ("last_name", ColumnKind::Text),
        ("email", ColumnKind::Text),
        ("role", ColumnKind::Text),
        ("flags", ColumnKind::Json),
    ],
};

/// Executes allow-listed partial updates against any entity table. The
/// engine knows nothing about events versus users; it is parameterized over
/// a [`TableSpec`].
#[derive(Clone)]
pub struct PatchEngine {
    pool: PgPool,
}

impl PatchEngine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies `fields` to the row with the given id as a single
    /// parameterized UPDATE and returns the affected-row count. Zero means
    /// the id does not exist; callers map that to a not-found condition.
    pub async fn apply(
        &self,
        spec: &TableSpec,
        id: i64,
        fields: &Map<String, Value>,
    ) -> Result<u64, AppError> {
        let (sql, binds) = build_update(spec, fields)?;

        let mut query = sqlx::query(&sql);
        for value in binds {
            query = match value {
                SqlValue::Text(v) => query.bind(v),
                SqlValue::BigInt(v) => query.bind(v),
                SqlValue::Timestamp(v) => query.bind(v),
                SqlValue::Json(v) => query.bind(v),
            };
        }

        let result = query.bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Builds `UPDATE <table> SET a = $1, b = $2 WHERE id = $n` plus the bind
/// list in placeholder order. The id is always the final parameter. Pure,
/// so the generated text is testable without a database.
fn build_update(
    spec: &TableSpec,
    fields: &Map<String, Value>,
) -> Result<(String, Vec<SqlValue>), AppError> {
    if fields.is_empty() {
        return Err(AppError::InvalidArgument(
            "update body must contain at least one field".to_string(),
        ));
    }

    let mut sql = format!("UPDATE {} SET ", spec.table);
    let mut binds = Vec::with_capacity(fields.len());

    for (key, value) in fields {
        let kind = spec
            .writable
            .iter()
            .find(|(name, _)| *name == key.as_str())
            .map(|(_, kind)| *kind)
            .ok_or_else(|| {
                AppError::InvalidArgument(format!(
                    "column '{}' is not writable on {}",
                    key, spec.table
                ))
            })?;

        if !binds.is_empty() {
            sql.push_str(", ");
        }
        binds.push(coerce(key, kind, value)?);
        sql.push_str(&format!("{} = ${}", key, binds.len()));
    }

    sql.push_str(&format!(" WHERE id = ${}", binds.len() + 1));
    Ok((sql, binds))
}

fn coerce(column: &str, kind: ColumnKind, value: &Value) -> Result<SqlValue, AppError> {
    match kind {
        ColumnKind::Text => match value {
            Value::Null => Ok(SqlValue::Text(None)),
            Value::String(s) => Ok(SqlValue::Text(Some(s.clone()))),
            _ => Err(mismatch(column, "a string")),
        },
        ColumnKind::BigInt => match value {
            Value::Null => Ok(SqlValue::BigInt(None)),
            Value::Number(n) => n
                .as_i64()
                .map(|v| SqlValue::BigInt(Some(v)))
                .ok_or_else(|| mismatch(column, "an integer")),
            _ => Err(mismatch(column, "an integer")),
        },
        ColumnKind::Timestamp => match value {
            Value::Null => Ok(SqlValue::Timestamp(None)),
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|t| SqlValue::Timestamp(Some(t.with_timezone(&Utc))))
                .map_err(|_| mismatch(column, "an RFC 3339 timestamp")),
            _ => Err(mismatch(column, "an RFC 3339 timestamp")),
        },
        ColumnKind::Json => Ok(SqlValue::Json(value.clone())),
    }
}

fn mismatch(column: &str, expected: &str) -> AppError {
    AppError::InvalidArgument(format!("column '{}' expects {}", column, expected))
}
