use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::SqlValue;

/// Listing filters shared by the published and queued event tables. The time
/// window applies only when both bounds are present, and likewise for
/// limit/offset; a lone half of either pair is ignored.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ListFilter {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub struct ListQuery {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

/// Assembles `SELECT <columns> FROM <table> [WHERE …] ORDER BY id ASC
/// [LIMIT $n OFFSET $m]`. All filter values are bound positionally; the
/// queue table has no status column, so status filtering is gated on
/// `with_status`.
pub fn build_list(table: &str, columns: &str, filter: &ListFilter, with_status: bool) -> ListQuery {
    let mut sql = format!("SELECT {} FROM {}", columns, table);
    let mut binds: Vec<SqlValue> = Vec::new();
    let mut conditions: Vec<String> = Vec::new();

    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        conditions.push(format!(
            "start_date BETWEEN ${} AND ${}",
            binds.len() + 1,
            binds.len() + 2
        ));
        binds.push(SqlValue::Timestamp(Some(start)));
        binds.push(SqlValue::Timestamp(Some(end)));
    }

    if with_status {
        if let Some(status) = &filter.status {
            conditions.push(format!("status = ${}", binds.len() + 1));
            binds.push(SqlValue::Text(Some(status.clone())));
        }
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    sql.push_str(" ORDER BY id ASC");

    if let (Some(limit), Some(offset)) = (filter.limit, filter.offset) {
        sql.push_str(&format!(
            " LIMIT ${} OFFSET ${}",
            binds.len() + 1,
            binds.len() + 2
        ));
        binds.push(SqlValue::BigInt(Some(limit)));
        binds.push(SqlValue::BigInt(Some(offset)));
    }

    ListQuery { sql, binds }
}
