use sqlx::{PgPool, Postgres, Transaction};

use super::filter::{build_list, ListFilter};
use super::SqlValue;
use crate::models::queue::{NewQueuedEvent, QueuedEvent};
use crate::utils::error::AppError;

const QUEUE_COLUMNS: &str =
    "id, user_id, title, description, start_date, end_date, created_at, location, flags";

/// The moderation queue. A queued id denotes at most one row, and after
/// approval or rejection it denotes none: the queue is a single-pass staging
/// area, not a history.
#[derive(Clone)]
pub struct QueueStore {
    pool: PgPool,
}

impl QueueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<QueuedEvent>, AppError> {
        // events_queue has no status column; everything in it is pending.
        let query = build_list("events_queue", QUEUE_COLUMNS, filter, false);

        let mut q = sqlx::query_as::<_, QueuedEvent>(&query.sql);
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

    pub async fn get(&self, id: i64) -> Result<QueuedEvent, AppError> {
        let sql = format!("SELECT {} FROM events_queue WHERE id = $1", QUEUE_COLUMNS);
        sqlx::query_as::<_, QueuedEvent>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("queued event {} does not exist", id)))
    }

    /// Inserts a submission and returns its queue-assigned id.
    pub async fn submit(&self, event: &NewQueuedEvent) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO events_queue (user_id, title, description, start_date, end_date, location, flags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(event.user_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.location)
        .bind(&event.flags)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Promotes a queued event into the published table and returns the
    /// fresh published id. Fetch, delete and insert run in one transaction:
    /// on any failure the queued row survives untouched and nothing is
    /// published. A commit is never attempted after a failed step.
    pub async fn approve(&self, id: i64) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        match Self::promote(&mut tx, id).await {
            Ok(published_id) => {
                tx.commit().await?;
                Ok(published_id)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = ?rollback_err, "Rollback failed after approve error");
                }
                Err(err)
            }
        }
    }

    async fn promote(tx: &mut Transaction<'_, Postgres>, id: i64) -> Result<i64, AppError> {
        // FOR UPDATE serializes concurrent approve/reject on the same id:
        // the loser blocks here until the winner commits, then sees no row.
        let sql = format!(
            "SELECT {} FROM events_queue WHERE id = $1 FOR UPDATE",
            QUEUE_COLUMNS
        );
        let queued: QueuedEvent = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("queued event {} does not exist", id)))?;

        let deleted = sqlx::query("DELETE FROM events_queue WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        if deleted.rows_affected() != 1 {
            return Err(AppError::Conflict(format!(
                "queued event {} was removed concurrently",
                id
            )));
        }

        // The published table assigns a fresh id; the queue id dies here.
        let (published_id,): (i64,) = sqlx::query_as(
            "INSERT INTO events (user_id, title, description, start_date, end_date, location, status, flags) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(queued.user_id)
        .bind(&queued.title)
        .bind(&queued.description)
        .bind(queued.start_date)
        .bind(queued.end_date)
        .bind(&queued.location)
        .bind("confirmed")
        .bind(&queued.flags)
        .fetch_one(&mut **tx)
        .await?;

        Ok(published_id)
    }

    /// Discards a queued event. Rejection and administrative deletion share
    /// this path: a single DELETE, with an absent id surfaced as not-found.
    pub async fn reject(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events_queue WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "queued event {} does not exist",
                id
            )));
        }
        Ok(())
    }
}
