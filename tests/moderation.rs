//! Moderation-workflow tests against a live Postgres.
//!
//! These exercise the transactional promotion path end to end and are
//! ignored by default; run them with a provisioned database:
//!
//!     DATABASE_URL=postgres://localhost/bulletin_test cargo test -- --ignored

use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use bulletin_server::models::queue::NewQueuedEvent;
use bulletin_server::models::user::User;
use bulletin_server::store::filter::ListFilter;
use bulletin_server::store::patch::{self, PatchEngine};
use bulletin_server::store::queue::QueueStore;
use bulletin_server::utils::error::AppError;

async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for these tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect to test database");
    sqlx::migrate!().run(&pool).await.expect("run migrations");
    pool
}

fn submission(title: &str) -> NewQueuedEvent {
    let start = Utc::now() + Duration::days(7);
    NewQueuedEvent {
        user_id: Some(42),
        title: title.to_string(),
        description: Some("a neighborhood gathering".to_string()),
        start_date: start,
        end_date: start + Duration::hours(2),
        location: Some("community hall".to_string()),
        flags: json!({"source": "integration-test"}),
    }
}

fn patch_body(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

async fn count(pool: &PgPool, sql: &str, id: i64) -> i64 {
    let (n,): (i64,) = sqlx::query_as(sql).bind(id).fetch_one(pool).await.unwrap();
    n
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn approve_moves_the_row_and_assigns_a_fresh_identity() {
    let pool = test_pool().await;
    let queue = QueueStore::new(pool.clone());

    let queued_id = queue.submit(&submission("approve-atomicity")).await.unwrap();
    let queued = queue.get(queued_id).await.unwrap();

    let published_id = queue.approve(queued_id).await.unwrap();

    // Queue side is gone; the published row carries the fetched values.
    assert_eq!(
        count(&pool, "SELECT count(*) FROM events_queue WHERE id = $1", queued_id).await,
        0
    );
    let (title, user_id, status, flags): (String, Option<i64>, String, Value) = sqlx::query_as(
        "SELECT title, user_id, status, flags FROM events WHERE id = $1",
    )
    .bind(published_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(title, queued.title);
    assert_eq!(user_id, queued.user_id);
    assert_eq!(status, "confirmed");
    assert_eq!(flags, queued.flags);

    // The dead queue id resolves to nothing afterwards.
    assert!(matches!(
        queue.get(queued_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn approve_of_an_absent_id_is_not_found_and_publishes_nothing() {
    let pool = test_pool().await;
    let queue = QueueStore::new(pool.clone());

    let (before,): (i64,) = sqlx::query_as("SELECT count(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();

    let result = queue.approve(i64::MAX).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let (after,): (i64,) = sqlx::query_as("SELECT count(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn failed_insert_rolls_back_and_the_queued_row_survives() {
    let pool = test_pool().await;
    let queue = QueueStore::new(pool.clone());

    // A constraint on events makes the promotion's insert step fail after
    // the queue delete has already run inside the transaction.
    sqlx::query("ALTER TABLE events DROP CONSTRAINT IF EXISTS events_title_guard")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("ALTER TABLE events ADD CONSTRAINT events_title_guard CHECK (title <> 'insert-must-fail')")
        .execute(&pool)
        .await
        .unwrap();

    let id = queue.submit(&submission("insert-must-fail")).await.unwrap();
    let (events_before,): (i64,) = sqlx::query_as("SELECT count(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();

    let result = queue.approve(id).await;
    assert!(result.is_err(), "approve must fail when the insert fails");

    // No mixed state: the queued row is back and nothing was published.
    assert_eq!(
        count(&pool, "SELECT count(*) FROM events_queue WHERE id = $1", id).await,
        1
    );
    let (events_after,): (i64,) = sqlx::query_as("SELECT count(*) FROM events")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(events_before, events_after);

    sqlx::query("ALTER TABLE events DROP CONSTRAINT events_title_guard")
        .execute(&pool)
        .await
        .unwrap();
    queue.reject(id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn rejection_is_idempotent_in_state_but_reports_not_found_the_second_time() {
    let pool = test_pool().await;
    let queue = QueueStore::new(pool.clone());

    let id = queue.submit(&submission("reject-twice")).await.unwrap();

    queue.reject(id).await.unwrap();
    assert_eq!(
        count(&pool, "SELECT count(*) FROM events_queue WHERE id = $1", id).await,
        0
    );

    let second = queue.reject(id).await;
    assert!(matches!(second, Err(AppError::NotFound(_))));
    assert_eq!(
        count(&pool, "SELECT count(*) FROM events_queue WHERE id = $1", id).await,
        0
    );
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn concurrent_approve_and_reject_admit_exactly_one_winner() {
    let pool = test_pool().await;
    let queue = QueueStore::new(pool.clone());

    let id = queue.submit(&submission("approve-reject-race")).await.unwrap();

    let (approved, rejected) = tokio::join!(queue.approve(id), queue.reject(id));
    assert!(
        approved.is_ok() != rejected.is_ok(),
        "exactly one of approve/reject must win: approve={:?} reject={:?}",
        approved.is_ok(),
        rejected.is_ok()
    );

    let queue_rows = count(&pool, "SELECT count(*) FROM events_queue WHERE id = $1", id).await;
    assert_eq!(queue_rows, 0, "the queue row is gone either way");

    if let Ok(published_id) = approved {
        assert_eq!(
            count(&pool, "SELECT count(*) FROM events WHERE id = $1", published_id).await,
            1
        );
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn partial_update_touches_only_the_named_column() {
    let pool = test_pool().await;
    let queue = QueueStore::new(pool.clone());
    let engine = PatchEngine::new(pool.clone());

    let queued_id = queue.submit(&submission("patch-minimality")).await.unwrap();
    let published_id = queue.approve(queued_id).await.unwrap();

    let affected = engine
        .apply(
            &patch::EVENTS,
            published_id,
            &patch_body(&[("status", json!("cancelled"))]),
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let (title, status, location): (String, String, Option<String>) =
        sqlx::query_as("SELECT title, status, location FROM events WHERE id = $1")
            .bind(published_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "cancelled");
    assert_eq!(title, "patch-minimality");
    assert_eq!(location.as_deref(), Some("community hall"));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn disallowed_column_leaves_the_store_untouched() {
    let pool = test_pool().await;
    let queue = QueueStore::new(pool.clone());
    let engine = PatchEngine::new(pool.clone());

    let id = queue.submit(&submission("allow-list")).await.unwrap();

    let result = engine
        .apply(
            &patch::EVENTS_QUEUE,
            id,
            &patch_body(&[("created_at", json!("1970-01-01T00:00:00Z"))]),
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));

    let fetched = queue.get(id).await.unwrap();
    assert_eq!(fetched.title, "allow-list");
    assert!(fetched.created_at > Utc::now() - Duration::minutes(5));
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn user_patch_changes_only_the_named_column() {
    let pool = test_pool().await;
    let engine = PatchEngine::new(pool.clone());

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (first_name, last_name, email, role) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind("Robin")
    .bind("Okafor")
    .bind("robin@example.com")
    .bind("member")
    .fetch_one(&pool)
    .await
    .unwrap();

    let affected = engine
        .apply(&patch::USERS, id, &patch_body(&[("role", json!("moderator"))]))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let user: User = sqlx::query_as(
        "SELECT id, first_name, last_name, email, role, created_at, flags \
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(user.role, "moderator");
    assert_eq!(user.email, "robin@example.com");
    assert_eq!(user.first_name, "Robin");
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn patch_engine_reports_zero_rows_for_an_absent_id() {
    let pool = test_pool().await;
    let engine = PatchEngine::new(pool);

    let affected = engine
        .apply(
            &patch::USERS,
            i64::MAX,
            &patch_body(&[("role", json!("admin"))]),
        )
        .await
        .unwrap();
    assert_eq!(affected, 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn list_window_returns_only_matching_rows_in_id_order() {
    let pool = test_pool().await;
    let queue = QueueStore::new(pool.clone());

    // Leftovers from earlier runs would land inside the window.
    sqlx::query("DELETE FROM events_queue WHERE title LIKE 'w-%'")
        .execute(&pool)
        .await
        .unwrap();

    let base = Utc::now() + Duration::days(365);
    let mut inside = Vec::new();
    for (title, offset_days) in [("w-early", 0), ("w-mid", 1), ("w-late", 30)] {
        let mut event = submission(title);
        event.start_date = base + Duration::days(offset_days);
        event.end_date = event.start_date + Duration::hours(1);
        let id = queue.submit(&event).await.unwrap();
        if offset_days < 3 {
            inside.push(id);
        }
    }

    let filter = ListFilter {
        start_date: Some(base - Duration::hours(1)),
        end_date: Some(base + Duration::days(3)),
        ..Default::default()
    };
    let listed = queue.list(&filter).await.unwrap();
    let listed_ids: Vec<i64> = listed.iter().map(|e| e.id).collect();

    assert_eq!(listed_ids, inside, "window rows only, ascending id");
}
