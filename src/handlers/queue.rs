use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::queue::NewQueuedEvent;
use crate::state::AppState;
use crate::store::filter::ListFilter;
use crate::store::patch;
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::{empty_success, success};

#[derive(Serialize)]
struct QueuedPayload {
    id: i64,
}

#[derive(Serialize)]
struct PublishedPayload {
    id: i64,
}

pub async fn list_queue(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Response, AppError> {
    let events = state.queue.list(&filter).await?;
    Ok(success(events, "Queued events retrieved successfully").into_response())
}

pub async fn get_queued_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let event = state.queue.get(id).await?;
    Ok(success(event, "Queued event retrieved successfully").into_response())
}

pub async fn submit_event(
    State(state): State<AppState>,
    AppJson(event): AppJson<NewQueuedEvent>,
) -> Result<Response, AppError> {
    let id = state.queue.submit(&event).await?;
    Ok(success(QueuedPayload { id }, "Event submitted for review").into_response())
}

pub async fn update_queued_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(fields): AppJson<Map<String, Value>>,
) -> Result<Response, AppError> {
    let affected = state.patch.apply(&patch::EVENTS_QUEUE, id, &fields).await?;
    if affected == 0 {
        return Err(AppError::NotFound(format!(
            "queued event {} does not exist",
            id
        )));
    }
    Ok(empty_success("Queued event updated successfully").into_response())
}

pub async fn approve_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let published_id = state.queue.approve(id).await?;
    Ok(success(
        PublishedPayload { id: published_id },
        "Event approved successfully",
    )
    .into_response())
}

pub async fn reject_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.queue.reject(id).await?;
    Ok(empty_success("Event rejected successfully").into_response())
}

pub async fn delete_queued_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    // Same storage semantics as rejection, invoked without review intent.
    state.queue.reject(id).await?;
    Ok(empty_success("Queued event deleted successfully").into_response())
}
