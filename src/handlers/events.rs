use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use crate::state::AppState;
use crate::store::filter::ListFilter;
use crate::store::patch;
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::{empty_success, success};

pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Response, AppError> {
    let events = state.events.list(&filter).await?;
    Ok(success(events, "Events retrieved successfully").into_response())
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(fields): AppJson<Map<String, Value>>,
) -> Result<Response, AppError> {
    let affected = state.patch.apply(&patch::EVENTS, id, &fields).await?;
    if affected == 0 {
        return Err(AppError::NotFound(format!("event {} does not exist", id)));
    }
    Ok(empty_success("Event updated successfully").into_response())
}
