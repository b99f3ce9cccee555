use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use crate::state::AppState;
use crate::store::patch;
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::empty_success;

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(fields): AppJson<Map<String, Value>>,
) -> Result<Response, AppError> {
    let affected = state.patch.apply(&patch::USERS, id, &fields).await?;
    if affected == 0 {
        return Err(AppError::NotFound(format!("user {} does not exist", id)));
    }
    Ok(empty_success("User updated successfully").into_response())
}
