use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{events, health_check, queue, users};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list_events))
        .route("/events/:id", patch(events::update_event))
        .route(
            "/events-queue",
            get(queue::list_queue).post(queue::submit_event),
        )
        .route(
            "/events-queue/:id",
            get(queue::get_queued_event)
                .patch(queue::update_queued_event)
                .delete(queue::delete_queued_event),
        )
        .route("/events-queue/:id/approve", post(queue::approve_event))
        .route("/events-queue/:id/reject", post(queue::reject_event))
        .route("/users/:id", patch(users::update_user))
        .with_state(state);

    apply_security_headers(api)
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}
