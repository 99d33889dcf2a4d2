pub mod dto;
pub mod messages;
pub mod state;

pub use dto::{MessageDto, UpdateMessageRequest};
pub use state::AppState;

use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    timeout::TimeoutLayer,
};
use std::time::Duration;
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        // Health check
        .route("/health", get(health))

        // Message resource
        .route(
            "/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route(
            "/messages/message",
            patch(messages::update_message)
                .get(messages::message_path_not_found)
                .delete(messages::message_path_not_found),
        )
        .route(
            "/messages/:id",
            get(messages::get_message).delete(messages::delete_message),
        )

        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
