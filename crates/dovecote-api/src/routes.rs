use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use dovecote_db::Database;

use crate::middleware::require_creator;
use crate::{creator_feedback, messages, reactions, replies};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub jwt_secret: String,
}

/// Build the dashboard API router. The binary layers CORS and tracing on
/// top; integration tests drive this router directly.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/feedback", get(messages::list_messages))
        .route("/api/feedback/{id}", patch(messages::set_reviewed))
        .route("/api/feedback/{id}", delete(messages::delete_message))
        .route("/api/replies", post(replies::create_reply))
        .route("/api/replies/{id}", patch(replies::set_visibility))
        .route("/api/reactions", get(reactions::get_summary))
        .route("/api/creator-feedback", post(creator_feedback::submit))
        .layer(middleware::from_fn_with_state(state.clone(), require_creator))
        .with_state(state);

    Router::new().route("/health", get(health)).merge(protected)
}

/// GET /health, liveness check (no auth).
async fn health() -> &'static str {
    "ok"
}
