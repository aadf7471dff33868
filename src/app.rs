use crate::handlers;
use crate::state::AppState;
use axum::{Router, routing::get};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/status", get(handlers::get_status))
        .route("/api/view", get(handlers::get_view))
        .route("/api/summary", get(handlers::get_summary))
        .with_state(state)
}
