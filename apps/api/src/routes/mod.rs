pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::funding::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/submit", post(handlers::handle_submit))
        .route("/api/export_pdf", post(handlers::handle_export_pdf))
        .with_state(state)
}
