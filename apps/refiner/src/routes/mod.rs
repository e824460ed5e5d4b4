pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::export::handlers::handle_export;
use crate::refine::handlers::handle_refine;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/refine", post(handle_refine))
        .route("/api/v1/export", post(handle_export))
        .with_state(state)
}
