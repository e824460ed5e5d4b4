//! Axum route handlers for the Refine API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::refine::pipeline::RefineOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefineRequest {
    pub prompt: String,
}

/// POST /api/v1/refine
///
/// Generates the rewrites, scores them and returns the full ranking plus the
/// recommended rewrite. Backend failures surface as degraded candidates.
pub async fn handle_refine(
    State(state): State<AppState>,
    Json(request): Json<RefineRequest>,
) -> Result<Json<RefineOutcome>, AppError> {
    let outcome = state.refiner.refine(&request.prompt).await?;
    Ok(Json(outcome))
}
