//! Axum route handlers for the Export API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::export::{render_export, ExportFormat};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub chosen_prompt: String,
    pub export_format: String,
}

/// POST /api/v1/export
///
/// Returns the chosen prompt as a `prompt.txt` or `prompt.pdf` attachment.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    if request.chosen_prompt.trim().is_empty() {
        return Err(AppError::Validation(
            "chosen_prompt cannot be empty".to_string(),
        ));
    }

    let format: ExportFormat = request.export_format.parse()?;
    let file = render_export(&request.chosen_prompt, format, &state.page_config)?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.body,
    )
        .into_response())
}
