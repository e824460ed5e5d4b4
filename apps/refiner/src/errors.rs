use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::pdf::PdfError;
use crate::refine::pipeline::RefineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedExportFormat(String),

    #[error("Export failed: {0}")]
    Export(#[from] PdfError),
}

impl From<RefineError> for AppError {
    fn from(err: RefineError) -> Self {
        match err {
            RefineError::EmptyPrompt => AppError::Validation(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedExportFormat(format) => {
                tracing::debug!("Rejected export format {format:?}");
                (
                    StatusCode::BAD_REQUEST,
                    "UNSUPPORTED_EXPORT_FORMAT",
                    "Invalid export format selected.".to_string(),
                )
            }
            AppError::Export(err) => {
                tracing::error!("Export failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "Failed to render the export file.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_prompt_maps_to_validation() {
        let err: AppError = RefineError::EmptyPrompt.into();
        assert!(matches!(err, AppError::Validation(ref m) if m == "prompt cannot be empty"));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unsupported_format_is_bad_request() {
        let response = AppError::UnsupportedExportFormat("docx".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_export_failure_is_internal_error() {
        let err: AppError = PdfError::Render("broken".to_string()).into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
