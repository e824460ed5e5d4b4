// Export of a chosen prompt as a downloadable file (plain text or PDF).
// Pure formatting: nothing here touches the refine pipeline.

pub mod font_metrics;
pub mod handlers;
pub mod pdf;

use std::str::FromStr;

use bytes::Bytes;

use crate::errors::AppError;
use crate::export::font_metrics::PageConfig;
use crate::export::pdf::PdfError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Txt,
    Pdf,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "txt" => Ok(ExportFormat::Txt),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(AppError::UnsupportedExportFormat(other.to_string())),
        }
    }
}

/// A rendered download.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: &'static str,
    pub content_type: &'static str,
    pub body: Bytes,
}

pub fn render_export(
    prompt: &str,
    format: ExportFormat,
    page_config: &PageConfig,
) -> Result<ExportedFile, PdfError> {
    Ok(match format {
        ExportFormat::Txt => ExportedFile {
            filename: "prompt.txt",
            content_type: "text/plain; charset=utf-8",
            body: Bytes::copy_from_slice(prompt.as_bytes()),
        },
        ExportFormat::Pdf => ExportedFile {
            filename: "prompt.pdf",
            content_type: "application/pdf",
            body: Bytes::from(pdf::render_pdf(prompt, page_config)?),
        },
    })
}
