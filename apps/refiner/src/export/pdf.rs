//! PDF export through `printpdf`.
//!
//! printpdf places text but does not wrap it, so lines are wrapped with the
//! Helvetica metrics table and split into pages here before rendering.

use printpdf::{BuiltinFont, Mm, PdfDocument, Pt};
use thiserror::Error;

use crate::export::font_metrics::{PageConfig, HELVETICA};

const DOCUMENT_TITLE: &str = "Refined prompt";
const LAYER_NAME: &str = "Text";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

fn render_error(err: impl std::fmt::Display) -> PdfError {
    PdfError::Render(err.to_string())
}

/// Wrapped lines grouped per page. Always at least one (possibly empty) page.
pub fn paginate(text: &str, config: &PageConfig) -> Vec<Vec<String>> {
    let lines = HELVETICA.wrap_lines(text, config.text_width_em());
    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines
        .chunks(config.lines_per_page())
        .map(|chunk| chunk.to_vec())
        .collect()
}

pub fn render_pdf(text: &str, config: &PageConfig) -> Result<Vec<u8>, PdfError> {
    let pages = paginate(text, config);
    let width: Mm = Pt(config.page_width_pt).into();
    let height: Mm = Pt(config.page_height_pt).into();

    let (doc, first_page, first_layer) = PdfDocument::new(DOCUMENT_TITLE, width, height, LAYER_NAME);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_error)?;

    let first_baseline = config.page_height_pt - config.margin_pt - config.font_size_pt;
    let mut first = Some((first_page, first_layer));

    for lines in &pages {
        let (page, layer) = match first.take() {
            Some(indices) => indices,
            None => doc.add_page(width, height, LAYER_NAME),
        };
        let layer = doc.get_page(page).get_layer(layer);

        for (row, line) in lines.iter().enumerate() {
            let baseline = first_baseline - row as f32 * config.line_height_pt;
            layer.use_text(
                line.as_str(),
                config.font_size_pt,
                Pt(config.margin_pt).into(),
                Pt(baseline).into(),
                &font,
            );
        }
    }

    doc.save_to_bytes().map_err(render_error)
}
