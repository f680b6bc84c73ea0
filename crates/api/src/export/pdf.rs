//! PDF rendering with printpdf's built-in fonts.
//!
//! Layout works in whole millimetres on A4 portrait.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use thiserror::Error;

use super::document::Document;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LAYER: &str = "Content";

const LEFT_MM: u16 = 15;
const TOP_MM: u16 = 280;
const BOTTOM_MM: u16 = 20;
const LINE_MM: u16 = 6;
const SUMMARY_VALUE_MM: u16 = 150;

const TITLE_SIZE: f32 = 16.0;
const TEXT_SIZE: f32 = 9.0;

/// PDF rendering errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A built-in font could not be embedded.
    #[error("failed to load font: {0}")]
    Font(String),

    /// The document could not be serialized.
    #[error("failed to write PDF: {0}")]
    Write(String),
}

/// Renders a document to PDF bytes.
///
/// # Errors
///
/// Returns an error if fonts cannot be embedded or the file cannot be written.
pub fn render_pdf(document: &Document) -> Result<Vec<u8>, ExportError> {
    let (pdf, page, layer) =
        PdfDocument::new(document.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    let regular = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Font(e.to_string()))?;
    let bold = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Font(e.to_string()))?;

    let mut writer = PageWriter {
        layer: pdf.get_page(page).get_layer(layer),
        y: TOP_MM,
    };

    writer.text(&document.title, TITLE_SIZE, LEFT_MM, &bold);
    writer.advance(&pdf, LINE_MM);
    for line in &document.subtitle {
        writer.advance(&pdf, LINE_MM);
        writer.text(line, TEXT_SIZE, LEFT_MM, &regular);
    }

    writer.advance(&pdf, LINE_MM * 2);
    writer.header(document, &bold);
    for row in &document.rows {
        if writer.advance(&pdf, LINE_MM) {
            writer.header(document, &bold);
            writer.advance(&pdf, LINE_MM);
        }
        for (cell, column) in row.iter().zip(&document.columns) {
            writer.text(&fit(cell, column.max_chars), TEXT_SIZE, column.x_mm, &regular);
        }
    }

    writer.advance(&pdf, LINE_MM);
    for (label, value) in &document.summary {
        writer.advance(&pdf, LINE_MM);
        writer.text(label, TEXT_SIZE, LEFT_MM, &bold);
        writer.text(value, TEXT_SIZE, SUMMARY_VALUE_MM, &regular);
    }

    pdf.save_to_bytes()
        .map_err(|e| ExportError::Write(e.to_string()))
}

struct PageWriter {
    layer: PdfLayerReference,
    y: u16,
}

impl PageWriter {
    fn text(&self, text: &str, size: f32, x_mm: u16, font: &IndirectFontRef) {
        self.layer
            .use_text(text, size, Mm(f32::from(x_mm)), Mm(f32::from(self.y)), font);
    }

    fn header(&self, document: &Document, font: &IndirectFontRef) {
        for column in &document.columns {
            self.text(column.header, TEXT_SIZE, column.x_mm, font);
        }
    }

    /// Moves down by `step` mm, starting a new page when the bottom margin
    /// is reached. Returns true if a page was added.
    fn advance(&mut self, pdf: &PdfDocumentReference, step: u16) -> bool {
        match self.y.checked_sub(step) {
            Some(y) if y >= BOTTOM_MM => {
                self.y = y;
                false
            }
            _ => {
                let (page, layer) = pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
                self.layer = pdf.get_page(page).get_layer(layer);
                self.y = TOP_MM;
                true
            }
        }
    }
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with "...".
fn fit(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}
