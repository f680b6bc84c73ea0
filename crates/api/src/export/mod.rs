//! Report export.
//!
//! Reports are first laid out as a [`Document`] (title, table, summary) and
//! then rendered to PDF bytes.

mod document;
mod pdf;

pub use document::{Column, Document};
pub use pdf::{ExportError, render_pdf};
