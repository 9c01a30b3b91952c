//! PDF Core - Low-level PDF writing
//!
//! This crate provides functionality for:
//! - Creating blank documents with fixed-size pages
//! - Writing text with the built-in Helvetica family
//! - Drawing filled/stroked rectangles and lines
//! - Inserting PNG images
//! - Adding clickable URI link regions
//!
//! Coordinates are measured from the top-left corner of the page in the
//! document's [`Unit`]; font sizes are always in points.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, PageSize, PdfDocument, Unit};
//!
//! let mut doc = PdfDocument::new(PageSize::A4).with_unit(Unit::Millimeter);
//! let page = doc.add_page();
//! doc.set_font_size(12.0);
//! doc.insert_text("Hello, World!", page, 20.0, 30.0, Align::Left)?;
//! let bytes = doc.finish()?;
//! ```

mod document;
mod font;
mod graphics;
mod image;
mod text;

pub use document::{Color, PageSize, PdfDocument, Unit};
pub use font::{BuiltinFont, FontStyle, FontWeight};
pub use graphics::PaintMode;
pub use text::{encode_win_ansi, generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Document has no pages")]
    EmptyDocument,

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
