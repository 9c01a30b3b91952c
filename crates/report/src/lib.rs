//! Report - EventRate export reports
//!
//! This crate provides:
//! - The export data model (posters, referees, event metadata)
//! - Pagination of referee rows and poster slots
//! - QR code rasterization
//! - Local rendering of the full report to PDF bytes
//!
//! # Example
//!
//! ```ignore
//! use report::{EventMeta, ExportRequest, Item, LocalRenderer, RefereeList, ReportSettings};
//!
//! let mut referees = RefereeList::new();
//! referees.add("judge@example.com")?;
//! let items = vec![Item::new(0, "Robotics")];
//! let request = ExportRequest::new(EventMeta::new("42"), items, referees)?;
//! let rendered = LocalRenderer::new(ReportSettings::default()).render(&request)?;
//! std::fs::write(&rendered.filename, &rendered.bytes)?;
//! ```

mod layout;
mod model;
mod qr;
mod renderer;
mod settings;

pub use layout::{PageContent, RefereeRows, ReportDocument, ReportLayout, ReportPage, RowPlacement};
pub use model::{EventMeta, ExportRequest, Item, ItemList, RefereeList, ValidationError};
pub use qr::{ErrorCorrection, QrCodeRasterizer, QrRasterizer};
pub use renderer::{LocalRenderer, RenderedReport};
pub use settings::{render_filename, ReportSettings};

use thiserror::Error;

/// Errors that can occur while producing a report locally
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("QR code error: {0}")]
    QrCodeError(String),

    #[error("Invalid layout: {0}")]
    LayoutError(String),
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
