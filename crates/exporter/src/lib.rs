//! Exporter - the EventRate export pipeline
//!
//! Renders an export request remotely when possible and locally otherwise,
//! saves the document, then starts the event through the backend.
//!
//! # Example
//!
//! ```ignore
//! use exporter::{DirectoryDownloads, EventRateClient, ExportConfig, ReportExporter};
//! use report::LocalRenderer;
//!
//! let config = ExportConfig::default();
//! let client = EventRateClient::new(config.api.clone())?;
//! let exporter = ReportExporter::new(
//!     client.clone(),
//!     client,
//!     DirectoryDownloads::new(&config.export.download_dir),
//!     LocalRenderer::new(config.report.clone()),
//!     config.export.clone(),
//! );
//! let outcome = exporter.export(&request).await?;
//! println!("{}", outcome.notice.message);
//! ```

pub mod api;
pub mod config;
pub mod download;
pub mod error;
pub mod exporter;
pub mod logger;
pub mod ports;
pub mod state;

pub use api::{EventDraft, EventRateClient, RefereeCheck};
pub use config::{ApiConfig, ExportConfig, ExporterSettings};
pub use download::DirectoryDownloads;
pub use error::{ApiError, AutoStartError, ConfigError, ExportError, RemoteRenderError, Result};
pub use exporter::{
    AutoStartOutcome, DownloadReceipt, ExportOutcome, Notice, Redirect, RemoteReport, RenderPath,
    ReportExporter, Severity,
};
pub use ports::{DownloadSink, RenderService, StartService};
pub use state::{ExportSession, ExportState};
