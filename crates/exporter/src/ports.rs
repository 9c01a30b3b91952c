use crate::error::{AutoStartError, RemoteRenderError};
use async_trait::async_trait;
use report::ExportRequest;
use std::path::PathBuf;

/// Remote PDF renderer
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Raw response body; the caller decides whether it is a usable PDF
    async fn render_report(&self, request: &ExportRequest) -> Result<Vec<u8>, RemoteRenderError>;
}

/// Remote event starter
#[async_trait]
pub trait StartService: Send + Sync {
    async fn start_event(&self, event_id: &str) -> Result<(), AutoStartError>;
}

/// Where finished documents go
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Store `bytes` under `filename`, returning where they ended up
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf>;
}
