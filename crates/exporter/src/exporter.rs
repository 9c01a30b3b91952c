//! The export pipeline
//!
//! `validate -> remote render (or local fallback) -> download -> auto-start`.
//! Each step runs after the previous one has finished. Only validation,
//! local rendering and the download can fail the export; remote render
//! problems fall back to the local renderer and auto-start problems only
//! change the notice.

use crate::config::ExporterSettings;
use crate::error::{AutoStartError, ExportError, RemoteRenderError, Result};
use crate::ports::{DownloadSink, RenderService, StartService};
use crate::state::ExportSession;
use report::{render_filename, ExportRequest, LocalRenderer, RenderedReport, ReportDocument};
use std::path::PathBuf;
use std::time::Duration;

const PDF_MAGIC: &[u8] = b"%PDF-";

const STARTED_NOTICE: &str = "PDF downloaded successfully! Event has been started automatically.";
const NOT_STARTED_NOTICE: &str =
    "PDF downloaded successfully, but failed to start event automatically. \
     You can start it manually from the dashboard.";
const DOWNLOADED_NOTICE: &str = "PDF downloaded successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    Remote,
    Local,
}

/// A document produced by the render service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub path: PathBuf,
    pub filename: String,
    pub render_path: RenderPath,
    pub size: usize,
}

#[derive(Debug)]
pub enum AutoStartOutcome {
    /// No event id to start
    Skipped,
    Started,
    NotStarted(AutoStartError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
}

/// Message to show once the export is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// Navigation to perform after a delay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub delay: Duration,
}

#[derive(Debug)]
pub struct ExportOutcome {
    pub download: DownloadReceipt,
    /// Page structure, known only when the report was rendered locally
    pub document: Option<ReportDocument>,
    pub auto_start: AutoStartOutcome,
    pub notice: Notice,
    pub redirect: Option<Redirect>,
}

pub struct ReportExporter<R, S, D> {
    remote: R,
    starter: S,
    downloads: D,
    renderer: LocalRenderer,
    settings: ExporterSettings,
}

impl<R, S, D> ReportExporter<R, S, D>
where
    R: RenderService,
    S: StartService,
    D: DownloadSink,
{
    pub fn new(
        remote: R,
        starter: S,
        downloads: D,
        renderer: LocalRenderer,
        settings: ExporterSettings,
    ) -> Self {
        Self {
            remote,
            starter,
            downloads,
            renderer,
            settings,
        }
    }

    pub fn settings(&self) -> &ExporterSettings {
        &self.settings
    }

    /// Run the whole pipeline for one request
    pub async fn export(&self, request: &ExportRequest) -> Result<ExportOutcome> {
        request.validate()?;
        let event_id = request.event.event_id();
        tracing::info!(
            event_id = event_id.unwrap_or("-"),
            posters = request.items.len(),
            referees = request.referees.len(),
            "starting export"
        );

        let remote = if self.settings.local_only {
            tracing::debug!("remote rendering disabled");
            None
        } else {
            match self.try_remote(request).await {
                Ok(report) => Some(report),
                Err(e) => {
                    tracing::warn!(reason = %e, "remote rendering failed, rendering locally");
                    None
                }
            }
        };

        let (filename, bytes, document, render_path) = match remote {
            Some(report) => (report.filename, report.bytes, None, RenderPath::Remote),
            None => {
                let rendered = self.render_local(request)?;
                (rendered.filename, rendered.bytes, Some(rendered.document), RenderPath::Local)
            }
        };

        let path = self
            .downloads
            .save(&filename, &bytes)
            .await
            .map_err(|source| ExportError::Download {
                filename: filename.clone(),
                source,
            })?;
        tracing::info!(path = %path.display(), ?render_path, "report downloaded");

        let download = DownloadReceipt {
            path,
            filename,
            render_path,
            size: bytes.len(),
        };

        let auto_start = self.auto_start(event_id).await;
        let notice = notice_for(&auto_start);
        let redirect = self.redirect_for(event_id, &auto_start);

        Ok(ExportOutcome {
            download,
            document,
            auto_start,
            notice,
            redirect,
        })
    }

    /// Run [`export`](Self::export) while holding the session
    pub async fn export_guarded(
        &self,
        session: &mut ExportSession,
        request: &ExportRequest,
    ) -> Result<ExportOutcome> {
        session.begin()?;
        let result = self.export(request).await;
        session.finish(result.is_ok());
        result
    }

    /// Ask the render service for the document
    pub async fn try_remote(
        &self,
        request: &ExportRequest,
    ) -> std::result::Result<RemoteReport, RemoteRenderError> {
        let bytes = self.remote.render_report(request).await?;
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(RemoteRenderError::Malformed(bytes.len()));
        }

        let filename = render_filename(
            &self.settings.remote_filename_template,
            request.event.event_id(),
            &self.settings.remote_filename_fallback,
        );
        Ok(RemoteReport { filename, bytes })
    }

    /// Render the report from the request alone
    pub fn render_local(&self, request: &ExportRequest) -> Result<RenderedReport> {
        self.renderer.render(request).map_err(|e| {
            tracing::error!(error = %e, "local rendering failed");
            ExportError::LocalRender(e)
        })
    }

    /// Start the event, at most once, without ever failing the export
    pub async fn auto_start(&self, event_id: Option<&str>) -> AutoStartOutcome {
        let Some(event_id) = event_id else {
            tracing::info!("no event id, skipping auto-start");
            return AutoStartOutcome::Skipped;
        };

        match self.starter.start_event(event_id).await {
            Ok(()) => {
                tracing::info!(event_id, "event started");
                AutoStartOutcome::Started
            }
            Err(e) => {
                match &e {
                    AutoStartError::Rejected { status, message } => {
                        tracing::warn!(event_id, status, message = %message, "event start rejected")
                    }
                    AutoStartError::Transport(reason) => {
                        tracing::error!(event_id, reason = %reason, "event start request failed")
                    }
                }
                AutoStartOutcome::NotStarted(e)
            }
        }
    }

    fn redirect_for(
        &self,
        event_id: Option<&str>,
        auto_start: &AutoStartOutcome,
    ) -> Option<Redirect> {
        let delay_ms = match auto_start {
            AutoStartOutcome::Skipped => return None,
            AutoStartOutcome::Started => self.settings.started_redirect_ms,
            AutoStartOutcome::NotStarted(_) => self.settings.not_started_redirect_ms,
        };
        let event_id = event_id?;
        Some(Redirect {
            path: format!("{}/{}", self.settings.dashboard_path.trim_end_matches('/'), event_id),
            delay: Duration::from_millis(delay_ms),
        })
    }
}

fn notice_for(auto_start: &AutoStartOutcome) -> Notice {
    let (severity, message) = match auto_start {
        AutoStartOutcome::Started => (Severity::Success, STARTED_NOTICE),
        AutoStartOutcome::NotStarted(_) => (Severity::Warning, NOT_STARTED_NOTICE),
        AutoStartOutcome::Skipped => (Severity::Success, DOWNLOADED_NOTICE),
    };
    Notice {
        severity,
        message: message.to_string(),
    }
}
