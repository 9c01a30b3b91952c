//! TOML configuration
//!
//! Every field has a default, so an empty file (or no file) yields a
//! working setup against the production backend.

use crate::error::ConfigError;
use report::ReportSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub api: ApiConfig,
    pub export: ExporterSettings,
    pub report: ReportSettings,
}

/// EventRate backend endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub render_path: String,
    pub start_path: String,
    pub verify_referee_path: String,
    pub save_event_path: String,
    /// Per-request timeout; the transport default applies when unset
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://eventrate-pro.de".to_string(),
            render_path: "/export/pdf".to_string(),
            start_path: "/dashboard/startEvent".to_string(),
            verify_referee_path: "/event/addRefereeToList".to_string(),
            save_event_path: "/event/save".to_string(),
            timeout_seconds: None,
        }
    }
}

impl ApiConfig {
    /// Point every endpoint at another host, keeping the paths
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Behaviour of the export pipeline around rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterSettings {
    /// Skip the remote renderer entirely
    pub local_only: bool,
    pub remote_filename_template: String,
    pub remote_filename_fallback: String,
    pub download_dir: PathBuf,
    /// Public site hosting the voting pages linked from posters
    pub voting_base_url: String,
    /// Redirect target is `<dashboard_path>/<event id>`
    pub dashboard_path: String,
    pub started_redirect_ms: u64,
    pub not_started_redirect_ms: u64,
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            local_only: false,
            remote_filename_template: "referee-list-{event_id}.pdf".to_string(),
            remote_filename_fallback: "export".to_string(),
            download_dir: PathBuf::from("."),
            voting_base_url: "https://event-rate-pro.vercel.app".to_string(),
            dashboard_path: "/dashboard".to_string(),
            started_redirect_ms: 2000,
            not_started_redirect_ms: 3000,
        }
    }
}

impl ExportConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            ("api.base_url", &self.api.base_url),
            ("export.voting_base_url", &self.export.voting_base_url),
            ("report.questionnaire_base_url", &self.report.questionnaire_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidError {
                    message: format!("{name} must be an http(s) URL, got '{url}'"),
                });
            }
        }

        for (name, template) in [
            ("export.remote_filename_template", &self.export.remote_filename_template),
            ("report.filename_template", &self.report.filename_template),
        ] {
            if template.trim().is_empty() {
                return Err(ConfigError::InvalidError {
                    message: format!("{name} cannot be empty"),
                });
            }
        }

        self.report
            .layout
            .validate()
            .map_err(|e| ConfigError::InvalidError { message: e.to_string() })
    }
}
