use report::{ReportError, ValidationError};
use thiserror::Error;

/// Errors from the EventRate backend client
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}")]
    StatusError {
        endpoint: String,
        status: u16,
        /// `error` field of the JSON body, when there was one
        message: Option<String>,
    },
}

/// Why the remote renderer could not be used; always recovered locally
#[derive(Error, Debug)]
pub enum RemoteRenderError {
    #[error("render service unreachable: {0}")]
    Transport(String),

    #[error("render service returned status {0}")]
    Status(u16),

    #[error("render service returned a {0}-byte body that is not a PDF")]
    Malformed(usize),
}

impl From<ApiError> for RemoteRenderError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::HttpError(e) => RemoteRenderError::Transport(e.to_string()),
            ApiError::StatusError { status, .. } => RemoteRenderError::Status(status),
        }
    }
}

/// Auto-start failures; these only soften the final notice
#[derive(Error, Debug)]
pub enum AutoStartError {
    #[error("start request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("start request failed: {0}")]
    Transport(String),
}

impl From<ApiError> for AutoStartError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::HttpError(e) => AutoStartError::Transport(e.to_string()),
            ApiError::StatusError { status, message, .. } => AutoStartError::Rejected {
                status,
                message: message.unwrap_or_else(|| "no reason given".to_string()),
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Error generating PDF. Please try again.")]
    LocalRender(#[source] ReportError),

    #[error("Failed to save {filename}: {source}")]
    Download {
        filename: String,
        source: std::io::Error,
    },

    #[error("An export is already in progress")]
    InFlight,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError { path: String, source: std::io::Error },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    InvalidError { message: String },
}

pub type Result<T> = std::result::Result<T, ExportError>;
