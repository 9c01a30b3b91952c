//! HTTP client for the EventRate backend

use crate::config::ApiConfig;
use crate::error::{ApiError, AutoStartError, RemoteRenderError};
use crate::ports::{RenderService, StartService};
use async_trait::async_trait;
use report::{ExportRequest, Item};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const REFEREE_NOT_FOUND: &str = "Referee email not found in the system";

/// Result of looking a referee up in the user directory
#[derive(Debug, Clone, PartialEq)]
pub enum RefereeCheck {
    Verified { email: String, referee: Option<Value> },
    Rejected { message: String },
}

#[derive(Debug, Deserialize)]
struct RefereeLookup {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    referee: Option<Value>,
}

/// Body of the event-save call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDraft {
    pub event: SavedEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questionnaire: Option<Value>,
    #[serde(rename = "eventTitle", skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedEvent {
    #[serde(rename = "eventID")]
    pub event_id: Option<String>,
    #[serde(rename = "questionnaireID")]
    pub questionnaire_id: Option<String>,
    #[serde(rename = "itemList")]
    pub items: Vec<Item>,
    #[serde(rename = "refereeList")]
    pub referees: Vec<String>,
    pub status: String,
    #[serde(rename = "organizerID")]
    pub organizer_id: Option<String>,
}

impl EventDraft {
    /// Snapshot a request as a pending event
    pub fn from_request(request: &ExportRequest, questionnaire: Option<Value>) -> Self {
        let event = &request.event;
        Self {
            event: SavedEvent {
                event_id: event.event_id.clone(),
                questionnaire_id: event.questionnaire_id.clone(),
                items: request.items.clone(),
                referees: request.referees.clone(),
                status: "pending".to_string(),
                organizer_id: event.organizer_id.clone(),
            },
            questionnaire,
            event_title: event.event_title.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventRateClient {
    client: Client,
    config: ApiConfig,
}

impl EventRateClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// POST the request to the render endpoint and return the raw body
    pub async fn render_report(&self, request: &ExportRequest) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&self.config.render_path);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        tracing::debug!("render response status: {}", status);

        if !status.is_success() {
            return Err(ApiError::StatusError {
                endpoint: url,
                status: status.as_u16(),
                message: None,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Ask the backend to start an event
    ///
    /// The body is parsed as JSON before the status is looked at, so an
    /// unreadable body is a transport failure whatever the status.
    pub async fn start_event(&self, event_id: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(&self.config.start_path);
        tracing::debug!(event_id, "POST {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("eventID", event_id)])
            .send()
            .await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if !status.is_success() {
            let message = body.get("error").and_then(Value::as_str).map(str::to_string);
            return Err(ApiError::StatusError {
                endpoint: url,
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    /// Check that `email` belongs to a registered user
    pub async fn verify_referee(&self, email: &str) -> Result<RefereeCheck, ApiError> {
        let email = email.trim();
        let url = self.endpoint(&self.config.verify_referee_path);
        tracing::debug!(email, "GET {}", url);

        let lookup: RefereeLookup = self
            .client
            .get(&url)
            .query(&[("email", email)])
            .send()
            .await?
            .json()
            .await?;

        if lookup.status == "success" {
            return Ok(RefereeCheck::Verified {
                email: email.to_string(),
                referee: lookup.referee,
            });
        }

        let message = lookup
            .message
            .filter(|m| !m.trim().is_empty())
            .map(|m| m.replace("User", "Referee"))
            .unwrap_or_else(|| REFEREE_NOT_FOUND.to_string());
        Ok(RefereeCheck::Rejected { message })
    }

    /// Persist the event as pending before it is exported
    pub async fn save_event(&self, draft: &EventDraft) -> Result<(), ApiError> {
        let url = self.endpoint(&self.config.save_event_path);
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(draft).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string));
            return Err(ApiError::StatusError {
                endpoint: url,
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl RenderService for EventRateClient {
    async fn render_report(&self, request: &ExportRequest) -> Result<Vec<u8>, RemoteRenderError> {
        Ok(EventRateClient::render_report(self, request).await?)
    }
}

#[async_trait]
impl StartService for EventRateClient {
    async fn start_event(&self, event_id: &str) -> Result<(), AutoStartError> {
        EventRateClient::start_event(self, event_id).await?;
        Ok(())
    }
}
