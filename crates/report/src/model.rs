//! Posters, referees and the export request
//!
//! Field names on the wire follow the EventRate backend (`PosterID`,
//! `Title`, `refereeList`, ...), so the same types serialize straight into
//! the remote render and event-save payloads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a list edit or an export request is refused
///
/// The messages are shown to the organizer as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please add at least one poster with QR code before exporting to PDF")]
    NoItems,

    #[error("Please add at least one referee before exporting to PDF")]
    NoReferees,

    #[error("Please enter a poster name")]
    EmptyTitle,

    #[error("A poster with this name already exists. Please choose a different name.")]
    DuplicateTitle(String),

    #[error("Please enter a referee email address")]
    EmptyEmail,

    #[error("This referee email is already added to the list")]
    DuplicateReferee(String),
}

/// A poster that can be voted on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "PosterID")]
    pub id: u32,

    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Voting page the QR code points to
    #[serde(rename = "content", default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

impl Item {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            link: None,
            event_id: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Title to print; `position` is the item's 0-based place in the export
    pub fn display_title(&self, position: usize) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Poster {}", position + 1),
        }
    }

    /// URL encoded in the QR code
    ///
    /// Items without an explicit link fall back to the questionnaire page
    /// keyed by the item id.
    pub fn destination(&self, questionnaire_base_url: &str) -> String {
        match self.link.as_deref().map(str::trim) {
            Some(link) if !link.is_empty() => link.to_string(),
            _ => format!(
                "{}/questionnaire/{}",
                questionnaire_base_url.trim_end_matches('/'),
                self.id
            ),
        }
    }
}

/// Posters being assembled for one questionnaire
#[derive(Debug, Clone)]
pub struct ItemList {
    items: Vec<Item>,
    voting_base_url: String,
    questionnaire_id: String,
    event_id: Option<String>,
    next_id: u32,
}

impl ItemList {
    /// `voting_base_url` is the public site hosting the role-selection page
    pub fn new(
        voting_base_url: impl Into<String>,
        questionnaire_id: impl Into<String>,
        event_id: Option<String>,
    ) -> Self {
        Self {
            items: Vec::new(),
            voting_base_url: voting_base_url.into(),
            questionnaire_id: questionnaire_id.into(),
            event_id,
            next_id: 0,
        }
    }

    /// Add a poster, linking it to `<base>/choose-role/<questionnaire>/<id>`
    ///
    /// Titles are trimmed and compared case-insensitively.
    pub fn add(&mut self, title: &str) -> Result<&Item, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let lowered = title.to_lowercase();
        let duplicate = self.items.iter().any(|item| {
            item.title
                .as_deref()
                .is_some_and(|existing| existing.to_lowercase() == lowered)
        });
        if duplicate {
            return Err(ValidationError::DuplicateTitle(title.to_string()));
        }

        let id = self.next_id;
        self.next_id += 1;

        let link = format!(
            "{}/choose-role/{}/{}",
            self.voting_base_url.trim_end_matches('/'),
            self.questionnaire_id,
            id
        );
        self.items.push(Item {
            id,
            title: Some(title.to_string()),
            link: Some(link),
            event_id: self.event_id.clone(),
        });

        tracing::debug!(id, title, "poster added");
        Ok(&self.items[self.items.len() - 1])
    }

    /// Remove a poster by id
    pub fn remove(&mut self, id: u32) -> Option<Item> {
        let position = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(position))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

/// Referee emails in insertion order
///
/// Duplicates are detected on the trimmed value and are case-sensitive,
/// unlike poster titles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefereeList {
    emails: Vec<String>,
}

impl RefereeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, email: &str) -> Result<(), ValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail);
        }
        if self.contains(email) {
            return Err(ValidationError::DuplicateReferee(email.to_string()));
        }
        self.emails.push(email.to_string());
        Ok(())
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.iter().any(|existing| existing == email.trim())
    }

    pub fn remove(&mut self, email: &str) -> bool {
        let before = self.emails.len();
        self.emails.retain(|existing| existing != email.trim());
        self.emails.len() != before
    }

    pub fn as_slice(&self) -> &[String] {
        &self.emails
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.emails
    }
}

/// Event-level data printed on the cover and sent to the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    #[serde(rename = "questionnaireID", default, skip_serializing_if = "Option::is_none")]
    pub questionnaire_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(rename = "organizerID", default, skip_serializing_if = "Option::is_none")]
    pub organizer_id: Option<String>,

    #[serde(rename = "eventTitle", default, skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,
}

impl EventMeta {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: Some(event_id.into()),
            ..Self::default()
        }
    }

    /// Event id, treating blank values as absent
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Everything needed to produce an export
///
/// Serializes to the render endpoint's `{posters, refereeList, eventData}`
/// body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(rename = "eventData", default)]
    pub event: EventMeta,

    #[serde(rename = "posters", default)]
    pub items: Vec<Item>,

    #[serde(rename = "refereeList", default)]
    pub referees: Vec<String>,
}

impl ExportRequest {
    /// Build a request; both lists must be non-empty
    pub fn new(
        event: EventMeta,
        items: Vec<Item>,
        referees: RefereeList,
    ) -> Result<Self, ValidationError> {
        let request = Self {
            event,
            items,
            referees: referees.into_vec(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the export preconditions; posters are checked first
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        if self.referees.is_empty() {
            return Err(ValidationError::NoReferees);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn poster_list() -> ItemList {
        ItemList::new("https://vote.example.com/", "q-7", Some("42".to_string()))
    }

    #[test]
    fn test_add_poster_builds_link() {
        let mut list = poster_list();
        let item = list.add("  Robotics  ").unwrap().clone();

        assert_eq!(item.id, 0);
        assert_eq!(item.title.as_deref(), Some("Robotics"));
        assert_eq!(item.link.as_deref(), Some("https://vote.example.com/choose-role/q-7/0"));
        assert_eq!(item.event_id.as_deref(), Some("42"));

        let second = list.add("Chemistry").unwrap();
        assert_eq!(second.id, 1);
    }

    #[test]
    fn test_poster_titles_are_case_insensitive_unique() {
        let mut list = poster_list();
        list.add("Robotics").unwrap();

        assert_eq!(
            list.add("ROBOTICS "),
            Err(ValidationError::DuplicateTitle("ROBOTICS".to_string()))
        );
        assert_eq!(list.add("   "), Err(ValidationError::EmptyTitle));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_ids_stay_unique_after_removal() {
        let mut list = poster_list();
        list.add("A").unwrap();
        list.add("B").unwrap();
        assert_eq!(list.remove(0).map(|item| item.id), Some(0));
        assert!(list.remove(0).is_none());

        let item = list.add("C").unwrap();
        assert_eq!(item.id, 2);
        let ids: Vec<u32> = list.items().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_referees_are_case_sensitive_unique() {
        let mut referees = RefereeList::new();
        referees.add(" judge@example.com ").unwrap();

        assert_eq!(
            referees.add("judge@example.com"),
            Err(ValidationError::DuplicateReferee("judge@example.com".to_string()))
        );
        // Different case is a different referee
        referees.add("Judge@example.com").unwrap();
        assert_eq!(referees.add(""), Err(ValidationError::EmptyEmail));
        assert_eq!(referees.len(), 2);

        assert!(referees.remove("judge@example.com"));
        assert!(!referees.remove("judge@example.com"));
        assert_eq!(referees.as_slice(), ["Judge@example.com".to_string()]);
    }

    #[test]
    fn test_display_title_and_destination_fallbacks() {
        let untitled = Item {
            id: 5,
            title: Some("  ".to_string()),
            link: None,
            event_id: None,
        };
        assert_eq!(untitled.display_title(2), "Poster 3");
        assert_eq!(
            untitled.destination("https://vote.example.com/"),
            "https://vote.example.com/questionnaire/5"
        );

        let linked = Item::new(1, "Robotics").with_link("https://x.test/choose-role/q/1");
        assert_eq!(linked.display_title(0), "Robotics");
        assert_eq!(linked.destination("https://ignored"), "https://x.test/choose-role/q/1");
    }

    #[test]
    fn test_request_requires_both_lists() {
        let mut referees = RefereeList::new();
        referees.add("a@x.com").unwrap();

        assert_eq!(
            ExportRequest::new(EventMeta::new("1"), vec![], referees.clone()),
            Err(ValidationError::NoItems)
        );
        assert_eq!(
            ExportRequest::new(EventMeta::new("1"), vec![Item::new(0, "P1")], RefereeList::new()),
            Err(ValidationError::NoReferees)
        );
        let request = ExportRequest::new(EventMeta::new("1"), vec![Item::new(0, "P1")], referees);
        assert!(request.is_ok());
    }

    #[test]
    fn test_validation_messages_name_the_empty_list() {
        assert!(ValidationError::NoItems.to_string().contains("poster"));
        assert!(ValidationError::NoReferees.to_string().contains("referee"));
    }

    #[test]
    fn test_request_wire_format() {
        let request = ExportRequest {
            event: EventMeta {
                event_id: Some("42".to_string()),
                questionnaire_id: Some("q-7".to_string()),
                status: Some("pending".to_string()),
                organizer_id: None,
                event_title: None,
            },
            items: vec![Item::new(0, "P1")],
            referees: vec!["a@x.com".to_string()],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "eventData": { "eventID": "42", "questionnaireID": "q-7", "status": "pending" },
                "posters": [{ "PosterID": 0, "Title": "P1" }],
                "refereeList": ["a@x.com"]
            })
        );

        let parsed: ExportRequest = serde_json::from_value(json!({
            "eventData": { "eventID": "42" },
            "posters": [{ "PosterID": 3, "content": "https://x.test/3" }]
        }))
        .unwrap();
        assert_eq!(parsed.items[0].link.as_deref(), Some("https://x.test/3"));
        assert_eq!(parsed.validate(), Err(ValidationError::NoReferees));
    }

    #[test]
    fn test_blank_event_id_is_absent() {
        let meta = EventMeta::new("  ");
        assert_eq!(meta.event_id(), None);
        assert_eq!(EventMeta::new("7").event_id(), Some("7"));
    }
}
