//! Email domain types.
//!
//! Represents imported emails together with the fields derived from them
//! by LLM processing (category, action items, summary).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EmailId;

/// A stored email and its processing results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// Unique identifier for this email.
    pub id: EmailId,
    /// Sender address as shown in the inbox.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Display date. Not guaranteed to be parseable.
    pub date: String,
    /// Category assigned by the model, verbatim.
    pub category: Option<String>,
    /// Action items extracted by the model.
    pub actions: Option<ActionItems>,
    /// Model-written summary.
    pub summary: Option<String>,
    /// Whether processing results have been written for this email.
    pub is_processed: bool,
    /// When the email was imported.
    pub created_at: Option<DateTime<Utc>>,
}

impl Email {
    /// Creates an unprocessed email.
    pub fn new(
        id: impl Into<EmailId>,
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
            date: date.into(),
            category: None,
            actions: None,
            summary: None,
            is_processed: false,
            created_at: None,
        }
    }
}

/// Structured action items: `{"tasks": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItems {
    pub tasks: Vec<Task>,
}

impl ActionItems {
    /// An empty task list.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses model output or stored JSON into action items.
    ///
    /// Returns `None` when the text is not a JSON object with a `tasks` list.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text.trim()).ok()
    }

    /// Parses stored JSON, treating anything malformed as an empty task list.
    pub fn parse_or_empty(text: &str) -> Self {
        Self::parse(text).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A single extracted task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// What needs to be done.
    #[serde(default)]
    pub task: String,
    /// Deadline as written in the email, if any.
    #[serde(default)]
    pub deadline: Option<String>,
    /// Priority label (high/medium/low), if the model gave one.
    #[serde(default)]
    pub priority: Option<String>,
}

/// An email as it appears in a bulk-import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedEmail {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub date: String,
}

impl From<ImportedEmail> for Email {
    fn from(imported: ImportedEmail) -> Self {
        Email::new(
            imported.id,
            imported.from,
            imported.subject,
            imported.body,
            imported.date,
        )
    }
}
