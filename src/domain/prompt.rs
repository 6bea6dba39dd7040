//! Prompt template domain types.
//!
//! The catalog holds exactly one template per [`PromptName`]. Template text is
//! an instruction block that gets prepended to literal email fields; it is
//! never interpolated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of template names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptName {
    Categorization,
    ActionExtraction,
    AutoReply,
    Summary,
}

impl PromptName {
    /// Every template name, in seeding order.
    pub const ALL: [PromptName; 4] = [
        PromptName::Categorization,
        PromptName::ActionExtraction,
        PromptName::AutoReply,
        PromptName::Summary,
    ];

    /// Storage key for this template.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptName::Categorization => "categorization",
            PromptName::ActionExtraction => "action_extraction",
            PromptName::AutoReply => "auto_reply",
            PromptName::Summary => "summary",
        }
    }

    /// Static description shown alongside the editable content.
    pub fn description(&self) -> &'static str {
        match self {
            PromptName::Categorization => "Categorize emails into predefined categories",
            PromptName::ActionExtraction => "Extract action items and tasks from emails",
            PromptName::AutoReply => "Generate automatic email replies",
            PromptName::Summary => "Generate email summaries",
        }
    }

    /// Content seeded into a fresh database.
    pub fn default_content(&self) -> &'static str {
        match self {
            PromptName::Categorization => defaults::CATEGORIZATION,
            PromptName::ActionExtraction => defaults::ACTION_EXTRACTION,
            PromptName::AutoReply => defaults::AUTO_REPLY,
            PromptName::Summary => defaults::SUMMARY,
        }
    }
}

impl fmt::Display for PromptName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown template name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown prompt template: {0}")]
pub struct UnknownPromptName(pub String);

impl FromStr for PromptName {
    type Err = UnknownPromptName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PromptName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownPromptName(s.to_string()))
    }
}

/// A stored prompt template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub name: PromptName,
    /// Editable instruction text.
    pub content: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl PromptTemplate {
    /// Builds the default template for a name.
    pub fn default_for(name: PromptName) -> Self {
        Self {
            name,
            content: name.default_content().to_string(),
            description: name.description().to_string(),
            updated_at: Utc::now(),
        }
    }
}

/// Default template text.
pub mod defaults {
    pub const CATEGORIZATION: &str = "Categorize emails into: Important, Newsletter, Spam, To-Do, Project Update.
Important: Urgent emails requiring immediate attention
Newsletter: Marketing or informational emails
Spam: Unwanted or promotional emails
To-Do: Emails containing direct requests requiring user action
Project Update: Progress reports or project status emails

Respond with only the category name.";

    pub const ACTION_EXTRACTION: &str = r#"Extract tasks and action items from the email. Respond in JSON format:
{
    "tasks": [
        {
            "task": "description of the task",
            "deadline": "deadline if mentioned",
            "priority": "high/medium/low"
        }
    ]
}

If no tasks are found, return empty tasks array."#;

    pub const AUTO_REPLY: &str = "Draft a polite and professional email reply. Consider the context and tone of the original email.
If it's a meeting request, ask for an agenda.
If it's a task request, acknowledge receipt and provide a tentative timeline.
Keep replies concise and professional.";

    pub const SUMMARY: &str =
        "Summarize this email in 2-3 bullet points highlighting key information and required actions.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_strings() {
        for name in PromptName::ALL {
            assert_eq!(name.as_str().parse::<PromptName>().unwrap(), name);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "signature".parse::<PromptName>().unwrap_err();
        assert_eq!(err, UnknownPromptName("signature".to_string()));
        assert_eq!(err.to_string(), "Unknown prompt template: signature");
    }

    #[test]
    fn serde_uses_storage_keys() {
        let json = serde_json::to_string(&PromptName::ActionExtraction).unwrap();
        assert_eq!(json, "\"action_extraction\"");

        let name: PromptName = serde_json::from_str("\"auto_reply\"").unwrap();
        assert_eq!(name, PromptName::AutoReply);
    }

    #[test]
    fn action_extraction_default_describes_tasks_shape() {
        let content = PromptName::ActionExtraction.default_content();
        assert!(content.contains("\"tasks\""));
        assert!(content.ends_with("return empty tasks array."));
    }

    #[test]
    fn default_template_has_description() {
        let template = PromptTemplate::default_for(PromptName::Summary);
        assert_eq!(template.description, "Generate email summaries");
        assert!(template.content.starts_with("Summarize this email"));
    }
}
