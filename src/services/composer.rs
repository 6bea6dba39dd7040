//! Draft composer: replies to an email, or a new email from instructions.

use serde::{Deserialize, Serialize};

use crate::domain::{Email, EmailId, NewDraft, PromptName};

use super::gateway::{GatewayResult, LlmGateway};
use super::prompt_catalog::PromptCatalog;

const DRAFTING_ROLE: &str =
    "You are an email drafting assistant. Create professional email drafts.";

/// Subject used when the model output has no "Subject:" line.
pub const DEFAULT_DRAFT_SUBJECT: &str = "Draft Email";

const SUBJECT_PREFIX: &str = "subject:";

/// A draft produced by the model. Not persisted until saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDraft {
    pub subject: String,
    pub body: String,
    pub to: String,
    pub in_reply_to: Option<EmailId>,
}

impl From<GeneratedDraft> for NewDraft {
    fn from(draft: GeneratedDraft) -> Self {
        NewDraft {
            subject: draft.subject,
            body: draft.body,
            to: draft.to,
            in_reply_to: draft.in_reply_to,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DraftComposer {
    catalog: PromptCatalog,
    gateway: LlmGateway,
}

impl DraftComposer {
    pub fn new(catalog: PromptCatalog, gateway: LlmGateway) -> Self {
        Self { catalog, gateway }
    }

    /// Generates a draft using the `auto_reply` template.
    ///
    /// With an original email the draft is addressed back to its sender and
    /// linked to it by id.
    pub async fn generate_draft(
        &self,
        original: Option<&Email>,
        instructions: &str,
    ) -> GatewayResult<GeneratedDraft> {
        let template = self.catalog.required_content(PromptName::AutoReply).await?;
        let prompt = draft_prompt(&template, original, instructions);

        tracing::debug!(in_reply_to = ?original.map(|e| &e.id), "Generating draft");
        let text = self.gateway.complete(Some(DRAFTING_ROLE), &prompt).await?;
        let (subject, body) = parse_draft_response(&text);

        Ok(GeneratedDraft {
            subject,
            body,
            to: original.map(|e| e.sender.clone()).unwrap_or_default(),
            in_reply_to: original.map(|e| e.id.clone()),
        })
    }
}

fn draft_prompt(template: &str, original: Option<&Email>, instructions: &str) -> String {
    match original {
        Some(email) => format!(
            "{template}\n\nOriginal Email:\nFrom: {}\nSubject: {}\nBody: {}\n\n\
             Additional Instructions: {instructions}",
            email.sender, email.subject, email.body
        ),
        None => format!("{template}\n\nNew Email Instructions: {instructions}"),
    }
}

/// Splits model output into `(subject, body)`.
///
/// The first line starting with "subject:" (any case) gives the subject and
/// everything after it is the body. Without such a line the subject is
/// [`DEFAULT_DRAFT_SUBJECT`] and the whole text is the body.
pub fn parse_draft_response(text: &str) -> (String, String) {
    let lines: Vec<&str> = text.split('\n').collect();

    for (i, line) in lines.iter().enumerate() {
        let is_subject = line
            .get(..SUBJECT_PREFIX.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SUBJECT_PREFIX));
        if is_subject {
            let subject = line[SUBJECT_PREFIX.len()..].trim().to_string();
            let body = lines[i + 1..].join("\n").trim().to_string();
            return (subject, body);
        }
    }

    (DEFAULT_DRAFT_SUBJECT.to_string(), text.trim().to_string())
}
