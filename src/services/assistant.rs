//! Conversational assistant over one email or the whole inbox.

use crate::domain::Email;

use super::gateway::{GatewayResult, LlmGateway};

const EMAIL_ASSISTANT_ROLE: &str =
    "You are an email productivity assistant. Help the user understand and manage their emails.";
const INBOX_ASSISTANT_ROLE: &str = "You are an inbox management assistant. Help the user understand and manage their entire email inbox.";

/// Answers free-text questions. Each call is independent; nothing is remembered.
#[derive(Debug, Clone)]
pub struct ConversationalAssistant {
    gateway: LlmGateway,
    digest_limit: usize,
}

impl ConversationalAssistant {
    pub const DEFAULT_DIGEST_LIMIT: usize = 10;

    pub fn new(gateway: LlmGateway) -> Self {
        Self {
            gateway,
            digest_limit: Self::DEFAULT_DIGEST_LIMIT,
        }
    }

    /// Caps how many emails are listed in the inbox digest.
    pub fn with_digest_limit(mut self, limit: usize) -> Self {
        self.digest_limit = limit;
        self
    }

    pub async fn chat_about_email(&self, email: &Email, query: &str) -> GatewayResult<String> {
        let prompt = format!("Context:\n{}\n\nUser Question: {query}", email_context(email));
        tracing::debug!(email_id = %email.id, "Chatting about email");
        self.gateway.complete(Some(EMAIL_ASSISTANT_ROLE), &prompt).await
    }

    pub async fn chat_about_inbox(&self, emails: &[Email], query: &str) -> GatewayResult<String> {
        let prompt = format!(
            "Inbox Overview:\n{}\n\nUser Question: {query}",
            inbox_digest(emails, self.digest_limit)
        );
        tracing::debug!(total = emails.len(), "Chatting about inbox");
        self.gateway.complete(Some(INBOX_ASSISTANT_ROLE), &prompt).await
    }
}

/// Email fields plus whatever processing has produced so far.
pub fn email_context(email: &Email) -> String {
    let actions = email
        .actions
        .as_ref()
        .and_then(|actions| serde_json::to_string_pretty(actions).ok())
        .unwrap_or_else(|| "{}".to_string());

    format!(
        "Email Details:\nFrom: {}\nSubject: {}\nDate: {}\nBody: {}\n\n\
         Processing Results:\nCategory: {}\nActions: {}\nSummary: {}",
        email.sender,
        email.subject,
        email.date,
        email.body,
        email.category.as_deref().unwrap_or("Not categorized"),
        actions,
        email.summary.as_deref().unwrap_or("Not summarized"),
    )
}

/// Total count, then one line for each of the first `limit` emails.
pub fn inbox_digest(emails: &[Email], limit: usize) -> String {
    let mut digest = format!("Total emails: {}\n\n", emails.len());
    for (i, email) in emails.iter().take(limit).enumerate() {
        digest.push_str(&format!(
            "{}. From: {}, Subject: {}, Category: {}\n",
            i + 1,
            email.sender,
            email.subject,
            email.category.as_deref().unwrap_or("Unknown"),
        ));
    }
    digest
}
