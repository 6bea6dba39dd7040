//! Draft domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DraftId, EmailId};

/// A saved draft. Drafts are immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: DraftId,
    pub subject: String,
    pub body: String,
    /// Recipient address.
    pub to: String,
    /// Email this draft replies to, if any.
    pub in_reply_to: Option<EmailId>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when saving a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDraft {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub in_reply_to: Option<EmailId>,
}

impl NewDraft {
    /// Stamps the draft with a fresh id and creation time.
    pub fn into_draft(self) -> Draft {
        Draft {
            id: DraftId::generate(),
            subject: self.subject,
            body: self.body,
            to: self.to,
            in_reply_to: self.in_reply_to,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_draft_keeps_fields() {
        let new = NewDraft {
            subject: "Re: Budget".to_string(),
            body: "Looks good.".to_string(),
            to: "cfo@example.com".to_string(),
            in_reply_to: Some(EmailId::from("4")),
        };

        let draft = new.clone().into_draft();
        assert_eq!(draft.subject, new.subject);
        assert_eq!(draft.body, new.body);
        assert_eq!(draft.to, new.to);
        assert_eq!(draft.in_reply_to, new.in_reply_to);
        assert!(!draft.id.0.is_empty());
    }

    #[test]
    fn new_draft_fields_default_when_missing() {
        let new: NewDraft = serde_json::from_str(r#"{"subject":"Hello"}"#).unwrap();
        assert_eq!(new.subject, "Hello");
        assert!(new.body.is_empty());
        assert!(new.in_reply_to.is_none());
    }
}
