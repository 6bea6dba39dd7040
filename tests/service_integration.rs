//! Integration tests for the agent's services.
//!
//! These tests drive [`AgentApp`] against an on-disk SQLite database and a
//! scripted model, checking behavior across module boundaries. Each service
//! module contains its own unit tests for detailed logic testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use inbox_agent::domain::{ActionItems, EmailId, NewDraft, PromptName};
use inbox_agent::providers::ai::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, LlmResult,
};
use inbox_agent::services::{
    inbox_digest, parse_draft_response, FailureReason, LlmGateway, ProcessingMode,
    ProcessingStep,
};
use inbox_agent::storage::StorageLayer;
use inbox_agent::{AgentApp, ServiceError};

/// Answers by system role, or fails every call when `offline`.
struct ScriptedModel {
    offline: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn online() -> Arc<Self> {
        Arc::new(Self {
            offline: false,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn offline() -> Arc<Self> {
        Arc::new(Self {
            offline: true,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> LlmResult<CompletionResponse> {
        let prompt = request.user_prompt().unwrap_or_default().to_string();
        self.prompts.lock().unwrap().push(prompt);

        if self.offline {
            return Err(LlmError::ApiError {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }

        let role = request.system_prompt.as_deref().unwrap_or_default();
        let text = if role.contains("categorization") {
            "To-Do"
        } else if role.contains("action item") {
            r#"{"tasks": [{"task": "Review budget", "deadline": "Friday", "priority": "high"}]}"#
        } else if role.contains("summarization") {
            "- Budget needs approval by Friday"
        } else if role.contains("drafting") {
            "Subject: Re: Budget\n\nHi,\n\nThe budget is approved.\n\nBest"
        } else {
            "You have several emails needing attention."
        };
        Ok(CompletionResponse::text(text))
    }

    fn model(&self) -> &str {
        "scripted-1"
    }
}

async fn open_app(model: &Arc<ScriptedModel>) -> (AgentApp, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let storage = StorageLayer::new(dir.path().join("data").join("emails.db"))
        .await
        .unwrap();
    let app = AgentApp::new(storage, LlmGateway::new(model.clone()))
        .with_mock_inbox_path(dir.path().join("mock_inbox.json"));
    app.load_mock_inbox().await.unwrap();
    (app, dir)
}

// ============================================================================
// Processing
// ============================================================================

#[tokio::test]
async fn process_all_populates_and_persists_every_field() {
    let model = ScriptedModel::online();
    let (app, _dir) = open_app(&model).await;
    let id = EmailId::from("3");

    let result = app.process_email(&id, ProcessingMode::All).await.unwrap();
    assert!(result.is_success());

    let email = app.get_email(&id).await.unwrap();
    assert!(email.is_processed);
    assert_eq!(email.category.as_deref(), Some("To-Do"));
    assert_eq!(email.actions.unwrap().tasks[0].task, "Review budget");
    assert_eq!(
        email.summary.as_deref(),
        Some("- Budget needs approval by Friday")
    );
}

#[tokio::test]
async fn summary_mode_leaves_other_fields_alone() {
    let model = ScriptedModel::online();
    let (app, _dir) = open_app(&model).await;
    let id = EmailId::from("1");

    app.process_email(&id, ProcessingMode::Categorize)
        .await
        .unwrap();
    let result = app.process_email(&id, ProcessingMode::Summary).await.unwrap();

    assert!(result.category.is_none());
    assert!(result.actions.is_none());
    assert!(result.summary.is_some());

    let email = app.get_email(&id).await.unwrap();
    assert_eq!(email.category.as_deref(), Some("To-Do"));
    assert!(email.summary.is_some());
}

#[tokio::test]
async fn processing_twice_gives_same_result() {
    let model = ScriptedModel::online();
    let (app, _dir) = open_app(&model).await;
    let id = EmailId::from("5");

    let first = app.process_email(&id, ProcessingMode::All).await.unwrap();
    let second = app.process_email(&id, ProcessingMode::All).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn offline_model_tags_every_step() {
    let model = ScriptedModel::offline();
    let (app, _dir) = open_app(&model).await;

    let result = app
        .process_email(&EmailId::from("2"), ProcessingMode::All)
        .await
        .unwrap();

    assert_eq!(result.actions, Some(ActionItems::empty()));
    assert!(result
        .category
        .unwrap()
        .starts_with("Error processing request: "));
    let steps: Vec<ProcessingStep> = result.failures.iter().map(|f| f.step).collect();
    assert_eq!(
        steps,
        vec![
            ProcessingStep::Categorize,
            ProcessingStep::Actions,
            ProcessingStep::Summary
        ]
    );
    assert!(result
        .failures
        .iter()
        .all(|f| f.failure.reason == FailureReason::Api));

    let email = app.get_email(&EmailId::from("2")).await.unwrap();
    assert!(!email.is_processed);
    assert!(email.category.is_none());
}

#[tokio::test]
async fn edited_prompt_is_used_on_next_call() {
    let model = ScriptedModel::online();
    let (app, _dir) = open_app(&model).await;

    app.update_prompt("categorization", "Label as Work or Personal.")
        .await
        .unwrap();
    app.process_email(&EmailId::from("1"), ProcessingMode::Categorize)
        .await
        .unwrap();

    let prompts = model.prompts();
    assert!(prompts
        .last()
        .unwrap()
        .starts_with("Label as Work or Personal.\n\nEmail Content:\nFrom: "));
}

// ============================================================================
// Prompts
// ============================================================================

#[tokio::test]
async fn prompts_survive_reopen() {
    let model = ScriptedModel::online();
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("emails.db");

    {
        let storage = StorageLayer::new(&db_path).await.unwrap();
        let app = AgentApp::new(storage, LlmGateway::new(model.clone()));
        app.update_prompt("summary", "One line only.").await.unwrap();
    }

    let storage = StorageLayer::new(&db_path).await.unwrap();
    let app = AgentApp::new(storage, LlmGateway::new(model.clone()));
    let prompts = app.list_prompts().await.unwrap();

    assert_eq!(prompts.len(), 4);
    assert_eq!(prompts[&PromptName::Summary].content, "One line only.");
}

#[tokio::test]
async fn unknown_prompt_name_is_rejected() {
    let model = ScriptedModel::online();
    let (app, _dir) = open_app(&model).await;

    let err = app.update_prompt("signature", "Cheers").await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidRequest(_)));
}

// ============================================================================
// Chat
// ============================================================================

#[tokio::test]
async fn inbox_chat_lists_first_ten_only() {
    let model = ScriptedModel::online();
    let (app, _dir) = open_app(&model).await;

    let emails = app.list_emails().await.unwrap();
    let mut fifteen = emails.clone();
    fifteen.extend(emails.into_iter().take(5));

    let digest = inbox_digest(&fifteen, 10);
    assert!(digest.starts_with("Total emails: 15\n\n"));
    assert!(digest.contains("\n10. From: "));
    assert!(!digest.contains("\n11. From: "));

    let response = app.chat("What needs my attention?", None).await.unwrap();
    assert_eq!(response, "You have several emails needing attention.");
    assert!(model.prompts()[0].starts_with("Inbox Overview:\nTotal emails: 10\n\n"));
}

#[tokio::test]
async fn chat_about_unknown_email_is_not_found() {
    let model = ScriptedModel::online();
    let (app, _dir) = open_app(&model).await;

    let err = app
        .chat("Who sent this?", Some(&EmailId::from("404")))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_error_json(),
        serde_json::json!({"error": "Email not found"})
    );
}

// ============================================================================
// Drafts
// ============================================================================

#[test]
fn draft_subject_parsing() {
    assert_eq!(
        parse_draft_response("Subject: Re: Budget\nLine one\nLine two\n"),
        ("Re: Budget".to_string(), "Line one\nLine two".to_string())
    );
    assert_eq!(
        parse_draft_response("  Thanks for the update!  "),
        ("Draft Email".to_string(), "Thanks for the update!".to_string())
    );
}

#[tokio::test]
async fn generated_reply_round_trips_through_store() {
    let model = ScriptedModel::online();
    let (app, _dir) = open_app(&model).await;
    let original = app.get_email(&EmailId::from("3")).await.unwrap();

    let generated = app
        .generate_draft(Some(&original.id), "Approve the budget")
        .await
        .unwrap();
    assert_eq!(generated.subject, "Re: Budget");
    assert_eq!(generated.body, "Hi,\n\nThe budget is approved.\n\nBest");
    assert_eq!(generated.to, original.sender);

    let saved = app.save_draft(NewDraft::from(generated.clone())).await.unwrap();
    let loaded = app.get_draft(&saved.id).await.unwrap();

    assert_eq!(loaded.subject, generated.subject);
    assert_eq!(loaded.body, generated.body);
    assert_eq!(loaded.to, generated.to);
    assert_eq!(loaded.in_reply_to, Some(original.id));
}

#[tokio::test]
async fn drafts_list_newest_first() {
    let model = ScriptedModel::online();
    let (app, _dir) = open_app(&model).await;

    let first = app
        .save_draft(NewDraft {
            subject: "First".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = app
        .save_draft(NewDraft {
            subject: "Second".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<_> = app
        .list_drafts()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}
