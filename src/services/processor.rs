//! Processing orchestrator: category, action items and summary for one email.
//!
//! Each step builds its own prompt from a catalog template plus literal email
//! fields and makes its own gateway call. Steps share no state, and a failed
//! step never stops the others.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{ActionItems, Email, PromptName};

use super::gateway::{GatewayFailure, LlmGateway};
use super::prompt_catalog::PromptCatalog;

const CATEGORIZATION_ROLE: &str = "You are an email categorization assistant.";
const ACTION_EXTRACTION_ROLE: &str = "You are an action item extraction assistant.";
const SUMMARIZATION_ROLE: &str = "You are an email summarization assistant.";

/// Used when the summary template row is missing.
pub const FALLBACK_SUMMARY_INSTRUCTION: &str = "Summarize this email concisely:";

/// Which derived fields a processing call populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    #[default]
    All,
    Categorize,
    Actions,
    Summary,
}

impl ProcessingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::All => "all",
            ProcessingMode::Categorize => "categorize",
            ProcessingMode::Actions => "actions",
            ProcessingMode::Summary => "summary",
        }
    }

    fn includes(&self, step: ProcessingStep) -> bool {
        match self {
            ProcessingMode::All => true,
            ProcessingMode::Categorize => step == ProcessingStep::Categorize,
            ProcessingMode::Actions => step == ProcessingStep::Actions,
            ProcessingMode::Summary => step == ProcessingStep::Summary,
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ProcessingMode::All),
            "categorize" => Ok(ProcessingMode::Categorize),
            "actions" => Ok(ProcessingMode::Actions),
            "summary" => Ok(ProcessingMode::Summary),
            other => Err(format!(
                "Unknown processing mode '{other}' (expected all, categorize, actions or summary)"
            )),
        }
    }
}

/// One gateway call within a processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStep {
    Categorize,
    Actions,
    Summary,
}

/// A step whose gateway call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFailure {
    pub step: ProcessingStep,
    #[serde(flatten)]
    pub failure: GatewayFailure,
}

/// Fields produced by a processing run.
///
/// Only the fields selected by the mode are `Some`. A failed categorize or
/// summary step still fills its field with the compatibility error text; the
/// failure itself is listed in `failures`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<ActionItems>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StepFailure>,
}

impl ProcessingResult {
    /// Whether every selected step reached the model successfully.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds prompts from the catalog and runs them through the gateway.
#[derive(Debug, Clone)]
pub struct ProcessingOrchestrator {
    catalog: PromptCatalog,
    gateway: LlmGateway,
}

impl ProcessingOrchestrator {
    pub fn new(catalog: PromptCatalog, gateway: LlmGateway) -> Self {
        Self { catalog, gateway }
    }

    /// Runs the steps selected by `mode`, in order categorize, actions, summary.
    pub async fn process(&self, email: &Email, mode: ProcessingMode) -> ProcessingResult {
        let mut result = ProcessingResult::default();
        tracing::info!(email_id = %email.id, %mode, "Processing email");

        if mode.includes(ProcessingStep::Categorize) {
            let category = match self.catalog.required_content(PromptName::Categorization).await {
                Ok(template) => {
                    self.gateway
                        .complete(Some(CATEGORIZATION_ROLE), &categorization_prompt(&template, email))
                        .await
                }
                Err(failure) => Err(failure),
            };

            result.category = Some(match category {
                Ok(text) => text,
                Err(failure) => {
                    let text = failure.to_compat_text();
                    result.failures.push(StepFailure {
                        step: ProcessingStep::Categorize,
                        failure,
                    });
                    text
                }
            });
        }

        if mode.includes(ProcessingStep::Actions) {
            let response = match self.catalog.required_content(PromptName::ActionExtraction).await {
                Ok(template) => {
                    self.gateway
                        .complete(Some(ACTION_EXTRACTION_ROLE), &action_prompt(&template, email))
                        .await
                }
                Err(failure) => Err(failure),
            };

            result.actions = Some(match response {
                Ok(text) => parse_actions(&text),
                Err(failure) => {
                    result.failures.push(StepFailure {
                        step: ProcessingStep::Actions,
                        failure,
                    });
                    ActionItems::empty()
                }
            });
        }

        if mode.includes(ProcessingStep::Summary) {
            let instruction = match self.catalog.content(PromptName::Summary).await {
                Ok(Some(content)) => content,
                Ok(None) => FALLBACK_SUMMARY_INSTRUCTION.to_string(),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not read summary template, using fallback");
                    FALLBACK_SUMMARY_INSTRUCTION.to_string()
                }
            };

            let summary = self
                .gateway
                .complete(Some(SUMMARIZATION_ROLE), &summary_prompt(&instruction, email))
                .await;

            result.summary = Some(match summary {
                Ok(text) => text,
                Err(failure) => {
                    let text = failure.to_compat_text();
                    result.failures.push(StepFailure {
                        step: ProcessingStep::Summary,
                        failure,
                    });
                    text
                }
            });
        }

        result
    }
}

fn categorization_prompt(template: &str, email: &Email) -> String {
    format!(
        "{template}\n\nEmail Content:\nFrom: {}\nSubject: {}\nBody: {}",
        email.sender, email.subject, email.body
    )
}

fn action_prompt(template: &str, email: &Email) -> String {
    format!("{template}\n\nEmail Content:\n{}", email.body)
}

fn summary_prompt(instruction: &str, email: &Email) -> String {
    format!("{instruction}\n\nEmail: {}", email.body)
}

/// Parses action-extraction output, falling back to an empty task list.
fn parse_actions(text: &str) -> ActionItems {
    ActionItems::parse(text).unwrap_or_else(|| {
        // Truncated output reads the same as "no tasks" to callers.
        tracing::warn!(
            response_chars = text.len(),
            "Action extraction response was not a tasks object, using empty list"
        );
        ActionItems::empty()
    })
}
