//! Business services layer.
//!
//! Each service owns the prompt assembly for one kind of request and talks to
//! the model only through the [`LlmGateway`].
//!
//! # Architecture
//!
//! ```text
//! Application Layer (AgentApp, CLI)
//!          |
//!          v
//!    Services Layer  <-- You are here
//!          |
//!          v
//! Infrastructure (Providers, Storage)
//! ```
//!
//! # Services Overview
//!
//! - [`PromptCatalog`]: Reads and edits the instruction templates
//! - [`LlmGateway`]: Wraps one chat-completion call and tags failures
//! - [`ProcessingOrchestrator`]: Categorizes, extracts actions from and summarizes an email
//! - [`ConversationalAssistant`]: Answers questions about an email or the inbox
//! - [`DraftComposer`]: Generates reply and new-email drafts

mod assistant;
mod composer;
mod gateway;
mod processor;
mod prompt_catalog;

pub use assistant::{email_context, inbox_digest, ConversationalAssistant};
pub use composer::{parse_draft_response, DraftComposer, GeneratedDraft, DEFAULT_DRAFT_SUBJECT};
pub use gateway::{
    FailureReason, GatewayFailure, GatewayResult, LlmGateway, UnconfiguredProvider,
    FAILURE_TEXT_PREFIX,
};
pub use processor::{
    ProcessingMode, ProcessingOrchestrator, ProcessingResult, ProcessingStep, StepFailure,
    FALLBACK_SUMMARY_INSTRUCTION,
};
pub use prompt_catalog::PromptCatalog;

#[cfg(test)]
pub(crate) use gateway::testing as gateway_testing;
