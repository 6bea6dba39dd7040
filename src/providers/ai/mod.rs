//! LLM provider implementations.
//!
//! This module provides a small interface for chat-completion providers and an
//! implementation for any OpenAI-compatible endpoint (OpenAI, vLLM, LM Studio,
//! Ollama's `/v1` API).
//!
//! # Example
//!
//! ```rust,no_run
//! use inbox_agent::providers::ai::{
//!     CompletionRequest, LlmProvider, Message, OpenAiCompatibleProvider,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let openai = OpenAiCompatibleProvider::openai("sk-...", "gpt-3.5-turbo");
//!
//! let request = CompletionRequest::new(vec![Message::user("Hello!")])
//!     .with_system_prompt("You are a helpful assistant.");
//!
//! let response = openai.complete(&request).await?;
//! println!("Response: {}", response.text);
//! # Ok(())
//! # }
//! ```

mod openai;
mod traits;

pub use openai::{OpenAiCompatibleProvider, OPENAI_BASE_URL};
pub use traits::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, LlmResult,
    Message, Role, TokenUsage,
};
