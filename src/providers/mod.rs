//! External service providers.
//!
//! - [`ai`] - chat-completion providers used by the LLM gateway

pub mod ai;
