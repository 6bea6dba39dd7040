//! Domain layer types for the inbox agent.
//!
//! This module contains the records the rest of the crate passes around:
//! emails and their derived fields, prompt templates, and drafts.

mod draft;
mod email;
mod prompt;
mod types;

pub use draft::{Draft, NewDraft};
pub use email::{ActionItems, Email, ImportedEmail, Task};
pub use prompt::{defaults as default_prompts, PromptName, PromptTemplate, UnknownPromptName};
pub use types::{DraftId, EmailId};
