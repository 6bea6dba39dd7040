//! inbox-agent - An LLM-assisted email productivity agent
//!
//! This crate provides categorization, action-item extraction, summaries,
//! inbox chat and reply drafting over a local SQLite record store, with
//! user-editable prompt templates driving every model call.

pub mod app;
pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
pub mod storage;

pub use app::{AgentApp, ServiceError};
