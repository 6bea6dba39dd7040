//! Errors reported by the dispatch layer.

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::SettingsError;
use crate::providers::ai::LlmError;
use crate::services::GatewayFailure;
use crate::storage::{DatabaseError, KeychainError};

/// Errors that can occur while dispatching a request.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Referenced email, draft or prompt does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A required field is missing or invalid.
    #[error("{0}")]
    InvalidRequest(String),

    /// The model call failed.
    #[error("Error processing request: {}", .0.detail)]
    Gateway(#[from] GatewayFailure),

    #[error("storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("credential storage error: {0}")]
    Credentials(#[from] KeychainError),

    #[error("configuration error: {0}")]
    Settings(#[from] SettingsError),

    #[error("provider setup failed: {0}")]
    Provider(#[from] LlmError),
}

impl ServiceError {
    /// The flat `{"error": text}` shape returned to clients.
    pub fn to_error_json(&self) -> Value {
        json!({ "error": self.to_string() })
    }

    /// Whether the caller, rather than the system, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ServiceError::NotFound(_) | ServiceError::InvalidRequest(_))
    }
}

/// Result type for dispatch operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
