//! LLM gateway: one chat-completion call per assembled prompt.
//!
//! The gateway never surfaces transport errors as [`LlmError`]. Every failure
//! is logged and returned as a [`GatewayFailure`] carrying a reason code, so
//! callers branch on the tag instead of inspecting response text.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::providers::ai::{CompletionRequest, LlmError, LlmProvider, Message};

/// Prefix of the legacy text rendering of a failed call.
pub const FAILURE_TEXT_PREFIX: &str = "Error processing request: ";

/// Why a gateway call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Connection, DNS, TLS or timeout problems.
    Network,
    /// The API rejected the credentials.
    Authentication,
    /// The API asked us to slow down.
    RateLimited,
    /// Any other non-success API status.
    Api,
    /// The API answered with something we could not decode.
    InvalidResponse,
    /// No provider, or a required prompt template is missing.
    Unavailable,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Network => "network",
            FailureReason::Authentication => "authentication",
            FailureReason::RateLimited => "rate_limited",
            FailureReason::Api => "api",
            FailureReason::InvalidResponse => "invalid_response",
            FailureReason::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{reason}: {detail}")]
pub struct GatewayFailure {
    pub reason: FailureReason,
    pub detail: String,
}

impl GatewayFailure {
    pub fn new(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    /// Renders the failure the way it appears when embedded in a text field:
    /// `"Error processing request: <detail>"`.
    pub fn to_compat_text(&self) -> String {
        format!("{}{}", FAILURE_TEXT_PREFIX, self.detail)
    }
}

impl From<LlmError> for GatewayFailure {
    fn from(err: LlmError) -> Self {
        let reason = match &err {
            LlmError::HttpError(e) if e.is_decode() => FailureReason::InvalidResponse,
            LlmError::HttpError(_) => FailureReason::Network,
            LlmError::ApiError { .. } => FailureReason::Api,
            LlmError::InvalidResponse(_) => FailureReason::InvalidResponse,
            LlmError::RateLimited { .. } => FailureReason::RateLimited,
            LlmError::AuthenticationError(_) => FailureReason::Authentication,
            LlmError::Unavailable(_) => FailureReason::Unavailable,
        };
        Self::new(reason, err.to_string())
    }
}

/// Result of a gateway call.
pub type GatewayResult<T> = Result<T, GatewayFailure>;

/// Wraps an [`LlmProvider`] with the fixed sampling parameters used for every
/// email-processing call.
#[derive(Clone)]
pub struct LlmGateway {
    provider: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: Option<usize>,
}

impl LlmGateway {
    /// Low temperature keeps categorization and extraction close to deterministic.
    pub const DEFAULT_TEMPERATURE: f32 = 0.3;

    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Model identifier of the wrapped provider.
    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Sends one prompt with an optional system role and returns the raw text.
    pub async fn complete(&self, system_role: Option<&str>, prompt: &str) -> GatewayResult<String> {
        let mut request = CompletionRequest::new(vec![Message::user(prompt)])
            .with_temperature(self.temperature);
        if let Some(role) = system_role {
            request = request.with_system_prompt(role);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            prompt_chars = prompt.len(),
            "Sending completion request"
        );

        match self.provider.complete(&request).await {
            Ok(response) => {
                tracing::debug!(
                    tokens = response.tokens_used.total_tokens,
                    finish_reason = ?response.finish_reason,
                    "Completion received"
                );
                Ok(response.text)
            }
            Err(err) => {
                let failure = GatewayFailure::from(err);
                tracing::error!(reason = %failure.reason, detail = %failure.detail, "LLM call failed");
                Err(failure)
            }
        }
    }
}

impl fmt::Debug for LlmGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmGateway")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model())
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Provider used when no API key is configured.
///
/// Every call fails with [`LlmError::Unavailable`], so the rest of the
/// application keeps working and reports the problem per request.
pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn complete(
        &self,
        _request: &CompletionRequest,
    ) -> crate::providers::ai::LlmResult<crate::providers::ai::CompletionResponse> {
        Err(LlmError::Unavailable(self.reason.clone()))
    }

    fn model(&self) -> &str {
        ""
    }
}
