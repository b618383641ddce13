//! LLM Data Models
//!
//! Generation settings and the error types produced at the gateway boundary.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::Locale;

// ============================================================================
// Generation Settings
// ============================================================================

/// Sampling options sent with every chat completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { temperature: 0.7, top_p: 0.9, max_tokens: 1000 }
    }
}

/// Static gateway settings (everything except the switchable model)
#[derive(Debug, Clone, Copy)]
pub struct GatewaySettings {
    /// Bound for health checks and catalog fetches
    pub health_timeout: Duration,
    pub generation: GenerationOptions,
    pub locale: Locale,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            health_timeout: Duration::from_secs(5),
            generation: GenerationOptions::default(),
            locale: Locale::default(),
        }
    }
}

// ============================================================================
// LLM Error Types
// ============================================================================

/// Failures talking to the model server
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("LLM timeout after {0}s")]
    Timeout(u64),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("LLM API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response parsing error: {0}")]
    ParseError(String),

    #[error("Empty response from LLM")]
    EmptyResponse,

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl LLMError {
    /// Retrying is left to the end user; this only tells them whether it may help
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_) | Self::Status { .. })
    }

    /// Render the fixed user-facing message for this failure
    pub fn user_message(&self, locale: Locale) -> String {
        match self {
            Self::Timeout(_) => locale.request_timed_out().to_string(),
            Self::Status { status, .. } => locale.upstream_status_error(*status),
            Self::EmptyResponse => locale.empty_response().to_string(),
            other => locale.upstream_error(&other.to_string()),
        }
    }
}

/// Rejections from the model-switch workflow
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelSwitchError {
    #[error("Model name must not be empty")]
    EmptyName,

    #[error("Model '{model}' is not available")]
    Unavailable { model: String, available: Vec<String> },
}
