//! LLM Gateway Trait and Implementation
//!
//! The gateway owns every network interaction with the model server. All
//! network failures stop here: health and catalog calls degrade to
//! `false`/empty, generation returns a tagged `LLMError` that
//! `generate_response` renders into the user's language.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::client::LLMClient;
use super::models::*;
use super::selection::ModelSelection;
use crate::utils::Locale;

// ============================================================================
// LLM Gateway Trait
// ============================================================================

#[async_trait]
pub trait LLMGateway: Send + Sync {
    /// Language used for prompts and rendered failures
    fn locale(&self) -> Locale;

    fn base_url(&self) -> &str;

    /// Model that the next generation will use
    fn current_model(&self) -> String;

    /// True iff the model catalog endpoint answers with a success status
    async fn check_health(&self) -> bool;

    /// Model identifiers sorted ascending; empty on any failure
    async fn list_models(&self) -> Vec<String>;

    /// Overwrite the active model without checking the catalog
    async fn set_model(&self, name: &str);

    /// Re-fetches the catalog on every call
    async fn validate_model(&self, name: &str) -> bool {
        self.list_models().await.iter().any(|m| m == name)
    }

    /// Validated switch: the catalog check and the write happen under one
    /// update token
    async fn switch_model(&self, name: &str) -> Result<(), ModelSwitchError>;

    /// Submit a prompt, with optional structured context appended
    async fn generate(&self, prompt: &str, context: Option<&Value>) -> Result<String, LLMError>;

    /// Like `generate`, but failures come back as the localized message
    async fn generate_response(&self, prompt: &str, context: Option<&Value>) -> String {
        match self.generate(prompt, context).await {
            Ok(text) => text,
            Err(e) => e.user_message(self.locale()),
        }
    }
}

// ============================================================================
// LLM Gateway Implementation
// ============================================================================

pub struct LLMGatewayImpl {
    client: LLMClient,
    selection: Arc<ModelSelection>,
    settings: GatewaySettings,
}

impl LLMGatewayImpl {
    pub fn new(selection: Arc<ModelSelection>, settings: GatewaySettings) -> Result<Self, LLMError> {
        Ok(Self::with_client(LLMClient::new()?, selection, settings))
    }

    /// Create with custom client (for testing)
    pub fn with_client(
        client: LLMClient,
        selection: Arc<ModelSelection>,
        settings: GatewaySettings,
    ) -> Self {
        Self { client, selection, settings }
    }

    async fn fetch_catalog(&self) -> Result<Vec<String>, LLMError> {
        self.client
            .fetch_models(self.selection.base_url(), self.settings.health_timeout)
            .await
    }
}

/// Persona, question and optional pretty-printed context in one message
pub(crate) fn compose_prompt(
    locale: Locale,
    prompt: &str,
    context: Option<&Value>,
) -> Result<String, LLMError> {
    let mut full_prompt = format!(
        "{}\n\n{}: {}",
        locale.system_persona(),
        locale.question_label(),
        prompt
    );

    if let Some(context) = context {
        let rendered = serde_json::to_string_pretty(context)?;
        full_prompt.push_str(&format!("\n\n{}: {}", locale.context_label(), rendered));
    }

    Ok(full_prompt)
}

#[async_trait]
impl LLMGateway for LLMGatewayImpl {
    fn locale(&self) -> Locale {
        self.settings.locale
    }

    fn base_url(&self) -> &str {
        self.selection.base_url()
    }

    fn current_model(&self) -> String {
        self.selection.current_model()
    }

    async fn check_health(&self) -> bool {
        match self
            .client
            .probe(self.selection.base_url(), self.settings.health_timeout)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Model server health check failed: {}", e);
                false
            },
        }
    }

    async fn list_models(&self) -> Vec<String> {
        match self.fetch_catalog().await {
            Ok(models) => {
                tracing::info!("Found {} models on model server", models.len());
                models
            },
            Err(LLMError::Timeout(secs)) => {
                tracing::error!("Timeout after {}s getting models from model server", secs);
                Vec::new()
            },
            Err(e) => {
                tracing::error!("Error getting available models: {}", e);
                Vec::new()
            },
        }
    }

    async fn set_model(&self, name: &str) {
        let token = self.selection.begin_update().await;
        let previous = token.set_model(name);
        tracing::info!("Model changed from '{}' to '{}'", previous, name);
    }

    async fn switch_model(&self, name: &str) -> Result<(), ModelSwitchError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ModelSwitchError::EmptyName);
        }

        let token = self.selection.begin_update().await;

        let available = self.list_models().await;
        tracing::debug!("Available models: {:?}", available);

        if !available.iter().any(|m| m == name) {
            tracing::warn!("Rejected switch to unknown model '{}'", name);
            return Err(ModelSwitchError::Unavailable { model: name.to_string(), available });
        }

        let previous = token.set_model(name);
        tracing::info!("Model changed from '{}' to '{}'", previous, name);
        Ok(())
    }

    async fn generate(&self, prompt: &str, context: Option<&Value>) -> Result<String, LLMError> {
        let model = self.selection.current_model();
        let content = compose_prompt(self.settings.locale, prompt, context)?;

        let result = self
            .client
            .chat_completion(
                self.selection.base_url(),
                &model,
                content,
                &self.settings.generation,
                self.selection.request_timeout(),
            )
            .await;

        match &result {
            Ok(text) => tracing::debug!("Model '{}' returned {} chars", model, text.len()),
            Err(LLMError::Timeout(secs)) => {
                tracing::error!("Model server request timeout after {}s", secs)
            },
            Err(e) => tracing::error!("Error generating response: {}", e),
        }

        result
    }
}
