//! Analysis Orchestrator
//!
//! Runs one analysis end to end: health check, pre-analysis, context
//! rendering, prompt selection and generation. Holds no state besides the
//! gateway handle.

use std::sync::Arc;

use super::models::*;
use super::prompt::render_context;
use crate::services::llm::{LLMError, LLMGateway, ModelSwitchError};
use crate::services::topology::{self, Edge, Node};
use crate::utils::Locale;

#[derive(Clone)]
pub struct AnalysisOrchestrator {
    gateway: Arc<dyn LLMGateway>,
}

impl AnalysisOrchestrator {
    pub fn new(gateway: Arc<dyn LLMGateway>) -> Self {
        Self { gateway }
    }

    pub fn locale(&self) -> Locale {
        self.gateway.locale()
    }

    /// Narrative for a diagram and an optional question. Never fails; any
    /// problem comes back as localized text.
    pub async fn get_analysis(&self, nodes: &[Node], edges: &[Edge], question: Option<&str>) -> String {
        self.run_analysis(nodes, edges, AnalysisKind::General(question))
            .await
            .narrative
    }

    pub async fn run_analysis(
        &self,
        nodes: &[Node],
        edges: &[Edge],
        kind: AnalysisKind<'_>,
    ) -> AnalysisReport {
        let locale = self.gateway.locale();
        let model_used = self.gateway.current_model();

        if !self.gateway.check_health().await {
            tracing::warn!(
                "Model server at {} is unreachable, skipping analysis",
                self.gateway.base_url()
            );
            return AnalysisReport {
                narrative: locale.server_unreachable(self.gateway.base_url()),
                model_used,
                outcome: AnalysisOutcome::Unreachable,
            };
        }

        let facts = topology::analyze(nodes, edges);
        tracing::debug!(
            "Pre-analysis: {} devices, {} connections, {} issues",
            facts.device_count(),
            facts.connection_count(),
            facts.potential_issues().len()
        );

        let context = match render_context(locale, &facts, nodes, edges) {
            Ok(context) => context,
            Err(e) => {
                let err = LLMError::from(e);
                tracing::error!("Failed to render analysis context: {}", err);
                return AnalysisReport {
                    narrative: err.user_message(locale),
                    model_used,
                    outcome: AnalysisOutcome::Failed(err),
                };
            },
        };

        let prompt = kind.prompt(locale);

        match self.gateway.generate(&prompt, Some(&context)).await {
            Ok(narrative) => {
                AnalysisReport { narrative, model_used, outcome: AnalysisOutcome::Ok }
            },
            Err(err) => AnalysisReport {
                narrative: err.user_message(locale),
                model_used,
                outcome: AnalysisOutcome::Failed(err),
            },
        }
    }

    pub async fn health_status(&self) -> HealthStatus {
        HealthStatus {
            connected: self.gateway.check_health().await,
            model: self.gateway.current_model(),
            base_url: self.gateway.base_url().to_string(),
        }
    }

    pub async fn models_overview(&self) -> ModelsOverview {
        ModelsOverview {
            models: self.gateway.list_models().await,
            current_model: self.gateway.current_model(),
        }
    }

    /// Validated switch; returns the localized confirmation
    pub async fn switch_model(&self, name: &str) -> Result<String, ModelSwitchError> {
        self.gateway.switch_model(name).await?;
        Ok(self.gateway.locale().model_changed(name.trim()))
    }
}
