//! Analysis request kinds and results

use serde::Serialize;

use crate::services::llm::LLMError;
use crate::utils::Locale;

/// What the model is asked about a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind<'a> {
    /// Free-form question; empty or absent falls back to the full review
    General(Option<&'a str>),
    Improvements,
    Security,
}

impl AnalysisKind<'_> {
    pub fn prompt(&self, locale: Locale) -> String {
        match self {
            Self::General(Some(question)) if !question.is_empty() => {
                locale.question_prompt(question)
            },
            Self::General(_) => locale.comprehensive_prompt().to_string(),
            Self::Improvements => locale.question_prompt(locale.improvements_question()),
            Self::Security => locale.question_prompt(locale.security_question()),
        }
    }
}

/// How an analysis ended
#[derive(Debug)]
pub enum AnalysisOutcome {
    Ok,
    /// Health check failed; nothing was sent to the model
    Unreachable,
    Failed(LLMError),
}

impl AnalysisOutcome {
    /// Whether asking again may succeed; timeouts and transport failures
    /// qualify, an unreachable server does too
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ok => false,
            Self::Unreachable => true,
            Self::Failed(err) => err.is_retryable(),
        }
    }
}

#[derive(Debug)]
pub struct AnalysisReport {
    /// Model text, or the localized failure message
    pub narrative: String,
    /// Model active when the request was built
    pub model_used: String,
    pub outcome: AnalysisOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub connected: bool,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelsOverview {
    pub models: Vec<String>,
    pub current_model: String,
}
