//! Analysis Orchestrator Module
//!
//! Glue between the topology pre-analyzer and the LLM gateway.

mod models;
mod orchestrator;
mod prompt;

pub use models::*;
pub use orchestrator::AnalysisOrchestrator;
pub use prompt::render_context;
