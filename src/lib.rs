//! Topology Advisor Library
//!
//! Network topology review backed by a locally hosted LLM server.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use sqlx::SqlitePool;
use std::sync::Arc;

pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::Config;
pub use services::analysis::AnalysisOrchestrator;
pub use services::ledger::LedgerRepository;
pub use services::llm::{LLMError, LLMGateway, LLMGatewayImpl, ModelSelection};
pub use utils::{JwtUtil, Locale};

/// Application shared state
///
/// All services are wrapped in Arc for cheap cloning and thread safety.
#[derive(Clone)]
pub struct AppState {
    pub jwt_util: Arc<JwtUtil>,
    pub ledger: Arc<LedgerRepository>,
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub fn new(db: SqlitePool, jwt_util: Arc<JwtUtil>, gateway: Arc<dyn LLMGateway>) -> Self {
        Self {
            ledger: Arc::new(LedgerRepository::new(db)),
            orchestrator: Arc::new(AnalysisOrchestrator::new(gateway)),
            jwt_util,
        }
    }

    pub fn auth_state(&self) -> middleware::AuthState {
        middleware::AuthState {
            jwt_util: Arc::clone(&self.jwt_util),
            ledger: Arc::clone(&self.ledger),
        }
    }
}

/// Authenticated API routes
pub fn api_router(state: Arc<AppState>) -> Router {
    let auth_state = state.auth_state();

    Router::new()
        // AI
        .route("/api/ai/analyze", post(handlers::ai::analyze_topology))
        .route("/api/ai/suggest-improvements", post(handlers::ai::suggest_improvements))
        .route("/api/ai/security-analysis", post(handlers::ai::security_analysis))
        .route("/api/ai/health", get(handlers::ai::ai_health))
        .route("/api/ai/models", get(handlers::ai::list_models))
        .route("/api/ai/set-model", post(handlers::ai::set_model))
        // Analysis history
        .route(
            "/api/analysis-history",
            get(handlers::analysis_history::list_history)
                .post(handlers::analysis_history::create_history_record)
                .delete(handlers::analysis_history::clear_history),
        )
        .route(
            "/api/analysis-history/stats/summary",
            get(handlers::analysis_history::history_stats),
        )
        .route(
            "/api/analysis-history/:id",
            get(handlers::analysis_history::get_history_record)
                .delete(handlers::analysis_history::delete_history_record),
        )
        // Projects
        .route(
            "/api/projects",
            get(handlers::project::list_projects).post(handlers::project::create_project),
        )
        .route(
            "/api/projects/:id",
            get(handlers::project::get_project)
                .put(handlers::project::update_project)
                .delete(handlers::project::delete_project),
        )
        .route_layer(axum_middleware::from_fn_with_state(auth_state, middleware::auth_middleware))
        .with_state(state)
}
