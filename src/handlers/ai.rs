//! AI API Handlers
//!
//! Topology analysis, model server status and model switching.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

use crate::AppState;
use crate::middleware::CurrentUser;
use crate::services::analysis::AnalysisKind;
use crate::services::ledger::NewAnalysisRecord;
use crate::services::llm::ModelSwitchError;
use crate::services::topology::{Edge, Node, tally_device_types};
use crate::utils::{ApiError, ApiResult, Locale};

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub edges: Vec<Edge>,
    pub question: Option<String>,
    /// Links the stored analysis to one of the caller's projects
    pub project_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopologyRequest {
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub edges: Vec<Edge>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub status: String,
    /// True when the narrative is a failure notice that may clear up on a retry
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AiHealthResponse {
    pub status: String,
    pub connected: bool,
    pub model: String,
    pub base_url: String,
    pub api_version: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub current_model: String,
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetModelRequest {
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SetModelResponse {
    pub message: String,
    pub current_model: String,
    pub status: String,
}

// ============================================================================
// Analysis
// ============================================================================

/// Analyze a topology and store the result in the caller's history
#[utoipa::path(
    post,
    path = "/api/ai/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis narrative", body = AnalysisResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "History could not be stored")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "AI"
)]
pub async fn analyze_topology(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    tracing::info!("AI analysis requested by user {}", user.user_id);
    let started = Instant::now();

    let report = state
        .orchestrator
        .run_analysis(&req.nodes, &req.edges, AnalysisKind::General(req.question.as_deref()))
        .await;

    let execution_time = started.elapsed().as_secs();
    let retryable = report.outcome.is_retryable();
    tracing::info!(
        "Analysis for user {} finished in {}s ({:?})",
        user.user_id,
        execution_time,
        report.outcome
    );

    let device_types = serde_json::to_string(&tally_device_types(&req.nodes))
        .map_err(|e| ApiError::internal_error(format!("Failed to encode device types: {}", e)))?;

    let record = state
        .ledger
        .record_analysis(
            user.user_id,
            NewAnalysisRecord {
                project_id: req.project_id,
                model_used: report.model_used,
                device_count: req.nodes.len() as i64,
                device_types: Some(device_types),
                analysis_result: report.narrative,
                execution_time_seconds: Some(execution_time as i64),
            },
        )
        .await?;

    Ok(Json(AnalysisResponse {
        analysis: record.analysis_result,
        status: "success".to_string(),
        retryable,
        analysis_id: Some(record.id),
    }))
}

/// Improvement suggestions for a topology (not stored)
#[utoipa::path(
    post,
    path = "/api/ai/suggest-improvements",
    request_body = TopologyRequest,
    responses(
        (status = 200, description = "Improvement suggestions", body = AnalysisResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "AI"
)]
pub async fn suggest_improvements(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<TopologyRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    tracing::info!("Improvement suggestions requested by user {}", user.user_id);
    run_preset(&state, &req, AnalysisKind::Improvements).await
}

/// Security review of a topology (not stored)
#[utoipa::path(
    post,
    path = "/api/ai/security-analysis",
    request_body = TopologyRequest,
    responses(
        (status = 200, description = "Security analysis", body = AnalysisResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "AI"
)]
pub async fn security_analysis(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<TopologyRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    tracing::info!("Security analysis requested by user {}", user.user_id);
    run_preset(&state, &req, AnalysisKind::Security).await
}

async fn run_preset(
    state: &AppState,
    req: &TopologyRequest,
    kind: AnalysisKind<'_>,
) -> ApiResult<Json<AnalysisResponse>> {
    let report = state
        .orchestrator
        .run_analysis(&req.nodes, &req.edges, kind)
        .await;

    Ok(Json(AnalysisResponse {
        retryable: report.outcome.is_retryable(),
        analysis: report.narrative,
        status: "success".to_string(),
        analysis_id: None,
    }))
}

// ============================================================================
// Model Server
// ============================================================================

/// Model server connectivity
#[utoipa::path(
    get,
    path = "/api/ai/health",
    responses(
        (status = 200, description = "Model server status", body = AiHealthResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "AI"
)]
pub async fn ai_health(State(state): State<Arc<AppState>>) -> ApiResult<Json<AiHealthResponse>> {
    let health = state.orchestrator.health_status().await;

    Ok(Json(AiHealthResponse {
        status: if health.connected { "healthy" } else { "unhealthy" }.to_string(),
        connected: health.connected,
        model: health.model,
        base_url: health.base_url,
        api_version: "v1".to_string(),
    }))
}

/// Models served by the model server
#[utoipa::path(
    get,
    path = "/api/ai/models",
    responses(
        (status = 200, description = "Available models", body = ModelsResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "AI"
)]
pub async fn list_models(State(state): State<Arc<AppState>>) -> ApiResult<Json<ModelsResponse>> {
    let overview = state.orchestrator.models_overview().await;

    Ok(Json(ModelsResponse {
        models: overview.models,
        current_model: overview.current_model,
        status: "success".to_string(),
    }))
}

/// Switch the active model after checking the catalog
#[utoipa::path(
    post,
    path = "/api/ai/set-model",
    request_body = SetModelRequest,
    responses(
        (status = 200, description = "Model switched", body = SetModelResponse),
        (status = 400, description = "Model name missing"),
        (status = 422, description = "Model not available on the server")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "AI"
)]
pub async fn set_model(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<SetModelRequest>,
) -> ApiResult<Json<SetModelResponse>> {
    let locale = state.orchestrator.locale();
    let model = req.model.unwrap_or_default();
    tracing::info!("User {} requested model switch to '{}'", user.user_id, model);

    let message = state
        .orchestrator
        .switch_model(&model)
        .await
        .map_err(|e| switch_error(locale, e))?;

    Ok(Json(SetModelResponse {
        message,
        current_model: model.trim().to_string(),
        status: "success".to_string(),
    }))
}

fn switch_error(locale: Locale, err: ModelSwitchError) -> ApiError {
    match err {
        ModelSwitchError::EmptyName => ApiError::validation_error(locale.model_name_required()),
        ModelSwitchError::Unavailable { model, available } => ApiError::ModelUnavailable {
            message: locale.model_unavailable(&model, &available),
            model,
            available_models: available,
        },
    }
}
