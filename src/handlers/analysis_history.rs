use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::AppState;
use crate::middleware::CurrentUser;
use crate::services::ledger::{AnalysisRecord, AnalysisStats, HistoryFilter, NewAnalysisRecord};
use crate::utils::{ApiError, ApiResult};

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    #[validate(range(min = 0))]
    pub skip: Option<i64>,
    /// Page size, 1..=100 (default 50)
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub project_id: Option<i64>,
    /// Substring of the model name
    pub model_filter: Option<String>,
}

impl From<HistoryQuery> for HistoryFilter {
    fn from(query: HistoryQuery) -> Self {
        let defaults = HistoryFilter::default();
        Self {
            skip: query.skip.unwrap_or(defaults.skip),
            limit: query.limit.unwrap_or(defaults.limit),
            project_id: query.project_id,
            model_filter: query.model_filter,
        }
    }
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Look-back window in days, 1..=365 (default 30)
    #[validate(range(min = 1, max = 365))]
    pub days: Option<i64>,
}

/// An analysis produced elsewhere, stored as-is
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAnalysisRequest {
    pub project_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub model_used: String,
    #[validate(range(min = 0))]
    pub device_count: i64,
    /// JSON object of device type -> count
    pub device_types: Option<String>,
    pub analysis_result: String,
    #[validate(range(min = 0))]
    pub execution_time_seconds: Option<i64>,
}

impl From<CreateAnalysisRequest> for NewAnalysisRecord {
    fn from(req: CreateAnalysisRequest) -> Self {
        Self {
            project_id: req.project_id,
            model_used: req.model_used,
            device_count: req.device_count,
            device_types: req.device_types,
            analysis_result: req.analysis_result,
            execution_time_seconds: req.execution_time_seconds,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearHistoryResponse {
    pub message: String,
    pub deleted_count: u64,
}

#[utoipa::path(
    get,
    path = "/api/analysis-history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Analysis history, newest first", body = Vec<AnalysisRecord>),
        (status = 400, description = "Invalid paging parameters")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analysis History"
)]
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<AnalysisRecord>>> {
    query.validate()?;

    let records = state
        .ledger
        .list_history(user.user_id, &query.into())
        .await?;
    Ok(Json(records))
}

/// Store an analysis record and bump the usage counters
#[utoipa::path(
    post,
    path = "/api/analysis-history",
    request_body = CreateAnalysisRequest,
    responses(
        (status = 201, description = "Record stored", body = AnalysisRecord),
        (status = 400, description = "Invalid record")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analysis History"
)]
pub async fn create_history_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateAnalysisRequest>,
) -> ApiResult<(StatusCode, Json<AnalysisRecord>)> {
    req.validate()?;

    let record = state.ledger.record_analysis(user.user_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/api/analysis-history/{id}",
    params(
        ("id" = i64, Path, description = "Analysis record ID")
    ),
    responses(
        (status = 200, description = "Analysis record", body = AnalysisRecord),
        (status = 404, description = "Record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analysis History"
)]
pub async fn get_history_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AnalysisRecord>> {
    let record = state.ledger.get_record(user.user_id, id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/api/analysis-history/{id}",
    params(
        ("id" = i64, Path, description = "Analysis record ID")
    ),
    responses(
        (status = 200, description = "Record deleted", body = MessageResponse),
        (status = 404, description = "Record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analysis History"
)]
pub async fn delete_history_record(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.ledger.delete_record(user.user_id, id).await? {
        return Err(ApiError::not_found("Analysis record not found"));
    }

    tracing::info!("User {} deleted analysis record {}", user.user_id, id);
    Ok(Json(MessageResponse { message: "Analysis record deleted".to_string() }))
}

#[utoipa::path(
    delete,
    path = "/api/analysis-history",
    responses(
        (status = 200, description = "History cleared", body = ClearHistoryResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analysis History"
)]
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<ClearHistoryResponse>> {
    let deleted_count = state.ledger.clear_history(user.user_id).await?;

    Ok(Json(ClearHistoryResponse {
        message: format!("Analysis history cleared ({} records)", deleted_count),
        deleted_count,
    }))
}

#[utoipa::path(
    get,
    path = "/api/analysis-history/stats/summary",
    params(StatsQuery),
    responses(
        (status = 200, description = "Usage statistics", body = AnalysisStats),
        (status = 400, description = "Invalid window")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analysis History"
)]
pub async fn history_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<AnalysisStats>> {
    query.validate()?;

    let stats = state
        .ledger
        .history_stats(user.user_id, query.days.unwrap_or(30))
        .await?;
    Ok(Json(stats))
}
