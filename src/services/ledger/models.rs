use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Persisted outcome of one successful analysis request
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AnalysisRecord {
    pub id: i64,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub model_used: String,
    pub device_count: i64,
    /// JSON object of device type -> count
    pub device_types: Option<String>,
    pub analysis_result: String,
    pub execution_time_seconds: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAnalysisRecord {
    pub project_id: Option<i64>,
    pub model_used: String,
    pub device_count: i64,
    pub device_types: Option<String>,
    pub analysis_result: String,
    pub execution_time_seconds: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub total_analyses: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Editor nodes/edges as a JSON string
    pub diagram_data: Option<String>,
    pub owner_id: i64,
    pub analysis_count: i64,
    pub last_analysis_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub diagram_data: Option<String>,
}

/// Partial project update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub diagram_data: Option<String>,
}

/// Paging and filtering for the history listing
#[derive(Debug, Clone)]
pub struct HistoryFilter {
    pub skip: i64,
    pub limit: i64,
    pub project_id: Option<i64>,
    /// Substring of the model identifier
    pub model_filter: Option<String>,
}

impl Default for HistoryFilter {
    fn default() -> Self {
        Self { skip: 0, limit: 50, project_id: None, model_filter: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalysisStats {
    pub period_days: i64,
    pub total_analyses: i64,
    pub most_used_model: Option<String>,
    pub average_execution_time_seconds: Option<i64>,
    pub total_lifetime_analyses: i64,
}
