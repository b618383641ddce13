//! Ledger repository
//!
//! Every analysis write is a single transaction: the history row and both
//! counters land together or not at all.

use chrono::{Duration, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::models::*;
use crate::utils::{ApiError, ApiResult};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn find_active_user(&self, user_id: i64) -> ApiResult<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = ? AND is_active = 1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // ========================================================================
    // Analysis history
    // ========================================================================

    /// Store a finished analysis and bump the user's and project's counters.
    /// A project the user does not own is dropped from the record.
    pub async fn record_analysis(
        &self,
        user_id: i64,
        record: NewAnalysisRecord,
    ) -> ApiResult<AnalysisRecord> {
        let mut tx = self.pool.begin().await?;

        let project_id = match record.project_id {
            Some(project_id) => {
                let owned: Option<(i64,)> =
                    sqlx::query_as("SELECT id FROM projects WHERE id = ? AND owner_id = ?")
                        .bind(project_id)
                        .bind(user_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                if owned.is_none() {
                    tracing::warn!(
                        "Project {} not found for user {}, storing analysis without project",
                        project_id,
                        user_id
                    );
                }
                owned.map(|(id,)| id)
            },
            None => None,
        };

        let now = Utc::now();

        let updated = sqlx::query(
            "UPDATE users SET total_analyses = total_analyses + 1, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(ApiError::not_found(format!("User {} not found", user_id)));
        }

        let result = sqlx::query(
            "INSERT INTO ai_analysis_history \
             (user_id, project_id, model_used, device_count, device_types, analysis_result, \
              execution_time_seconds, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(project_id)
        .bind(&record.model_used)
        .bind(record.device_count)
        .bind(&record.device_types)
        .bind(&record.analysis_result)
        .bind(record.execution_time_seconds)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let record_id = result.last_insert_rowid();

        if let Some(project_id) = project_id {
            sqlx::query(
                "UPDATE projects SET analysis_count = analysis_count + 1, \
                 last_analysis_at = ?, updated_at = ? WHERE id = ?",
            )
            .bind(now)
            .bind(now)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;
        }

        let stored: AnalysisRecord =
            sqlx::query_as("SELECT * FROM ai_analysis_history WHERE id = ?")
                .bind(record_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        tracing::info!(
            "Recorded analysis {} for user {} (model: {})",
            record_id,
            user_id,
            stored.model_used
        );
        Ok(stored)
    }

    /// Newest first
    pub async fn list_history(
        &self,
        user_id: i64,
        filter: &HistoryFilter,
    ) -> ApiResult<Vec<AnalysisRecord>> {
        let mut query =
            QueryBuilder::<Sqlite>::new("SELECT * FROM ai_analysis_history WHERE user_id = ");
        query.push_bind(user_id);

        if let Some(project_id) = filter.project_id {
            query.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(model) = filter.model_filter.as_deref()
            && !model.is_empty()
        {
            query
                .push(" AND model_used LIKE ")
                .push_bind(format!("%{}%", model));
        }

        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        let records = query
            .build_query_as::<AnalysisRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    pub async fn get_record(&self, user_id: i64, record_id: i64) -> ApiResult<AnalysisRecord> {
        sqlx::query_as("SELECT * FROM ai_analysis_history WHERE id = ? AND user_id = ?")
            .bind(record_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Analysis record not found"))
    }

    /// Returns false when the record does not exist for this user
    pub async fn delete_record(&self, user_id: i64, record_id: i64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM ai_analysis_history WHERE id = ? AND user_id = ?")
            .bind(record_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_history(&self, user_id: i64) -> ApiResult<u64> {
        let result = sqlx::query("DELETE FROM ai_analysis_history WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Cleared {} analysis records for user {}", result.rows_affected(), user_id);
        Ok(result.rows_affected())
    }

    pub async fn history_stats(&self, user_id: i64, days: i64) -> ApiResult<AnalysisStats> {
        let since = Utc::now() - Duration::days(days);

        let (total_analyses,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM ai_analysis_history WHERE user_id = ? AND created_at >= ?",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let most_used: Option<(String, i64)> = sqlx::query_as(
            "SELECT model_used, COUNT(*) AS uses FROM ai_analysis_history \
             WHERE user_id = ? AND created_at >= ? \
             GROUP BY model_used ORDER BY uses DESC, model_used ASC LIMIT 1",
        )
        .bind(user_id)
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;

        let (average,): (Option<f64>,) = sqlx::query_as(
            "SELECT AVG(execution_time_seconds) FROM ai_analysis_history \
             WHERE user_id = ? AND created_at >= ?",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        let lifetime: Option<(i64,)> =
            sqlx::query_as("SELECT total_analyses FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(AnalysisStats {
            period_days: days,
            total_analyses,
            most_used_model: most_used.map(|(model, _)| model),
            average_execution_time_seconds: average.map(|avg| avg as i64),
            total_lifetime_analyses: lifetime.map(|(total,)| total).unwrap_or(0),
        })
    }

    // ========================================================================
    // Projects
    // ========================================================================

    pub async fn create_project(&self, owner_id: i64, project: NewProject) -> ApiResult<Project> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO projects \
             (name, description, diagram_data, owner_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.diagram_data)
        .bind(owner_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_project(owner_id, result.last_insert_rowid()).await
    }

    pub async fn get_project(&self, owner_id: i64, project_id: i64) -> ApiResult<Project> {
        sqlx::query_as("SELECT * FROM projects WHERE id = ? AND owner_id = ?")
            .bind(project_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Project not found"))
    }

    /// Oldest first
    pub async fn list_projects(
        &self,
        owner_id: i64,
        skip: i64,
        limit: i64,
    ) -> ApiResult<Vec<Project>> {
        let projects = sqlx::query_as(
            "SELECT * FROM projects WHERE owner_id = ? ORDER BY id ASC LIMIT ? OFFSET ?",
        )
        .bind(owner_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    pub async fn update_project(
        &self,
        owner_id: i64,
        project_id: i64,
        update: ProjectUpdate,
    ) -> ApiResult<Project> {
        let result = sqlx::query(
            "UPDATE projects SET \
             name = COALESCE(?, name), \
             description = COALESCE(?, description), \
             diagram_data = COALESCE(?, diagram_data), \
             updated_at = ? \
             WHERE id = ? AND owner_id = ?",
        )
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.diagram_data)
        .bind(Utc::now())
        .bind(project_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Project not found"));
        }
        self.get_project(owner_id, project_id).await
    }

    /// Deleting a project removes its analysis records as well
    pub async fn delete_project(&self, owner_id: i64, project_id: i64) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ? AND owner_id = ?")
            .bind(project_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
