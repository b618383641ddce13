// Common test utilities and helpers

use crate::services::ledger::NewAnalysisRecord;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::time::Duration;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Create an active user and return its id
pub async fn create_test_user(pool: &SqlitePool, username: &str) -> i64 {
    let result = sqlx::query("INSERT INTO users (username, email) VALUES (?, ?)")
        .bind(username)
        .bind(format!("{}@test.com", username))
        .execute(pool)
        .await
        .expect("Failed to create test user");

    result.last_insert_rowid()
}

pub async fn deactivate_user(pool: &SqlitePool, user_id: i64) {
    sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to deactivate user");
}

pub async fn user_total_analyses(pool: &SqlitePool, user_id: i64) -> i64 {
    let (total,): (i64,) = sqlx::query_as("SELECT total_analyses FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("Failed to fetch user counter");
    total
}

pub async fn count_history_rows(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ai_analysis_history")
        .fetch_one(pool)
        .await
        .expect("Failed to count history");
    count
}

/// Minimal record for `model`
pub fn sample_record(model: &str, project_id: Option<i64>) -> NewAnalysisRecord {
    NewAnalysisRecord {
        project_id,
        model_used: model.to_string(),
        device_count: 2,
        device_types: Some(r#"{"router":1,"switch":1}"#.to_string()),
        analysis_result: format!("analysis by {}", model),
        execution_time_seconds: Some(4),
    }
}
