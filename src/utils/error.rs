use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    ResourceNotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Requested model is not served; carries the catalog for remediation
    #[error("{message}")]
    ModelUnavailable { message: String, model: String, available_models: Vec<String> },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("{0}")]
    InternalError(String),
}

impl ApiError {
    pub fn validation_error(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::ResourceNotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::ModelUnavailable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationError(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            Self::ModelUnavailable { message, model, available_models } => json!({
                "code": status.as_u16(),
                "message": message,
                "model": model,
                "available_models": available_models,
            }),
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                json!({ "code": status.as_u16(), "message": "Database error" })
            },
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "code": status.as_u16(), "message": msg })
            },
            other => json!({ "code": status.as_u16(), "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
