use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::services::ledger::LedgerRepository;
use crate::utils::{ApiError, JwtUtil};

#[derive(Clone)]
pub struct AuthState {
    pub jwt_util: Arc<JwtUtil>,
    pub ledger: Arc<LedgerRepository>,
}

/// Authenticated caller, available to handlers as `Extension<CurrentUser>`
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CurrentUser {
    pub user_id: i64,
    pub username: String,
}

/// Authentication middleware.
/// 1. Verify the bearer JWT
/// 2. Load the user and reject inactive or unknown accounts
/// 3. Attach `CurrentUser` to the request extensions
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let uri = req.uri().path().to_string();
    let method = req.method().to_string();

    tracing::debug!("Auth middleware processing: {} {}", method, uri);

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing authorization header for {} {}", method, uri);
            ApiError::unauthorized("Missing authorization header")
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid authorization header format for {} {}", method, uri);
        ApiError::unauthorized("Invalid authorization header format")
    })?;

    let claims = state.jwt_util.verify_token(token).map_err(|err| {
        tracing::warn!("JWT verification failed for {} {}: {:?}", method, uri, err);
        err
    })?;

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| ApiError::unauthorized("Invalid token subject"))?;

    let user = state
        .ledger
        .find_active_user(user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token for unknown or inactive user {} on {} {}", user_id, method, uri);
            ApiError::unauthorized("User not found or inactive")
        })?;

    tracing::debug!("Authenticated user {} (ID: {}) on {} {}", user.username, user.id, method, uri);

    req.extensions_mut()
        .insert(CurrentUser { user_id: user.id, username: user.username });

    Ok(next.run(req).await)
}
