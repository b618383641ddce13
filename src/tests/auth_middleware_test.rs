// Auth middleware tests: bearer verification and current-user resolution

use crate::middleware::{AuthState, CurrentUser, auth_middleware};
use crate::services::ledger::LedgerRepository;
use crate::tests::common::{create_test_db, create_test_user, deactivate_user};
use crate::utils::JwtUtil;
use axum::{
    Extension, Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::get,
};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Echoes the resolved user name
async fn whoami(Extension(user): Extension<CurrentUser>) -> String {
    format!("{}:{}", user.user_id, user.username)
}

fn create_test_router(jwt_util: Arc<JwtUtil>, ledger: Arc<LedgerRepository>) -> Router {
    let auth_state = AuthState { jwt_util, ledger };

    Router::new()
        .route("/api/whoami", get(whoami))
        .route_layer(axum::middleware::from_fn_with_state(auth_state, auth_middleware))
}

fn request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/whoami");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let pool = create_test_db().await;
    let jwt_util = Arc::new(JwtUtil::new("test-secret", 3600));
    let app = create_test_router(jwt_util, Arc::new(LedgerRepository::new(pool)));

    let response = app.oneshot(request(None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_header_is_unauthorized() {
    let pool = create_test_db().await;
    let jwt_util = Arc::new(JwtUtil::new("test-secret", 3600));
    let app = create_test_router(jwt_util, Arc::new(LedgerRepository::new(pool)));

    let response = app.oneshot(request(Some("Basic YWxpY2U6cHc="))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let pool = create_test_db().await;
    let user_id = create_test_user(&pool, "alice").await;
    let app = create_test_router(
        Arc::new(JwtUtil::new("test-secret", 3600)),
        Arc::new(LedgerRepository::new(pool)),
    );

    let forged = JwtUtil::new("other-secret", 3600)
        .generate_token(user_id, "alice")
        .unwrap();
    let response = app
        .oneshot(request(Some(&format!("Bearer {}", forged))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_attaches_current_user() {
    let pool = create_test_db().await;
    let user_id = create_test_user(&pool, "alice").await;
    let jwt_util = Arc::new(JwtUtil::new("test-secret", 3600));
    let app = create_test_router(jwt_util.clone(), Arc::new(LedgerRepository::new(pool)));

    let token = jwt_util.generate_token(user_id, "alice").unwrap();
    let response = app
        .oneshot(request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, format!("{}:alice", user_id));
}

#[tokio::test]
async fn test_inactive_user_is_rejected() {
    let pool = create_test_db().await;
    let user_id = create_test_user(&pool, "carol").await;
    deactivate_user(&pool, user_id).await;
    let jwt_util = Arc::new(JwtUtil::new("test-secret", 3600));
    let app = create_test_router(jwt_util.clone(), Arc::new(LedgerRepository::new(pool)));

    let token = jwt_util.generate_token(user_id, "carol").unwrap();
    let response = app
        .oneshot(request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    let pool = create_test_db().await;
    let jwt_util = Arc::new(JwtUtil::new("test-secret", 3600));
    let app = create_test_router(jwt_util.clone(), Arc::new(LedgerRepository::new(pool)));

    let token = jwt_util.generate_token(77, "ghost").unwrap();
    let response = app
        .oneshot(request(Some(&format!("Bearer {}", token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
