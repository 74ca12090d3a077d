use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Extension, Router,
};
use tower::ServiceExt;

use khetkart_backend::config::JwtConfig;
use khetkart_backend::middlewares::auth_middleware::{require_auth, AuthState};
use khetkart_backend::model::user::Role;
use khetkart_backend::util::jwt::{Claims, JwtTokenUtils, JwtTokenUtilsImpl};

fn test_jwt_utils() -> Arc<JwtTokenUtilsImpl> {
    Arc::new(JwtTokenUtilsImpl::new(JwtConfig::from_test_env()))
}

async fn whoami_handler(Extension(claims): Extension<Claims>) -> String {
    claims.sub
}

fn gated_router(auth: Arc<AuthState>) -> Router {
    Router::new()
        .route("/whoami", get(whoami_handler))
        .route_layer(middleware::from_fn_with_state(auth, require_auth))
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = gated_router(AuthState::any_role(test_jwt_utils()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = gated_router(AuthState::any_role(test_jwt_utils()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("authorization", "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    let jwt_utils = test_jwt_utils();
    let token = jwt_utils
        .generate_token("user-1", Role::User)
        .expect("Failed to generate token");
    let app = gated_router(AuthState::roles(jwt_utils, &[Role::Admin]));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let jwt_utils = test_jwt_utils();
    let token = jwt_utils
        .generate_token("user-42", Role::User)
        .expect("Failed to generate token");
    let app = gated_router(AuthState::any_role(jwt_utils));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    assert_eq!(&body[..], b"user-42");
}
