use axum::{
    extract::{Json, State},
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use std::sync::Arc;

use crate::dto::auth_dto::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
    ResetPasswordRequest, UpdateMeRequest,
};
use crate::handler::validate_payload;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

// Register
pub async fn register_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let res = service.register(payload).await.map_err(HandlerError::from)?;
    Ok(Json(res))
}

// Login
pub async fn login_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let res = service
        .login(&payload.email, &payload.password)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(res))
}

// Current user profile
pub async fn me_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let user = service.me(&claims.sub).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "user": user })))
}

pub async fn update_me_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateMeRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let user = service
        .update_me(&claims.sub, payload)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "user": user })))
}

pub async fn change_password_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    service
        .change_password(&claims.sub, payload)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "ok": true })))
}

// Issues a reset token. Without a mail transport the token is returned
// in the response body so the flow stays testable end to end.
pub async fn forgot_password_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let token = service
        .forgot_password(&payload.email)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "ok": true, "resetToken": token })))
}

pub async fn reset_password_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    service
        .reset_password(&payload.email, &payload.token, &payload.new_password)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "ok": true })))
}

// Seed demo accounts (admin, user, delivery, farmer)
pub async fn seed_demo_handler(
    State(service): State<Arc<UserServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let seeded = service.seed_demo().await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "seeded": seeded })))
}
