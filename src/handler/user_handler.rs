use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

use crate::dto::user_dto::{CreateUserRequest, ListUsersQuery, UpdateUserRequest};
use crate::handler::validate_payload;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::error::HandlerError;

// Admin: list users with optional search and pagination
pub async fn list_users_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = service.list_users(query).await.map_err(HandlerError::from)?;
    Ok(Json(page))
}

pub async fn create_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let user = service.create_user(payload).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "user": user })))
}

pub async fn update_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let user = service
        .update_user(&id, payload)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "user": user })))
}

pub async fn delete_user_handler(
    State(service): State<Arc<UserServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_user(&id).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "ok": true })))
}
