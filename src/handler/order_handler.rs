use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use std::sync::Arc;

use crate::dto::order_dto::{AssignOrderRequest, PlaceOrderRequest, SetStatusRequest};
use crate::handler::validate_payload;
use crate::service::order_service::{OrderService, OrderServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn place_order_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let order = service
        .place_order(&claims.sub, payload)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "order": order })))
}

pub async fn my_orders_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let orders = service
        .list_mine(&claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "orders": orders })))
}

// Admin: every order, newest first
pub async fn all_orders_handler(
    State(service): State<Arc<OrderServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let orders = service.list_all().await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "orders": orders })))
}

pub async fn set_status_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let order = service
        .set_status(&id, &payload.status)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "order": order })))
}

pub async fn assign_order_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<AssignOrderRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let order = service
        .assign(&id, &payload.delivery_user_id)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "order": order })))
}

// Admin dashboard: revenue, order count, top products
pub async fn order_stats_handler(
    State(service): State<Arc<OrderServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let stats = service.stats().await.map_err(HandlerError::from)?;
    Ok(Json(stats))
}
