use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use std::sync::Arc;

use crate::service::order_service::{OrderService, OrderServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

// Orders currently assigned to the calling delivery user
pub async fn assigned_orders_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let orders = service
        .assigned(&claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "orders": orders })))
}

// Both transitions are scoped to the assignee: an order assigned to
// someone else reads as not found.
pub async fn picked_order_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let order = service
        .picked(&id, &claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "order": order })))
}

pub async fn delivered_order_handler(
    State(service): State<Arc<OrderServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let order = service
        .delivered(&id, &claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "order": order })))
}
