use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::delivery_handler::{
    assigned_orders_handler, delivered_order_handler, picked_order_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::order_service::OrderServiceImpl;

// Delivery-role routes. Status updates are scoped to the assignee.
pub fn delivery_router(service: Arc<OrderServiceImpl>, delivery_auth: Arc<AuthState>) -> Router {
    Router::new()
        .route("/api/delivery/assigned", get(assigned_orders_handler))
        .route("/api/delivery/{id}/picked", post(picked_order_handler))
        .route("/api/delivery/{id}/delivered", post(delivered_order_handler))
        .route_layer(middleware::from_fn_with_state(delivery_auth, require_auth))
        .with_state(service)
}
