use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::order_handler::{
    all_orders_handler, assign_order_handler, my_orders_handler, order_stats_handler,
    place_order_handler, set_status_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::order_service::OrderServiceImpl;

pub fn order_router(
    service: Arc<OrderServiceImpl>,
    any_auth: Arc<AuthState>,
    staff_auth: Arc<AuthState>,
    admin_auth: Arc<AuthState>,
) -> Router {
    // Any authenticated user can place and list their own orders
    let authed = Router::new()
        .route("/api/orders", post(place_order_handler))
        .route("/api/orders/mine", get(my_orders_handler))
        .route_layer(middleware::from_fn_with_state(any_auth, require_auth));

    // Admins and delivery partners move orders through the lifecycle; the
    // transition table rejects illegal jumps either way.
    let staff = Router::new()
        .route("/api/orders/{id}/status", post(set_status_handler))
        .route_layer(middleware::from_fn_with_state(staff_auth, require_auth));

    let admin = Router::new()
        .route("/api/orders", get(all_orders_handler))
        .route("/api/orders/stats", get(order_stats_handler))
        .route("/api/orders/{id}/assign", post(assign_order_handler))
        .route_layer(middleware::from_fn_with_state(admin_auth, require_auth));

    authed.merge(staff).merge(admin).with_state(service)
}
