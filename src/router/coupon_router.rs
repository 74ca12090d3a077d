use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::handler::coupon_handler::{
    create_coupon_handler, delete_coupon_handler, list_coupons_handler, update_coupon_handler,
    validate_coupon_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::coupon_service::CouponServiceImpl;

pub fn coupon_router(service: Arc<CouponServiceImpl>, admin_auth: Arc<AuthState>) -> Router {
    // Checkout validation stays public so the cart can preview a discount
    let public = Router::new().route("/api/coupons/validate", get(validate_coupon_handler));

    let admin = Router::new()
        .route(
            "/api/coupons",
            get(list_coupons_handler).post(create_coupon_handler),
        )
        .route(
            "/api/coupons/{id}",
            put(update_coupon_handler).delete(delete_coupon_handler),
        )
        .route_layer(middleware::from_fn_with_state(admin_auth, require_auth));

    public.merge(admin).with_state(service)
}
