use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::auth_handler::{
    change_password_handler, forgot_password_handler, login_handler, me_handler,
    register_handler, reset_password_handler, seed_demo_handler, update_me_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::user_service::UserServiceImpl;

pub fn auth_router(service: Arc<UserServiceImpl>, any_auth: Arc<AuthState>) -> Router {
    // Public auth routes
    let public = Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/forgot-password", post(forgot_password_handler))
        .route("/api/auth/reset-password", post(reset_password_handler))
        .route("/api/auth/seed-demo", post(seed_demo_handler));

    // Routes for any authenticated role
    let authed = Router::new()
        .route("/api/auth/me", get(me_handler).put(update_me_handler))
        .route("/api/auth/change-password", post(change_password_handler))
        .route_layer(middleware::from_fn_with_state(any_auth, require_auth));

    public.merge(authed).with_state(service)
}
