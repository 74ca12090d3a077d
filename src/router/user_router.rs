use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::handler::user_handler::{
    create_user_handler, delete_user_handler, list_users_handler, update_user_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::user_service::UserServiceImpl;

// Admin-only user management
pub fn user_router(service: Arc<UserServiceImpl>, admin_auth: Arc<AuthState>) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(list_users_handler).post(create_user_handler),
        )
        .route(
            "/api/users/{id}",
            put(update_user_handler).delete(delete_user_handler),
        )
        .route_layer(middleware::from_fn_with_state(admin_auth, require_auth))
        .with_state(service)
}
