use axum::{middleware, routing::post, Router};
use std::sync::Arc;

use crate::config::UploadConfig;
use crate::handler::upload_handler::upload_image_handler;
use crate::middlewares::auth_middleware::{require_auth, AuthState};

// Authenticated image upload; files are served back under the public prefix.
pub fn upload_router(config: Arc<UploadConfig>, any_auth: Arc<AuthState>) -> Router {
    Router::new()
        .route("/api/upload/image", post(upload_image_handler))
        .route_layer(middleware::from_fn_with_state(any_auth, require_auth))
        .with_state(config)
}
