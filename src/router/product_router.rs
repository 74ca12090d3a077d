use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handler::product_handler::{
    create_product_handler, decline_product_handler, delete_product_handler,
    get_product_handler, list_products_handler, my_products_handler, publish_product_handler,
    unpublish_product_handler, update_product_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::product_service::ProductServiceImpl;

pub fn product_router(
    service: Arc<ProductServiceImpl>,
    seller_auth: Arc<AuthState>,
    admin_auth: Arc<AuthState>,
) -> Router {
    // Public catalog
    let public = Router::new()
        .route("/api/products", get(list_products_handler))
        .route("/api/products/{id}", get(get_product_handler));

    // Farmers create drafts, admins create published products directly.
    let seller = Router::new()
        .route("/api/products", post(create_product_handler))
        .route("/api/products/{id}", put(update_product_handler))
        .route("/api/farmer/my-products", get(my_products_handler))
        .route_layer(middleware::from_fn_with_state(seller_auth, require_auth));

    // Admin moderation and removal
    let admin = Router::new()
        .route("/api/products/{id}", delete(delete_product_handler))
        .route("/api/products/{id}/publish", post(publish_product_handler))
        .route(
            "/api/products/{id}/unpublish",
            post(unpublish_product_handler),
        )
        .route("/api/products/{id}/decline", post(decline_product_handler))
        .route_layer(middleware::from_fn_with_state(admin_auth, require_auth));

    public.merge(seller).merge(admin).with_state(service)
}
