use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use std::sync::Arc;

use crate::dto::product_dto::{CreateProductRequest, ListProductsQuery, UpdateProductRequest};
use crate::handler::validate_payload;
use crate::service::product_service::{ProductService, ProductServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

// Public catalog listing. Returns a paginated envelope when both
// page and pageSize are supplied, otherwise the full matching set.
pub async fn list_products_handler(
    State(service): State<Arc<ProductServiceImpl>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let res = service.list(query).await.map_err(HandlerError::from)?;
    Ok(Json(res))
}

pub async fn get_product_handler(
    State(service): State<Arc<ProductServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let product = service.get(&id).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "product": product })))
}

// Admin products go live immediately; farmer products await approval.
pub async fn create_product_handler(
    State(service): State<Arc<ProductServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let product = service
        .create(&claims.sub, claims.role, payload)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "product": product })))
}

pub async fn update_product_handler(
    State(service): State<Arc<ProductServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let product = service.update(&id, payload).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "product": product })))
}

pub async fn delete_product_handler(
    State(service): State<Arc<ProductServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete(&id).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn publish_product_handler(
    State(service): State<Arc<ProductServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let product = service.publish(&id).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "product": product })))
}

pub async fn unpublish_product_handler(
    State(service): State<Arc<ProductServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let product = service.unpublish(&id).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "product": product })))
}

pub async fn decline_product_handler(
    State(service): State<Arc<ProductServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let product = service.decline(&id).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "product": product })))
}

// Farmer: own products regardless of publish state
pub async fn my_products_handler(
    State(service): State<Arc<ProductServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let products = service
        .my_products(&claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "products": products })))
}
