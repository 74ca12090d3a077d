use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

use crate::dto::coupon_dto::{CreateCouponRequest, UpdateCouponRequest, ValidateCouponQuery};
use crate::handler::validate_payload;
use crate::service::coupon_service::{CouponService, CouponServiceImpl};
use crate::util::error::HandlerError;

pub async fn list_coupons_handler(
    State(service): State<Arc<CouponServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let coupons = service.list().await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "coupons": coupons })))
}

pub async fn create_coupon_handler(
    State(service): State<Arc<CouponServiceImpl>>,
    Json(payload): Json<CreateCouponRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let coupon = service.create(payload).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "coupon": coupon })))
}

pub async fn update_coupon_handler(
    State(service): State<Arc<CouponServiceImpl>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCouponRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let coupon = service.update(&id, payload).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "coupon": coupon })))
}

pub async fn delete_coupon_handler(
    State(service): State<Arc<CouponServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete(&id).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "ok": true })))
}

// Checkout preview: never errors for an unknown or stale code, the
// response carries valid=false so the cart can show a message instead.
pub async fn validate_coupon_handler(
    State(service): State<Arc<CouponServiceImpl>>,
    Query(query): Query<ValidateCouponQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let code = query
        .code
        .ok_or_else(|| HandlerError::bad_request("Missing coupon code"))?;
    let amount = query.amount.unwrap_or(0.0);
    let res = service
        .validate(&code, amount)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(res))
}
