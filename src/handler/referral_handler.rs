use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    Extension,
};
use serde_json::json;
use std::sync::Arc;

use crate::dto::referral_dto::{
    ApplyReferralRequest, RequestCustomCodeRequest, WithdrawRequest,
};
use crate::model::payout::PayoutStatus;
use crate::handler::validate_payload;
use crate::service::referral_service::{ReferralService, ReferralServiceImpl};
use crate::util::error::HandlerError;
use crate::util::jwt::Claims;

pub async fn my_code_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let code = service.my_code(&claims.sub).await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "code": code })))
}

pub async fn apply_referral_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ApplyReferralRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let res = service
        .apply(&claims.sub, &payload.code)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(res))
}

pub async fn referral_history_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let referrals = service
        .history(&claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "referrals": referrals })))
}

pub async fn referral_stats_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let stats = service.stats(&claims.sub).await.map_err(HandlerError::from)?;
    Ok(Json(stats))
}

pub async fn request_custom_code_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RequestCustomCodeRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    service
        .request_custom_code(&claims.sub, &payload.code)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "ok": true })))
}

// Admin: resolve a pending custom-code request
pub async fn approve_custom_code_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service
        .approve_custom_code(&user_id)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn decline_custom_code_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service
        .decline_custom_code(&user_id)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn withdraw_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<WithdrawRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    validate_payload(&payload)?;
    let res = service
        .withdraw(&claims.sub, payload.amount, payload.method, payload.details)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(res))
}

pub async fn my_payouts_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, HandlerError> {
    let payouts = service
        .my_payouts(&claims.sub)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "payouts": payouts })))
}

pub async fn all_payouts_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
) -> Result<impl IntoResponse, HandlerError> {
    let payouts = service.all_payouts().await.map_err(HandlerError::from)?;
    Ok(Json(json!({ "payouts": payouts })))
}

pub async fn approve_payout_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let payout = service
        .set_payout_status(&id, PayoutStatus::Approved)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "payout": payout })))
}

pub async fn reject_payout_handler(
    State(service): State<Arc<ReferralServiceImpl>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let payout = service
        .set_payout_status(&id, PayoutStatus::Rejected)
        .await
        .map_err(HandlerError::from)?;
    Ok(Json(json!({ "payout": payout })))
}
