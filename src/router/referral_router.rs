use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::referral_handler::{
    all_payouts_handler, apply_referral_handler, approve_custom_code_handler,
    approve_payout_handler, decline_custom_code_handler, my_code_handler, my_payouts_handler,
    referral_history_handler, referral_stats_handler, reject_payout_handler,
    request_custom_code_handler, withdraw_handler,
};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::referral_service::ReferralServiceImpl;

pub fn referral_router(
    service: Arc<ReferralServiceImpl>,
    any_auth: Arc<AuthState>,
    admin_auth: Arc<AuthState>,
) -> Router {
    let authed = Router::new()
        .route("/api/referrals/code", get(my_code_handler))
        .route("/api/referrals/apply", post(apply_referral_handler))
        .route("/api/referrals/history", get(referral_history_handler))
        .route("/api/referrals/stats", get(referral_stats_handler))
        .route(
            "/api/referrals/request-custom",
            post(request_custom_code_handler),
        )
        .route("/api/referrals/withdraw", post(withdraw_handler))
        .route("/api/referrals/payouts", get(my_payouts_handler))
        .route_layer(middleware::from_fn_with_state(any_auth, require_auth));

    let admin = Router::new()
        .route(
            "/api/referrals/{user_id}/approve-custom",
            post(approve_custom_code_handler),
        )
        .route(
            "/api/referrals/{user_id}/decline-custom",
            post(decline_custom_code_handler),
        )
        .route("/api/referrals/payouts/all", get(all_payouts_handler))
        .route(
            "/api/referrals/payouts/{id}/approve",
            post(approve_payout_handler),
        )
        .route(
            "/api/referrals/payouts/{id}/reject",
            post(reject_payout_handler),
        )
        .route_layer(middleware::from_fn_with_state(admin_auth, require_auth));

    authed.merge(admin).with_state(service)
}
