use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyReferralRequest {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RequestCustomCodeRequest {
    #[validate(length(min = 4, max = 16))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WithdrawRequest {
    pub amount: i64,
    pub method: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStatsResponse {
    pub coins: i64,
    pub total_referred: u64,
    pub total_earned: i64,
}
