use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    #[validate(length(min = 2, max = 32))]
    pub code: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount_percent: f64,
    pub is_active: Option<bool>,
    /// RFC 3339 timestamp
    pub expires_at: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCouponRequest {
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount_percent: Option<f64>,
    pub is_active: Option<bool>,
    pub expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateCouponQuery {
    pub code: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
}
