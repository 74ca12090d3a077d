pub mod auth_handler;
pub mod coupon_handler;
pub mod delivery_handler;
pub mod order_handler;
pub mod product_handler;
pub mod referral_handler;
pub mod upload_handler;
pub mod user_handler;

use validator::Validate;

use crate::util::error::HandlerError;

pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), HandlerError> {
    payload
        .validate()
        .map_err(|e| HandlerError::bad_request(format!("Validation error: {}", e)))
}
