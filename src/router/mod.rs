pub mod auth_router;
pub mod coupon_router;
pub mod delivery_router;
pub mod order_router;
pub mod product_router;
pub mod referral_router;
pub mod upload_router;
pub mod user_router;
