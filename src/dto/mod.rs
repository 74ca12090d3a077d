pub mod auth_dto;
pub mod coupon_dto;
pub mod order_dto;
pub mod product_dto;
pub mod referral_dto;
pub mod user_dto;
