pub mod coupon;
pub mod order;
pub mod payout;
pub mod product;
pub mod referral;
pub mod user;
