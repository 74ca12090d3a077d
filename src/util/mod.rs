pub mod error;
pub mod jwt;
pub mod password;
pub mod referral_code;
