use chrono::{Duration, Utc};

use khetkart_backend::model::coupon::Coupon;
use khetkart_backend::service::coupon_service::{evaluate_coupon, normalize_code};

fn coupon(percent: f64) -> Coupon {
    Coupon {
        id: None,
        code: "SAVE10".to_string(),
        description: None,
        discount_percent: percent,
        is_active: true,
        expires_at: None,
        created_at: None,
        updated_at: None,
    }
}

#[test]
fn test_valid_coupon_discounts_rounded_amount() {
    let c = coupon(10.0);
    let eval = evaluate_coupon(Some(&c), 60.0, Utc::now());
    assert!(eval.valid);
    assert_eq!(eval.discount_percent, 10.0);
    assert_eq!(eval.discount_amount, 6.0);
}

#[test]
fn test_discount_rounds_to_nearest_unit() {
    let c = coupon(15.0);
    // 15% of 99 = 14.85, rounds to 15
    let eval = evaluate_coupon(Some(&c), 99.0, Utc::now());
    assert_eq!(eval.discount_amount, 15.0);

    // 15% of 9 = 1.35, rounds to 1
    let eval = evaluate_coupon(Some(&c), 9.0, Utc::now());
    assert_eq!(eval.discount_amount, 1.0);
}

#[test]
fn test_missing_coupon_is_invalid() {
    let eval = evaluate_coupon(None, 100.0, Utc::now());
    assert!(!eval.valid);
    assert_eq!(eval.discount_amount, 0.0);
}

#[test]
fn test_inactive_coupon_is_invalid() {
    let mut c = coupon(10.0);
    c.is_active = false;
    assert!(!evaluate_coupon(Some(&c), 100.0, Utc::now()).valid);
}

#[test]
fn test_expired_coupon_is_invalid() {
    let now = Utc::now();
    let mut c = coupon(10.0);
    c.expires_at = Some(bson::DateTime::from_chrono(now - Duration::hours(1)));
    assert!(!evaluate_coupon(Some(&c), 100.0, now).valid);
}

#[test]
fn test_future_expiry_is_valid() {
    let now = Utc::now();
    let mut c = coupon(10.0);
    c.expires_at = Some(bson::DateTime::from_chrono(now + Duration::hours(1)));
    assert!(evaluate_coupon(Some(&c), 100.0, now).valid);
}

#[test]
fn test_zero_percent_coupon_is_valid_but_free_of_effect() {
    let c = coupon(0.0);
    let eval = evaluate_coupon(Some(&c), 100.0, Utc::now());
    assert!(eval.valid);
    assert_eq!(eval.discount_amount, 0.0);
}

#[test]
fn test_code_lookup_ignores_case_and_whitespace() {
    // A code typed with stray spaces or lowercase resolves to the same
    // stored value at the cart preview and at checkout.
    assert_eq!(normalize_code(" save10 "), "SAVE10");
    assert_eq!(normalize_code("Save10"), "SAVE10");
    assert_eq!(normalize_code("SAVE10"), "SAVE10");
}
