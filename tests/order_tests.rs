use bson::oid::ObjectId;
use chrono::Utc;

use khetkart_backend::model::coupon::Coupon;
use khetkart_backend::model::order::{OrderItem, OrderStatus};
use khetkart_backend::service::coupon_service::evaluate_coupon;
use khetkart_backend::service::order_service::{final_total, order_total};

fn item(price: f64, quantity: u32) -> OrderItem {
    OrderItem {
        product: ObjectId::new(),
        title: "Tomatoes".to_string(),
        price,
        quantity,
    }
}

#[test]
fn test_order_total_sums_line_items() {
    let items = vec![item(30.0, 2), item(12.5, 1)];
    assert_eq!(order_total(&items), 72.5);
}

#[test]
fn test_order_total_empty_is_zero() {
    assert_eq!(order_total(&[]), 0.0);
}

#[test]
fn test_final_total_applies_discount() {
    assert_eq!(final_total(60.0, 6.0), 54.0);
}

#[test]
fn test_final_total_never_negative() {
    assert_eq!(final_total(10.0, 25.0), 0.0);
}

// Checkout walkthrough: a 40-rupee product discounted to 30, bought twice,
// with a 10% coupon on top.
#[test]
fn test_discounted_product_with_coupon() {
    let items = vec![item(30.0, 2)];
    let total = order_total(&items);
    assert_eq!(total, 60.0);

    let coupon = Coupon {
        id: None,
        code: "SAVE10".to_string(),
        description: None,
        discount_percent: 10.0,
        is_active: true,
        expires_at: None,
        created_at: None,
        updated_at: None,
    };
    let eval = evaluate_coupon(Some(&coupon), total, Utc::now());
    assert!(eval.valid);
    assert_eq!(eval.discount_amount, 6.0);
    assert_eq!(final_total(total, eval.discount_amount), 54.0);
}

#[test]
fn test_status_parse_roundtrip() {
    for s in ["Placed", "Confirmed", "Out for delivery", "Delivered", "Cancelled"] {
        let status = OrderStatus::parse(s).expect("known status should parse");
        assert_eq!(status.as_str(), s);
    }
    assert!(OrderStatus::parse("Shipped").is_none());
}

#[test]
fn test_forward_transitions_allowed() {
    use OrderStatus::*;
    assert!(Placed.can_transition_to(Confirmed));
    assert!(Placed.can_transition_to(OutForDelivery));
    assert!(Placed.can_transition_to(Cancelled));
    assert!(Confirmed.can_transition_to(OutForDelivery));
    assert!(Confirmed.can_transition_to(Cancelled));
    assert!(OutForDelivery.can_transition_to(Delivered));
    assert!(OutForDelivery.can_transition_to(Cancelled));
}

#[test]
fn test_backward_transitions_rejected() {
    use OrderStatus::*;
    assert!(!Confirmed.can_transition_to(Placed));
    assert!(!OutForDelivery.can_transition_to(Confirmed));
    assert!(!Delivered.can_transition_to(OutForDelivery));
    assert!(!Placed.can_transition_to(Delivered));
}

#[test]
fn test_terminal_states_are_final() {
    use OrderStatus::*;
    for next in [Placed, Confirmed, OutForDelivery, Cancelled] {
        assert!(!Delivered.can_transition_to(next));
    }
    for next in [Placed, Confirmed, OutForDelivery, Delivered] {
        assert!(!Cancelled.can_transition_to(next));
    }
}

#[test]
fn test_same_state_is_a_no_op_transition() {
    use OrderStatus::*;
    for s in [Placed, Confirmed, OutForDelivery, Delivered, Cancelled] {
        assert!(s.can_transition_to(s));
    }
}
