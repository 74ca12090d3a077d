use std::sync::Arc;

use bson::oid::ObjectId;
use mongodb::Database;

use khetkart_backend::config::MongoConfig;
use khetkart_backend::model::order::{Order, OrderItem, OrderStatus};
use khetkart_backend::repository::coupon_repo::MongoCouponRepository;
use khetkart_backend::repository::order_repo::{MongoOrderRepository, OrderRepository};
use khetkart_backend::repository::product_repo::MongoProductRepository;
use khetkart_backend::service::order_service::{OrderService, OrderServiceImpl};
use khetkart_backend::util::error::ServiceError;

async fn setup_db() -> Database {
    let _ = dotenv::dotenv();
    let config = MongoConfig::from_env().expect("Failed to load MongoConfig");
    config
        .connect()
        .await
        .expect("Failed to connect to MongoDB")
}

fn order_service(db: &Database) -> (Arc<MongoOrderRepository>, OrderServiceImpl) {
    let order_repo = Arc::new(MongoOrderRepository::new(db));
    let product_repo = Arc::new(MongoProductRepository::new(db));
    let coupon_repo = Arc::new(MongoCouponRepository::new(db));
    let service = OrderServiceImpl::new(order_repo.clone(), product_repo, coupon_repo);
    (order_repo, service)
}

fn placed_order() -> Order {
    Order {
        id: None,
        user: ObjectId::new(),
        items: vec![OrderItem {
            product: ObjectId::new(),
            title: "Organic tomatoes".to_string(),
            price: 30.0,
            quantity: 2,
        }],
        total: 60.0,
        discount_total: 0.0,
        final_total: 60.0,
        address: "12 Market Road".to_string(),
        status: OrderStatus::Placed,
        assigned_to: None,
        created_at: None,
        updated_at: None,
    }
}

#[tokio::test]
async fn test_unassigned_partner_cannot_update_order() {
    let db = setup_db().await;
    let (order_repo, service) = order_service(&db);

    let order = order_repo
        .insert(placed_order())
        .await
        .expect("Failed to insert order");
    let order_id = order.id.expect("Order missing id");
    let assignee = ObjectId::new();
    service
        .assign(&order_id.to_hex(), &assignee.to_hex())
        .await
        .expect("Failed to assign order");

    // A delivery partner the order was never assigned to cannot see it.
    let stranger = ObjectId::new();
    let err = service
        .delivered(&order_id.to_hex(), &stranger.to_hex())
        .await
        .expect_err("Scoped update should fail for an unassigned partner");
    assert!(matches!(err, ServiceError::NotFound(_)));

    // The assignee still can.
    let delivered = service
        .delivered(&order_id.to_hex(), &assignee.to_hex())
        .await
        .expect("Assignee failed to deliver order");
    assert_eq!(delivered.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn test_cancelled_order_stays_cancelled() {
    let db = setup_db().await;
    let (order_repo, service) = order_service(&db);

    let order = order_repo
        .insert(placed_order())
        .await
        .expect("Failed to insert order");
    let order_id = order.id.expect("Order missing id");
    let assignee = ObjectId::new();
    service
        .assign(&order_id.to_hex(), &assignee.to_hex())
        .await
        .expect("Failed to assign order");

    // Admin cancels while the order is out for delivery.
    let cancelled = service
        .set_status(&order_id.to_hex(), "Cancelled")
        .await
        .expect("Failed to cancel order");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    // The assigned partner can no longer push the order to Delivered.
    let err = service
        .delivered(&order_id.to_hex(), &assignee.to_hex())
        .await
        .expect_err("Cancelled order should not accept a delivery update");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let stored = order_repo
        .find_by_id(order_id)
        .await
        .expect("Failed to fetch order");
    assert_eq!(stored.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_pickup_confirmation_only_while_out_for_delivery() {
    let db = setup_db().await;
    let (order_repo, service) = order_service(&db);

    let order = order_repo
        .insert(placed_order())
        .await
        .expect("Failed to insert order");
    let order_id = order.id.expect("Order missing id");
    let assignee = ObjectId::new();
    service
        .assign(&order_id.to_hex(), &assignee.to_hex())
        .await
        .expect("Failed to assign order");

    // Pickup confirmation is a no-op rewrite of "Out for delivery".
    let picked = service
        .picked(&order_id.to_hex(), &assignee.to_hex())
        .await
        .expect("Failed to confirm pickup");
    assert_eq!(picked.status, OrderStatus::OutForDelivery);

    service
        .delivered(&order_id.to_hex(), &assignee.to_hex())
        .await
        .expect("Failed to deliver order");

    // Delivered is terminal for the delivery endpoints too.
    let err = service
        .picked(&order_id.to_hex(), &assignee.to_hex())
        .await
        .expect_err("Delivered order should not accept a pickup update");
    assert!(matches!(err, ServiceError::NotFound(_)));
}
