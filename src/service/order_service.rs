use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::dto::order_dto::{OrderItemRequest, PlaceOrderRequest};
use crate::model::order::{Order, OrderItem, OrderStatus};
use crate::repository::coupon_repo::{CouponRepository, MongoCouponRepository};
use crate::repository::order_repo::{MongoOrderRepository, OrderRepository, OrderStats};
use crate::repository::product_repo::{MongoProductRepository, ProductRepository};
use crate::service::coupon_service::{evaluate_coupon, normalize_code};
use crate::util::error::ServiceError;

/// Sum of unit price x quantity over the snapshotted items.
pub fn order_total(items: &[OrderItem]) -> f64 {
    items
        .iter()
        .map(|item| item.price * item.quantity as f64)
        .sum()
}

/// The grand total never goes below zero, whatever the discount.
pub fn final_total(total: f64, discount_total: f64) -> f64 {
    (total - discount_total).max(0.0)
}

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn place_order(&self, user_id: &str, req: PlaceOrderRequest)
        -> Result<Order, ServiceError>;
    async fn list_mine(&self, user_id: &str) -> Result<Vec<Order>, ServiceError>;
    async fn list_all(&self) -> Result<Vec<Order>, ServiceError>;
    async fn set_status(&self, order_id: &str, status: &str) -> Result<Order, ServiceError>;
    async fn assign(&self, order_id: &str, delivery_user_id: &str) -> Result<Order, ServiceError>;
    async fn assigned(&self, delivery_user_id: &str) -> Result<Vec<Order>, ServiceError>;
    async fn picked(&self, order_id: &str, delivery_user_id: &str) -> Result<Order, ServiceError>;
    async fn delivered(&self, order_id: &str, delivery_user_id: &str)
        -> Result<Order, ServiceError>;
    async fn stats(&self) -> Result<OrderStats, ServiceError>;
}

pub struct OrderServiceImpl {
    pub order_repo: Arc<MongoOrderRepository>,
    pub product_repo: Arc<MongoProductRepository>,
    pub coupon_repo: Arc<MongoCouponRepository>,
}

impl OrderServiceImpl {
    pub fn new(
        order_repo: Arc<MongoOrderRepository>,
        product_repo: Arc<MongoProductRepository>,
        coupon_repo: Arc<MongoCouponRepository>,
    ) -> Self {
        Self {
            order_repo,
            product_repo,
            coupon_repo,
        }
    }

    /// Resolve requested lines into price snapshots. Any missing product
    /// fails the whole order.
    async fn resolve_items(
        &self,
        items: &[OrderItemRequest],
    ) -> Result<Vec<OrderItem>, ServiceError> {
        let mut resolved = Vec::with_capacity(items.len());
        for item in items {
            let product_id = parse_oid(&item.product_id)?;
            let product = self.product_repo.find_by_id(product_id).await?;
            resolved.push(OrderItem {
                product: product_id,
                title: product.title.clone(),
                price: product.effective_price(),
                quantity: item.quantity,
            });
        }
        Ok(resolved)
    }
}

fn parse_oid(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id).map_err(|_| ServiceError::InvalidInput(format!("Invalid id: {}", id)))
}

#[async_trait]
impl OrderService for OrderServiceImpl {
    #[instrument(skip(self, req), fields(items = req.items.len()))]
    async fn place_order(
        &self,
        user_id: &str,
        req: PlaceOrderRequest,
    ) -> Result<Order, ServiceError> {
        let user = parse_oid(user_id)?;
        let items = self.resolve_items(&req.items).await?;
        let total = order_total(&items);

        // An invalid coupon code silently yields a zero discount rather than
        // rejecting the order.
        let mut discount_total = 0.0;
        if let Some(code) = req.coupon_code.as_deref().filter(|c| !c.is_empty()) {
            let coupon = self.coupon_repo.find_by_code(&normalize_code(code)).await?;
            let eval = evaluate_coupon(coupon.as_ref(), total, Utc::now());
            if eval.valid {
                discount_total = eval.discount_amount;
            } else {
                warn!(code, "Coupon not applied at order placement");
            }
        }

        let order = Order {
            id: None,
            user,
            items,
            total,
            discount_total,
            final_total: final_total(total, discount_total),
            address: req.address,
            status: OrderStatus::Placed,
            assigned_to: None,
            created_at: None,
            updated_at: None,
        };
        let created = self.order_repo.insert(order).await?;
        info!(final_total = created.final_total, "Order placed");
        Ok(created)
    }

    async fn list_mine(&self, user_id: &str) -> Result<Vec<Order>, ServiceError> {
        let user = parse_oid(user_id)?;
        Ok(self.order_repo.list_by_user(user).await?)
    }

    async fn list_all(&self) -> Result<Vec<Order>, ServiceError> {
        Ok(self.order_repo.list_all().await?)
    }

    #[instrument(skip(self))]
    async fn set_status(&self, order_id: &str, status: &str) -> Result<Order, ServiceError> {
        let id = parse_oid(order_id)?;
        let next = OrderStatus::parse(status)
            .ok_or_else(|| ServiceError::InvalidInput(format!("Unknown status: {}", status)))?;
        let current = self.order_repo.find_by_id(id).await?;
        if !current.status.can_transition_to(next) {
            return Err(ServiceError::InvalidInput(format!(
                "Illegal status transition: {} -> {}",
                current.status, next
            )));
        }
        if current.status == next {
            return Ok(current);
        }
        Ok(self.order_repo.update_status(id, next).await?)
    }

    async fn assign(&self, order_id: &str, delivery_user_id: &str) -> Result<Order, ServiceError> {
        let id = parse_oid(order_id)?;
        let delivery = parse_oid(delivery_user_id)?;
        let order = self.order_repo.assign(id, delivery).await?;
        info!(order = %order_id, delivery = %delivery_user_id, "Order assigned");
        Ok(order)
    }

    async fn assigned(&self, delivery_user_id: &str) -> Result<Vec<Order>, ServiceError> {
        let delivery = parse_oid(delivery_user_id)?;
        Ok(self.order_repo.list_by_assignee(delivery).await?)
    }

    async fn picked(&self, order_id: &str, delivery_user_id: &str) -> Result<Order, ServiceError> {
        let id = parse_oid(order_id)?;
        let delivery = parse_oid(delivery_user_id)?;
        // Both delivery writes only apply to an order that is still out for
        // delivery; a cancelled or already-delivered order reads as not
        // found, keeping the terminal states terminal.
        Ok(self
            .order_repo
            .update_status_scoped(
                id,
                delivery,
                &[OrderStatus::OutForDelivery],
                OrderStatus::OutForDelivery,
            )
            .await?)
    }

    async fn delivered(
        &self,
        order_id: &str,
        delivery_user_id: &str,
    ) -> Result<Order, ServiceError> {
        let id = parse_oid(order_id)?;
        let delivery = parse_oid(delivery_user_id)?;
        Ok(self
            .order_repo
            .update_status_scoped(
                id,
                delivery,
                &[OrderStatus::OutForDelivery],
                OrderStatus::Delivered,
            )
            .await?)
    }

    async fn stats(&self) -> Result<OrderStats, ServiceError> {
        Ok(self.order_repo.stats().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: f64, quantity: u32) -> OrderItem {
        OrderItem {
            product: ObjectId::new(),
            title: "item".to_string(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_order_total_sums_lines() {
        let items = vec![item(30.0, 2), item(12.5, 4)];
        assert_eq!(order_total(&items), 110.0);
    }

    #[test]
    fn test_final_total_clamped_at_zero() {
        assert_eq!(final_total(60.0, 6.0), 54.0);
        assert_eq!(final_total(10.0, 25.0), 0.0);
    }
}
