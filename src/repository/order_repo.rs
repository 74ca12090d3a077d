use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::model::order::{Order, OrderStatus};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Admin dashboard aggregates: revenue over non-cancelled orders and the
/// best-selling products by quantity.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStats {
    pub total_revenue: f64,
    pub order_count: u64,
    pub top_products: Vec<TopProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopProduct {
    pub product: ObjectId,
    pub title: String,
    pub quantity: i64,
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: Order) -> RepositoryResult<Order>;
    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Order>;
    async fn list_by_user(&self, user: ObjectId) -> RepositoryResult<Vec<Order>>;
    async fn list_all(&self) -> RepositoryResult<Vec<Order>>;
    async fn list_by_assignee(&self, assignee: ObjectId) -> RepositoryResult<Vec<Order>>;
    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> RepositoryResult<Order>;
    async fn assign(&self, id: ObjectId, delivery_user: ObjectId) -> RepositoryResult<Order>;
    /// Scoped status write: succeeds only when the order is assigned to the
    /// given delivery partner and its current status is one of `from`.
    /// Ownership and the lifecycle precondition are both enforced by the
    /// compound filter, not by separate checks.
    async fn update_status_scoped(
        &self,
        id: ObjectId,
        assignee: ObjectId,
        from: &[OrderStatus],
        status: OrderStatus,
    ) -> RepositoryResult<Order>;
    async fn stats(&self) -> RepositoryResult<OrderStats>;
}

pub struct MongoOrderRepository {
    collection: mongodb::Collection<Order>,
}

impl MongoOrderRepository {
    pub fn new(db: &Database) -> Self {
        MongoOrderRepository {
            collection: db.collection::<Order>("orders"),
        }
    }

    async fn list_with_filter(&self, filter: Document) -> RepositoryResult<Vec<Order>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(filter, options).await?;
        let orders = cursor.try_collect().await.map_err(|e| {
            RepositoryError::serialization(format!("Failed to deserialize orders: {}", e))
        })?;
        Ok(orders)
    }
}

fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339()
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    async fn insert(&self, mut order: Order) -> RepositoryResult<Order> {
        order.id = Some(ObjectId::new());
        let now = now_rfc3339();
        order.created_at = Some(now.clone());
        order.updated_at = Some(now);
        self.collection.insert_one(order.clone(), None).await?;
        info!(
            order_id = %order.id.as_ref().map(|id| id.to_hex()).unwrap_or_default(),
            final_total = order.final_total,
            "Order created"
        );
        Ok(order)
    }

    async fn find_by_id(&self, id: ObjectId) -> RepositoryResult<Order> {
        let order = self
            .collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch order: {}", e)))?;
        order.ok_or_else(|| RepositoryError::not_found(format!("Order not found for ID: {}", id)))
    }

    async fn list_by_user(&self, user: ObjectId) -> RepositoryResult<Vec<Order>> {
        self.list_with_filter(doc! { "user": user }).await
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Order>> {
        self.list_with_filter(doc! {}).await
    }

    async fn list_by_assignee(&self, assignee: ObjectId) -> RepositoryResult<Vec<Order>> {
        self.list_with_filter(doc! { "assignedTo": assignee }).await
    }

    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> RepositoryResult<Order> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str(), "updatedAt": now_rfc3339() } },
                options,
            )
            .await?;
        updated.ok_or_else(|| {
            RepositoryError::not_found(format!("No order found to update for ID: {}", id))
        })
    }

    async fn assign(&self, id: ObjectId, delivery_user: ObjectId) -> RepositoryResult<Order> {
        // Assignment and the forced "Out for delivery" status land in the
        // same write.
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": {
                    "assignedTo": delivery_user,
                    "status": OrderStatus::OutForDelivery.as_str(),
                    "updatedAt": now_rfc3339(),
                } },
                options,
            )
            .await?;
        updated.ok_or_else(|| {
            RepositoryError::not_found(format!("No order found to assign for ID: {}", id))
        })
    }

    async fn update_status_scoped(
        &self,
        id: ObjectId,
        assignee: ObjectId,
        from: &[OrderStatus],
        status: OrderStatus,
    ) -> RepositoryResult<Order> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let from: Vec<&str> = from.iter().map(OrderStatus::as_str).collect();
        let updated = self
            .collection
            .find_one_and_update(
                doc! {
                    "_id": id,
                    "assignedTo": assignee,
                    "status": { "$in": from },
                },
                doc! { "$set": { "status": status.as_str(), "updatedAt": now_rfc3339() } },
                options,
            )
            .await?;
        updated.ok_or_else(|| {
            RepositoryError::not_found(format!("Order not found for ID: {}", id))
        })
    }

    async fn stats(&self) -> RepositoryResult<OrderStats> {
        let not_cancelled = doc! { "status": { "$ne": OrderStatus::Cancelled.as_str() } };

        let revenue_pipeline = vec![
            doc! { "$match": not_cancelled.clone() },
            doc! { "$group": {
                "_id": null,
                "totalRevenue": { "$sum": "$finalTotal" },
                "orderCount": { "$sum": 1 },
            } },
        ];
        let mut cursor = self.collection.aggregate(revenue_pipeline, None).await?;
        let (total_revenue, order_count) = match cursor.try_next().await? {
            Some(doc) => (
                doc.get_f64("totalRevenue").unwrap_or(0.0),
                doc.get_i32("orderCount").unwrap_or(0) as u64,
            ),
            None => (0.0, 0),
        };

        let top_pipeline = vec![
            doc! { "$match": not_cancelled },
            doc! { "$unwind": "$items" },
            doc! { "$group": {
                "_id": "$items.product",
                "title": { "$first": "$items.title" },
                "quantity": { "$sum": "$items.quantity" },
            } },
            doc! { "$sort": { "quantity": -1 } },
            doc! { "$limit": 5 },
        ];
        let mut cursor = self.collection.aggregate(top_pipeline, None).await?;
        let mut top_products = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            let product = doc
                .get_object_id("_id")
                .map_err(|e| RepositoryError::serialization(e.to_string()))?;
            top_products.push(TopProduct {
                product,
                title: doc.get_str("title").unwrap_or_default().to_string(),
                quantity: doc
                    .get_i64("quantity")
                    .or_else(|_| doc.get_i32("quantity").map(|q| q as i64))
                    .unwrap_or(0),
            });
        }

        Ok(OrderStats {
            total_revenue,
            order_count,
            top_products,
        })
    }
}
