use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use tracing::info;

use crate::model::coupon::Coupon;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn insert(&self, coupon: Coupon) -> RepositoryResult<Coupon>;
    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Coupon>>;
    async fn list(&self) -> RepositoryResult<Vec<Coupon>>;
    async fn update_fields(&self, id: ObjectId, set: Document) -> RepositoryResult<Coupon>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
}

pub struct MongoCouponRepository {
    collection: mongodb::Collection<Coupon>,
}

impl MongoCouponRepository {
    pub fn new(db: &Database) -> Self {
        MongoCouponRepository {
            collection: db.collection::<Coupon>("coupons"),
        }
    }
}

#[async_trait]
impl CouponRepository for MongoCouponRepository {
    async fn insert(&self, mut coupon: Coupon) -> RepositoryResult<Coupon> {
        coupon.id = Some(ObjectId::new());
        let now = chrono::Local::now().to_rfc3339();
        coupon.created_at = Some(now.clone());
        coupon.updated_at = Some(now);
        self.collection.insert_one(coupon.clone(), None).await?;
        info!(code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Coupon>> {
        let coupon = self
            .collection
            .find_one(doc! { "code": code }, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to find coupon by code: {}", e))
            })?;
        Ok(coupon)
    }

    async fn list(&self) -> RepositoryResult<Vec<Coupon>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(doc! {}, options).await?;
        let coupons = cursor.try_collect().await.map_err(|e| {
            RepositoryError::serialization(format!("Failed to deserialize coupons: {}", e))
        })?;
        Ok(coupons)
    }

    async fn update_fields(&self, id: ObjectId, mut set: Document) -> RepositoryResult<Coupon> {
        set.insert("updatedAt", chrono::Local::now().to_rfc3339());
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await?;
        updated.ok_or_else(|| {
            RepositoryError::not_found(format!("No coupon found to update for ID: {}", id))
        })
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No coupon found to delete for ID: {}",
                id
            )));
        }
        Ok(())
    }
}
