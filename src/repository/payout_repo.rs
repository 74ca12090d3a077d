use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use tracing::info;

use crate::model::payout::{Payout, PayoutStatus};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait PayoutRepository: Send + Sync {
    async fn insert(&self, payout: Payout) -> RepositoryResult<Payout>;
    async fn list_by_user(&self, user: ObjectId) -> RepositoryResult<Vec<Payout>>;
    async fn list_all(&self) -> RepositoryResult<Vec<Payout>>;
    async fn update_status(&self, id: ObjectId, status: PayoutStatus) -> RepositoryResult<Payout>;
}

pub struct MongoPayoutRepository {
    collection: mongodb::Collection<Payout>,
}

impl MongoPayoutRepository {
    pub fn new(db: &Database) -> Self {
        MongoPayoutRepository {
            collection: db.collection::<Payout>("payouts"),
        }
    }

    async fn list_with_filter(&self, filter: bson::Document) -> RepositoryResult<Vec<Payout>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection.find(filter, options).await?;
        let payouts = cursor.try_collect().await.map_err(|e| {
            RepositoryError::serialization(format!("Failed to deserialize payouts: {}", e))
        })?;
        Ok(payouts)
    }
}

#[async_trait]
impl PayoutRepository for MongoPayoutRepository {
    async fn insert(&self, mut payout: Payout) -> RepositoryResult<Payout> {
        payout.id = Some(ObjectId::new());
        payout.created_at = Some(chrono::Local::now().to_rfc3339());
        self.collection.insert_one(payout.clone(), None).await?;
        info!(amount = payout.amount, "Payout request recorded");
        Ok(payout)
    }

    async fn list_by_user(&self, user: ObjectId) -> RepositoryResult<Vec<Payout>> {
        self.list_with_filter(doc! { "user": user }).await
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Payout>> {
        self.list_with_filter(doc! {}).await
    }

    async fn update_status(&self, id: ObjectId, status: PayoutStatus) -> RepositoryResult<Payout> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str() } },
                options,
            )
            .await?;
        updated.ok_or_else(|| {
            RepositoryError::not_found(format!("No payout found to update for ID: {}", id))
        })
    }
}
