use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::TryStreamExt;
use mongodb::options::FindOptions;
use mongodb::Database;
use tracing::info;

use crate::model::referral::Referral;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait ReferralRepository: Send + Sync {
    async fn insert(&self, referral: Referral) -> RepositoryResult<Referral>;
    async fn list_by_referrer(&self, referrer: ObjectId) -> RepositoryResult<Vec<Referral>>;
    async fn count_by_referrer(&self, referrer: ObjectId) -> RepositoryResult<u64>;
    /// Lifetime coins earned by a referrer, summed over the event records.
    async fn total_earned(&self, referrer: ObjectId) -> RepositoryResult<i64>;
}

pub struct MongoReferralRepository {
    collection: mongodb::Collection<Referral>,
}

impl MongoReferralRepository {
    pub fn new(db: &Database) -> Self {
        MongoReferralRepository {
            collection: db.collection::<Referral>("referrals"),
        }
    }
}

#[async_trait]
impl ReferralRepository for MongoReferralRepository {
    async fn insert(&self, mut referral: Referral) -> RepositoryResult<Referral> {
        referral.id = Some(ObjectId::new());
        referral.created_at = Some(chrono::Local::now().to_rfc3339());
        self.collection.insert_one(referral.clone(), None).await?;
        info!(code = %referral.code, "Referral recorded");
        Ok(referral)
    }

    async fn list_by_referrer(&self, referrer: ObjectId) -> RepositoryResult<Vec<Referral>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self
            .collection
            .find(doc! { "referrer": referrer }, options)
            .await?;
        let referrals = cursor.try_collect().await.map_err(|e| {
            RepositoryError::serialization(format!("Failed to deserialize referrals: {}", e))
        })?;
        Ok(referrals)
    }

    async fn count_by_referrer(&self, referrer: ObjectId) -> RepositoryResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "referrer": referrer }, None)
            .await?;
        Ok(count)
    }

    async fn total_earned(&self, referrer: ObjectId) -> RepositoryResult<i64> {
        let pipeline = vec![
            doc! { "$match": { "referrer": referrer } },
            doc! { "$group": { "_id": null, "total": { "$sum": "$rewardReferrer" } } },
        ];
        let mut cursor = self.collection.aggregate(pipeline, None).await?;
        let total = match cursor.try_next().await? {
            Some(doc) => doc
                .get_i64("total")
                .or_else(|_| doc.get_i32("total").map(|t| t as i64))
                .unwrap_or(0),
            None => 0,
        };
        Ok(total)
    }
}
