use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Database, IndexModel};
use tracing::{error, info};

use crate::model::user::{CodeRequestStatus, Role, User};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_referral_code(&self, code: &str) -> RepositoryResult<Option<User>>;
    async fn update_fields(&self, id: ObjectId, set: Document) -> RepositoryResult<User>;
    async fn list(
        &self,
        q: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> RepositoryResult<(Vec<User>, u64)>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn credit_coins(&self, id: ObjectId, amount: i64) -> RepositoryResult<()>;
    /// Debits only when the balance covers the amount; the balance check and
    /// the decrement happen in one document write.
    async fn debit_coins(&self, id: ObjectId, amount: i64) -> RepositoryResult<User>;
    async fn apply_referral(
        &self,
        referred: ObjectId,
        referrer: ObjectId,
        reward: i64,
    ) -> RepositoryResult<User>;
    async fn set_referral_code(&self, id: ObjectId, code: &str) -> RepositoryResult<()>;
    async fn set_requested_code(
        &self,
        id: ObjectId,
        code: &str,
        status: CodeRequestStatus,
    ) -> RepositoryResult<User>;
    async fn set_password_hash(&self, id: ObjectId, hash: &str) -> RepositoryResult<()>;
    async fn set_reset_token(
        &self,
        id: ObjectId,
        token: &str,
        expires: bson::DateTime,
    ) -> RepositoryResult<()>;
}

pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        MongoUserRepository {
            collection: db.collection::<User>("users"),
        }
    }

    /// Unique email and sparse-unique referral code indexes. Best effort at
    /// startup.
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let code_index = IndexModel::builder()
            .keys(doc! { "referralCode": 1 })
            .options(IndexOptions::builder().unique(true).sparse(true).build())
            .build();
        self.collection
            .create_indexes([email_index, code_index], None)
            .await?;
        Ok(())
    }
}

fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339()
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = now_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        self.collection.insert_one(user.clone(), None).await?;
        info!(user_id = %user.id.as_ref().map(|id| id.to_hex()).unwrap_or_default(), "User inserted");
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to find user by email: {}", e))
            })?;
        Ok(user)
    }

    async fn find_by_referral_code(&self, code: &str) -> RepositoryResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "referralCode": code }, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to find user by referral code: {}", e))
            })?;
        Ok(user)
    }

    async fn update_fields(&self, id: ObjectId, mut set: Document) -> RepositoryResult<User> {
        set.insert("updatedAt", now_rfc3339());
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set }, options)
            .await?;
        updated.ok_or_else(|| RepositoryError::not_found(format!("No user found for ID: {}", id)))
    }

    async fn list(
        &self,
        q: Option<&str>,
        page: u64,
        page_size: u64,
    ) -> RepositoryResult<(Vec<User>, u64)> {
        let filter = match q {
            Some(q) if !q.is_empty() => doc! {
                "$or": [
                    { "name": { "$regex": q, "$options": "i" } },
                    { "email": { "$regex": q, "$options": "i" } },
                ]
            },
            _ => doc! {},
        };
        let total = self
            .collection
            .count_documents(filter.clone(), None)
            .await?;
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(crate::repository::page_skip(page, page_size))
            .limit(page_size as i64)
            .build();
        let cursor = self.collection.find(filter, options).await?;
        let users = cursor.try_collect().await.map_err(|e| {
            error!("Failed to deserialize users: {}", e);
            RepositoryError::serialization(format!("Failed to deserialize users: {}", e))
        })?;
        Ok((users, total))
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No user found to delete for ID: {}",
                id
            )));
        }
        Ok(())
    }

    async fn credit_coins(&self, id: ObjectId, amount: i64) -> RepositoryResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$inc": { "coins": amount }, "$set": { "updatedAt": now_rfc3339() } },
                None,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No user found to credit for ID: {}",
                id
            )));
        }
        Ok(())
    }

    async fn debit_coins(&self, id: ObjectId, amount: i64) -> RepositoryResult<User> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id, "coins": { "$gte": amount } },
                doc! { "$inc": { "coins": -amount }, "$set": { "updatedAt": now_rfc3339() } },
                options,
            )
            .await?;
        updated.ok_or_else(|| {
            RepositoryError::validation("Insufficient coins".to_string())
        })
    }

    async fn apply_referral(
        &self,
        referred: ObjectId,
        referrer: ObjectId,
        reward: i64,
    ) -> RepositoryResult<User> {
        // referredBy is immutable once set; the compound filter rejects a
        // second application at the query level.
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": referred, "referredBy": null },
                doc! {
                    "$set": { "referredBy": referrer, "updatedAt": now_rfc3339() },
                    "$inc": { "coins": reward },
                },
                options,
            )
            .await?;
        updated.ok_or_else(|| {
            RepositoryError::already_exists("Referral already applied".to_string())
        })
    }

    async fn set_referral_code(&self, id: ObjectId, code: &str) -> RepositoryResult<()> {
        self.update_fields(id, doc! { "referralCode": code }).await?;
        Ok(())
    }

    async fn set_requested_code(
        &self,
        id: ObjectId,
        code: &str,
        status: CodeRequestStatus,
    ) -> RepositoryResult<User> {
        let status_str = match status {
            CodeRequestStatus::Pending => "pending",
            CodeRequestStatus::Approved => "approved",
            CodeRequestStatus::Rejected => "rejected",
        };
        self.update_fields(
            id,
            doc! { "requestedCode": code, "requestedCodeStatus": status_str },
        )
        .await
    }

    async fn set_password_hash(&self, id: ObjectId, hash: &str) -> RepositoryResult<()> {
        self.update_fields(
            id,
            doc! { "passwordHash": hash, "resetToken": null, "resetExpires": null },
        )
        .await?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: ObjectId,
        token: &str,
        expires: bson::DateTime,
    ) -> RepositoryResult<()> {
        self.update_fields(id, doc! { "resetToken": token, "resetExpires": expires })
            .await?;
        Ok(())
    }
}

/// Build the `$set` document an admin user update is allowed to touch.
pub fn admin_update_document(
    name: Option<&str>,
    role: Option<Role>,
    is_active: Option<bool>,
    address: Option<&str>,
    phone: Option<&str>,
) -> Document {
    let mut set = Document::new();
    if let Some(name) = name {
        set.insert("name", name);
    }
    if let Some(role) = role {
        set.insert("role", role.as_str());
    }
    if let Some(is_active) = is_active {
        set.insert("isActive", is_active);
    }
    if let Some(address) = address {
        set.insert("address", address);
    }
    if let Some(phone) = phone {
        set.insert("phone", phone);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_update_document_only_sets_given_fields() {
        let set = admin_update_document(Some("Asha"), Some(Role::Farmer), None, None, None);
        assert_eq!(set.get_str("name").unwrap(), "Asha");
        assert_eq!(set.get_str("role").unwrap(), "farmer");
        assert!(!set.contains_key("isActive"));
        assert!(!set.contains_key("address"));
    }
}
