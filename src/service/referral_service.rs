use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::rewards_conf::RewardsConfig;
use crate::dto::referral_dto::ReferralStatsResponse;
use crate::model::payout::{Payout, PayoutStatus};
use crate::model::referral::Referral;
use crate::model::user::CodeRequestStatus;
use crate::repository::payout_repo::{MongoPayoutRepository, PayoutRepository};
use crate::repository::referral_repo::{MongoReferralRepository, ReferralRepository};
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::util::error::ServiceError;
use crate::util::referral_code::generate_referral_code;

#[derive(Debug, Serialize)]
pub struct ApplyReferralResponse {
    pub ok: bool,
    pub referral: Referral,
    pub coins: i64,
}

#[derive(Debug, Serialize)]
pub struct WithdrawResponse {
    pub ok: bool,
    pub payout: Payout,
    pub coins: i64,
}

#[async_trait]
pub trait ReferralService: Send + Sync {
    async fn my_code(&self, user_id: &str) -> Result<String, ServiceError>;
    async fn apply(&self, user_id: &str, code: &str) -> Result<ApplyReferralResponse, ServiceError>;
    async fn history(&self, user_id: &str) -> Result<Vec<Referral>, ServiceError>;
    async fn stats(&self, user_id: &str) -> Result<ReferralStatsResponse, ServiceError>;
    async fn request_custom_code(&self, user_id: &str, code: &str) -> Result<(), ServiceError>;
    async fn approve_custom_code(&self, target_user_id: &str) -> Result<(), ServiceError>;
    async fn decline_custom_code(&self, target_user_id: &str) -> Result<(), ServiceError>;
    async fn withdraw(
        &self,
        user_id: &str,
        amount: i64,
        method: Option<String>,
        details: Option<String>,
    ) -> Result<WithdrawResponse, ServiceError>;
    async fn my_payouts(&self, user_id: &str) -> Result<Vec<Payout>, ServiceError>;
    async fn all_payouts(&self) -> Result<Vec<Payout>, ServiceError>;
    async fn set_payout_status(
        &self,
        payout_id: &str,
        status: PayoutStatus,
    ) -> Result<Payout, ServiceError>;
}

pub struct ReferralServiceImpl {
    pub user_repo: Arc<MongoUserRepository>,
    pub referral_repo: Arc<MongoReferralRepository>,
    pub payout_repo: Arc<MongoPayoutRepository>,
    pub rewards: RewardsConfig,
}

impl ReferralServiceImpl {
    pub fn new(
        user_repo: Arc<MongoUserRepository>,
        referral_repo: Arc<MongoReferralRepository>,
        payout_repo: Arc<MongoPayoutRepository>,
        rewards: RewardsConfig,
    ) -> Self {
        Self {
            user_repo,
            referral_repo,
            payout_repo,
            rewards,
        }
    }

    async fn find_user(&self, user_id: &str) -> Result<crate::model::user::User, ServiceError> {
        let id = parse_oid(user_id)?;
        self.user_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }
}

fn parse_oid(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id).map_err(|_| ServiceError::InvalidInput(format!("Invalid id: {}", id)))
}

#[async_trait]
impl ReferralService for ReferralServiceImpl {
    async fn my_code(&self, user_id: &str) -> Result<String, ServiceError> {
        let user = self.find_user(user_id).await?;
        if let Some(code) = user.referral_code {
            return Ok(code);
        }
        // Older accounts may predate code assignment at registration.
        let id = user
            .id
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;
        let code = loop {
            let candidate = generate_referral_code(&user.name);
            if self
                .user_repo
                .find_by_referral_code(&candidate)
                .await?
                .is_none()
            {
                break candidate;
            }
        };
        self.user_repo.set_referral_code(id, &code).await?;
        Ok(code)
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn apply(
        &self,
        user_id: &str,
        code: &str,
    ) -> Result<ApplyReferralResponse, ServiceError> {
        let me = self.find_user(user_id).await?;
        let my_id = me
            .id
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;

        if me.referral_code.as_deref() == Some(code) {
            return Err(ServiceError::InvalidInput(
                "Cannot apply your own code".to_string(),
            ));
        }
        if me.referred_by.is_some() {
            return Err(ServiceError::Conflict(
                "Referral already applied".to_string(),
            ));
        }

        let referrer = self
            .user_repo
            .find_by_referral_code(code)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Invalid code".to_string()))?;
        let referrer_id = referrer
            .id
            .ok_or_else(|| ServiceError::InternalError("Referrer missing id".to_string()))?;
        if referrer_id == my_id {
            return Err(ServiceError::InvalidInput(
                "Cannot apply your own code".to_string(),
            ));
        }

        // Three writes, no transaction. The first one establishes referredBy
        // with a null-guard filter, so concurrent applications cannot
        // double-credit the referred user.
        let me = self
            .user_repo
            .apply_referral(my_id, referrer_id, self.rewards.referred_reward)
            .await?;
        self.user_repo
            .credit_coins(referrer_id, self.rewards.referrer_reward)
            .await?;
        let referral = self
            .referral_repo
            .insert(Referral {
                id: None,
                code: code.to_string(),
                referrer: referrer_id,
                referred: my_id,
                reward_referrer: self.rewards.referrer_reward,
                reward_referred: self.rewards.referred_reward,
                created_at: None,
            })
            .await?;

        info!("Referral applied");
        Ok(ApplyReferralResponse {
            ok: true,
            referral,
            coins: me.coins,
        })
    }

    async fn history(&self, user_id: &str) -> Result<Vec<Referral>, ServiceError> {
        let id = parse_oid(user_id)?;
        Ok(self.referral_repo.list_by_referrer(id).await?)
    }

    async fn stats(&self, user_id: &str) -> Result<ReferralStatsResponse, ServiceError> {
        let me = self.find_user(user_id).await?;
        let id = me
            .id
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;
        let total_referred = self.referral_repo.count_by_referrer(id).await?;
        let total_earned = self.referral_repo.total_earned(id).await?;
        Ok(ReferralStatsResponse {
            coins: me.coins,
            total_referred,
            total_earned,
        })
    }

    #[instrument(skip(self))]
    async fn request_custom_code(&self, user_id: &str, code: &str) -> Result<(), ServiceError> {
        let me = self.find_user(user_id).await?;
        let id = me
            .id
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;
        let code = code.trim().to_uppercase();
        if self
            .user_repo
            .find_by_referral_code(&code)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict("Code already taken".to_string()));
        }
        self.user_repo
            .set_requested_code(id, &code, CodeRequestStatus::Pending)
            .await?;
        info!("Custom code requested");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn approve_custom_code(&self, target_user_id: &str) -> Result<(), ServiceError> {
        let user = self.find_user(target_user_id).await?;
        let id = user
            .id
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;
        let requested = user.requested_code.ok_or_else(|| {
            ServiceError::InvalidInput("No custom code requested".to_string())
        })?;
        // The code may have been taken between request and approval; re-check
        // rather than lock.
        if let Some(owner) = self.user_repo.find_by_referral_code(&requested).await? {
            if owner.id != user.id {
                return Err(ServiceError::Conflict("Code already taken".to_string()));
            }
        }
        self.user_repo
            .update_fields(
                id,
                bson::doc! {
                    "referralCode": &requested,
                    "requestedCodeStatus": "approved",
                },
            )
            .await?;
        info!("Custom code approved");
        Ok(())
    }

    async fn decline_custom_code(&self, target_user_id: &str) -> Result<(), ServiceError> {
        let user = self.find_user(target_user_id).await?;
        let id = user
            .id
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;
        if user.requested_code.is_none() {
            return Err(ServiceError::InvalidInput(
                "No custom code requested".to_string(),
            ));
        }
        self.user_repo
            .update_fields(id, bson::doc! { "requestedCodeStatus": "rejected" })
            .await?;
        Ok(())
    }

    #[instrument(skip(self, method, details))]
    async fn withdraw(
        &self,
        user_id: &str,
        amount: i64,
        method: Option<String>,
        details: Option<String>,
    ) -> Result<WithdrawResponse, ServiceError> {
        let me = self.find_user(user_id).await?;
        let id = me
            .id
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;
        if amount <= 0 {
            return Err(ServiceError::InvalidInput("Invalid amount".to_string()));
        }
        if me.coins < amount {
            return Err(ServiceError::InvalidInput("Insufficient coins".to_string()));
        }
        // The debit re-checks the balance in the same document write.
        let me = self.user_repo.debit_coins(id, amount).await?;
        let payout = self
            .payout_repo
            .insert(Payout {
                id: None,
                user: id,
                amount,
                method,
                details,
                status: PayoutStatus::Pending,
                created_at: None,
            })
            .await?;
        info!(amount, "Withdrawal requested");
        Ok(WithdrawResponse {
            ok: true,
            payout,
            coins: me.coins,
        })
    }

    async fn my_payouts(&self, user_id: &str) -> Result<Vec<Payout>, ServiceError> {
        let id = parse_oid(user_id)?;
        Ok(self.payout_repo.list_by_user(id).await?)
    }

    async fn all_payouts(&self) -> Result<Vec<Payout>, ServiceError> {
        Ok(self.payout_repo.list_all().await?)
    }

    async fn set_payout_status(
        &self,
        payout_id: &str,
        status: PayoutStatus,
    ) -> Result<Payout, ServiceError> {
        let id = parse_oid(payout_id)?;
        Ok(self.payout_repo.update_status(id, status).await?)
    }
}
