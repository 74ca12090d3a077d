use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::config::rewards_conf::RewardsConfig;
use crate::dto::auth_dto::{
    AuthResponse, ChangePasswordRequest, PublicUser, RegisterRequest, UpdateMeRequest,
};
use crate::dto::user_dto::{CreateUserRequest, ListUsersQuery, UpdateUserRequest};
use crate::model::referral::Referral;
use crate::model::user::{Role, User};
use crate::repository::referral_repo::{MongoReferralRepository, ReferralRepository};
use crate::repository::user_repo::{admin_update_document, MongoUserRepository, UserRepository};
use crate::util::error::ServiceError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};
use crate::util::referral_code::generate_referral_code;

/// Reset tokens stay valid for one hour.
const RESET_TOKEN_TTL_MINUTES: i64 = 60;

#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub email: String,
    pub created: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListPage {
    pub users: Vec<PublicUser>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, ServiceError>;
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ServiceError>;
    async fn me(&self, user_id: &str) -> Result<PublicUser, ServiceError>;
    async fn update_me(
        &self,
        user_id: &str,
        req: UpdateMeRequest,
    ) -> Result<PublicUser, ServiceError>;
    async fn change_password(
        &self,
        user_id: &str,
        req: ChangePasswordRequest,
    ) -> Result<(), ServiceError>;
    async fn forgot_password(&self, email: &str) -> Result<String, ServiceError>;
    async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), ServiceError>;
    async fn seed_demo(&self) -> Result<Vec<SeedResult>, ServiceError>;
    async fn list_users(&self, query: ListUsersQuery) -> Result<UserListPage, ServiceError>;
    async fn create_user(&self, req: CreateUserRequest) -> Result<PublicUser, ServiceError>;
    async fn update_user(&self, id: &str, req: UpdateUserRequest)
        -> Result<PublicUser, ServiceError>;
    async fn delete_user(&self, id: &str) -> Result<(), ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<MongoUserRepository>,
    pub referral_repo: Arc<MongoReferralRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub rewards: RewardsConfig,
}

impl UserServiceImpl {
    pub fn new(
        user_repo: Arc<MongoUserRepository>,
        referral_repo: Arc<MongoReferralRepository>,
        jwt_utils: Arc<JwtTokenUtilsImpl>,
        rewards: RewardsConfig,
    ) -> Self {
        Self {
            user_repo,
            referral_repo,
            jwt_utils,
            rewards,
        }
    }

    async fn fresh_referral_code(&self, base: &str) -> Result<String, ServiceError> {
        // Regenerate on collision; the random suffix makes repeats unlikely.
        loop {
            let code = generate_referral_code(base);
            if self.user_repo.find_by_referral_code(&code).await?.is_none() {
                return Ok(code);
            }
        }
    }

    /// Credits both parties and records the referral event. Three separate
    /// writes, no transaction; each coin mutation is a single-document $inc.
    async fn grant_referral(&self, referrer: &User, referred: &User) -> Result<(), ServiceError> {
        let referrer_id = referrer
            .id
            .ok_or_else(|| ServiceError::InternalError("Referrer missing id".to_string()))?;
        let referred_id = referred
            .id
            .ok_or_else(|| ServiceError::InternalError("Referred user missing id".to_string()))?;
        let code = referrer.referral_code.clone().unwrap_or_default();

        self.user_repo
            .apply_referral(referred_id, referrer_id, self.rewards.referred_reward)
            .await?;
        self.user_repo
            .credit_coins(referrer_id, self.rewards.referrer_reward)
            .await?;
        self.referral_repo
            .insert(Referral {
                id: None,
                code,
                referrer: referrer_id,
                referred: referred_id,
                reward_referrer: self.rewards.referrer_reward,
                reward_referred: self.rewards.referred_reward,
                created_at: None,
            })
            .await?;
        info!(
            referrer = %referrer_id.to_hex(),
            referred = %referred_id.to_hex(),
            "Referral rewards granted"
        );
        Ok(())
    }

    fn issue_token(&self, user: &User) -> Result<String, ServiceError> {
        let id = user
            .id
            .as_ref()
            .map(|id| id.to_hex())
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;
        self.jwt_utils
            .generate_token(&id, user.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))
    }
}

fn parse_oid(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id).map_err(|_| ServiceError::InvalidInput(format!("Invalid id: {}", id)))
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, req), fields(email = %req.email))]
    async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, ServiceError> {
        info!("Registering new user");
        if self.user_repo.find_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::Conflict(
                "Email already registered".to_string(),
            ));
        }

        let mut user = User::new(req.name.clone(), req.email.clone(), req.role.unwrap_or(Role::User));
        user.password_hash = PasswordUtilsImpl::hash_password(&req.password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        // Every account gets a share code of its own at registration.
        user.referral_code = Some(self.fresh_referral_code(&req.name).await?);

        let inserted = self.user_repo.insert(user).await?;

        if let Some(code) = req.referral_code.as_deref().filter(|c| !c.is_empty()) {
            match self.user_repo.find_by_referral_code(code).await? {
                Some(referrer) if referrer.id != inserted.id => {
                    // A failed grant does not fail the registration.
                    if let Err(e) = self.grant_referral(&referrer, &inserted).await {
                        error!("Referral grant failed during registration: {}", e);
                    }
                }
                Some(_) => warn!("Registration supplied the user's own referral code"),
                None => warn!("Registration supplied an unknown referral code"),
            }
        }

        let token = self.issue_token(&inserted)?;
        // Re-read so the response carries any referral credit.
        let user = match inserted.id {
            Some(id) => self.user_repo.find_by_id(&id).await?.unwrap_or(inserted),
            None => inserted,
        };
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ServiceError> {
        // One failure surface for unknown email and bad password.
        let invalid = || ServiceError::Unauthorized("Invalid credentials".to_string());
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(invalid)?;
        let ok = PasswordUtilsImpl::verify_password(password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !ok {
            warn!("Invalid credentials for {}", email);
            return Err(invalid());
        }
        let token = self.issue_token(&user)?;
        info!("User logged in");
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    async fn me(&self, user_id: &str) -> Result<PublicUser, ServiceError> {
        let id = parse_oid(user_id)?;
        let user = self
            .user_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        Ok(user.into())
    }

    async fn update_me(
        &self,
        user_id: &str,
        req: UpdateMeRequest,
    ) -> Result<PublicUser, ServiceError> {
        let id = parse_oid(user_id)?;
        let mut set = bson::Document::new();
        if let Some(name) = req.name {
            set.insert("name", name);
        }
        if let Some(address) = req.address {
            set.insert("address", address);
        }
        if let Some(phone) = req.phone {
            set.insert("phone", phone);
        }
        if set.is_empty() {
            return self.me(user_id).await;
        }
        let user = self.user_repo.update_fields(id, set).await?;
        Ok(user.into())
    }

    #[instrument(skip(self, req))]
    async fn change_password(
        &self,
        user_id: &str,
        req: ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        let id = parse_oid(user_id)?;
        let user = self
            .user_repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        let ok = PasswordUtilsImpl::verify_password(&req.current_password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !ok {
            return Err(ServiceError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }
        let hash = PasswordUtilsImpl::hash_password(&req.new_password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        self.user_repo.set_password_hash(id, &hash).await?;
        info!("Password changed");
        Ok(())
    }

    #[instrument(skip(self), fields(email = %email))]
    async fn forgot_password(&self, email: &str) -> Result<String, ServiceError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        let id = user
            .id
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;
        let token = PasswordUtilsImpl::generate_reset_token();
        let expires = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.user_repo
            .set_reset_token(id, &token, bson::DateTime::from_chrono(expires))
            .await?;
        info!("Password reset token generated");
        Ok(token)
    }

    #[instrument(skip(self, token, new_password), fields(email = %email))]
    async fn reset_password(
        &self,
        email: &str,
        token: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;
        let id = user
            .id
            .ok_or_else(|| ServiceError::InternalError("User missing id".to_string()))?;
        let stored = user
            .reset_token
            .as_deref()
            .ok_or_else(|| ServiceError::InvalidInput("Invalid or expired token".to_string()))?;
        let expires = user
            .reset_expires
            .ok_or_else(|| ServiceError::InvalidInput("Invalid or expired token".to_string()))?;
        if stored != token || expires.to_chrono() <= Utc::now() {
            return Err(ServiceError::InvalidInput(
                "Invalid or expired token".to_string(),
            ));
        }
        let hash = PasswordUtilsImpl::hash_password(new_password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        // Setting the hash also clears the token, making it single-use.
        self.user_repo.set_password_hash(id, &hash).await?;
        info!("Password reset");
        Ok(())
    }

    async fn seed_demo(&self) -> Result<Vec<SeedResult>, ServiceError> {
        let demos = [
            ("Admin", "admin@khetkart.com", "admin123", Role::Admin),
            ("User", "user@khetkart.com", "user123", Role::User),
            (
                "Delivery",
                "delivery@khetkart.com",
                "delivery123",
                Role::Delivery,
            ),
            ("Farmer", "farmer@khetkart.com", "farmer123", Role::Farmer),
        ];
        let mut results = Vec::new();
        for (name, email, password, role) in demos {
            if self.user_repo.find_by_email(email).await?.is_some() {
                results.push(SeedResult {
                    email: email.to_string(),
                    created: false,
                });
                continue;
            }
            let mut user = User::new(name.to_string(), email.to_string(), role);
            user.password_hash = PasswordUtilsImpl::hash_password(password)
                .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
            user.referral_code = Some(self.fresh_referral_code(name).await?);
            self.user_repo.insert(user).await?;
            results.push(SeedResult {
                email: email.to_string(),
                created: true,
            });
        }
        Ok(results)
    }

    async fn list_users(&self, query: ListUsersQuery) -> Result<UserListPage, ServiceError> {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(20).clamp(1, 100);
        let (users, total) = self
            .user_repo
            .list(query.q.as_deref(), page, page_size)
            .await?;
        Ok(UserListPage {
            users: users.into_iter().map(PublicUser::from).collect(),
            total,
            page,
            page_size,
        })
    }

    async fn create_user(&self, req: CreateUserRequest) -> Result<PublicUser, ServiceError> {
        if self.user_repo.find_by_email(&req.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }
        let mut user = User::new(req.name.clone(), req.email, req.role.unwrap_or(Role::User));
        user.password_hash = PasswordUtilsImpl::hash_password(&req.password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))?;
        user.referral_code = Some(self.fresh_referral_code(&req.name).await?);
        let inserted = self.user_repo.insert(user).await?;
        Ok(inserted.into())
    }

    async fn update_user(
        &self,
        id: &str,
        req: UpdateUserRequest,
    ) -> Result<PublicUser, ServiceError> {
        let id = parse_oid(id)?;
        let set = admin_update_document(
            req.name.as_deref(),
            req.role,
            req.is_active,
            req.address.as_deref(),
            req.phone.as_deref(),
        );
        if set.is_empty() {
            return Err(ServiceError::InvalidInput("Nothing to update".to_string()));
        }
        let user = self.user_repo.update_fields(id, set).await?;
        Ok(user.into())
    }

    async fn delete_user(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_oid(id)?;
        self.user_repo.delete(id).await?;
        Ok(())
    }
}
