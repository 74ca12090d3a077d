use std::sync::Arc;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::dto::coupon_dto::{CreateCouponRequest, UpdateCouponRequest, ValidateCouponResponse};
use crate::model::coupon::Coupon;
use crate::repository::coupon_repo::{CouponRepository, MongoCouponRepository};
use crate::util::error::ServiceError;

/// Outcome of evaluating a coupon against an amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouponEvaluation {
    pub valid: bool,
    pub discount_percent: f64,
    pub discount_amount: f64,
}

impl CouponEvaluation {
    fn invalid() -> Self {
        CouponEvaluation {
            valid: false,
            discount_percent: 0.0,
            discount_amount: 0.0,
        }
    }
}

/// Canonical form of a coupon code as stored and looked up. Every path that
/// touches a code (creation, validation, order placement) goes through this
/// so the cart preview and checkout agree on what the user typed.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// The one coupon rule, shared by the standalone validate endpoint and order
/// placement. Absent, inactive, and expired coupons all collapse to a single
/// invalid outcome; a valid coupon discounts
/// `round(amount * discount_percent / 100)`.
pub fn evaluate_coupon(
    coupon: Option<&Coupon>,
    amount: f64,
    now: DateTime<Utc>,
) -> CouponEvaluation {
    let coupon = match coupon {
        Some(c) => c,
        None => return CouponEvaluation::invalid(),
    };
    if !coupon.is_active {
        return CouponEvaluation::invalid();
    }
    if let Some(expires_at) = coupon.expires_at {
        if expires_at.to_chrono() <= now {
            return CouponEvaluation::invalid();
        }
    }
    let discount_amount = (amount * coupon.discount_percent / 100.0).round();
    CouponEvaluation {
        valid: true,
        discount_percent: coupon.discount_percent,
        discount_amount,
    }
}

#[async_trait]
pub trait CouponService: Send + Sync {
    async fn list(&self) -> Result<Vec<Coupon>, ServiceError>;
    async fn create(&self, req: CreateCouponRequest) -> Result<Coupon, ServiceError>;
    async fn update(&self, id: &str, req: UpdateCouponRequest) -> Result<Coupon, ServiceError>;
    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
    async fn validate(&self, code: &str, amount: f64) -> Result<ValidateCouponResponse, ServiceError>;
}

pub struct CouponServiceImpl {
    pub coupon_repo: Arc<MongoCouponRepository>,
}

impl CouponServiceImpl {
    pub fn new(coupon_repo: Arc<MongoCouponRepository>) -> Self {
        Self { coupon_repo }
    }
}

fn parse_oid(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id).map_err(|_| ServiceError::InvalidInput(format!("Invalid id: {}", id)))
}

fn parse_expiry(value: &str) -> Result<bson::DateTime, ServiceError> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .map_err(|e| ServiceError::InvalidInput(format!("Invalid expiresAt: {}", e)))?;
    Ok(bson::DateTime::from_chrono(parsed.with_timezone(&Utc)))
}

#[async_trait]
impl CouponService for CouponServiceImpl {
    async fn list(&self) -> Result<Vec<Coupon>, ServiceError> {
        Ok(self.coupon_repo.list().await?)
    }

    #[instrument(skip(self, req), fields(code = %req.code))]
    async fn create(&self, req: CreateCouponRequest) -> Result<Coupon, ServiceError> {
        let code = normalize_code(&req.code);
        if self.coupon_repo.find_by_code(&code).await?.is_some() {
            return Err(ServiceError::Conflict("Coupon already exists".to_string()));
        }
        let expires_at = match req.expires_at.as_deref() {
            Some(v) => Some(parse_expiry(v)?),
            None => None,
        };
        let coupon = Coupon {
            id: None,
            code,
            description: req.description,
            discount_percent: req.discount_percent,
            is_active: req.is_active.unwrap_or(true),
            expires_at,
            created_at: None,
            updated_at: None,
        };
        let created = self.coupon_repo.insert(coupon).await?;
        info!(code = %created.code, "Coupon created");
        Ok(created)
    }

    async fn update(&self, id: &str, req: UpdateCouponRequest) -> Result<Coupon, ServiceError> {
        let id = parse_oid(id)?;
        let mut set = Document::new();
        if let Some(description) = req.description {
            set.insert("description", description);
        }
        if let Some(discount_percent) = req.discount_percent {
            set.insert("discountPercent", discount_percent);
        }
        if let Some(is_active) = req.is_active {
            set.insert("isActive", is_active);
        }
        if let Some(ref expires_at) = req.expires_at {
            if expires_at.is_empty() {
                set.insert("expiresAt", bson::Bson::Null);
            } else {
                set.insert("expiresAt", parse_expiry(expires_at)?);
            }
        }
        if set.is_empty() {
            return Err(ServiceError::InvalidInput("Nothing to update".to_string()));
        }
        Ok(self.coupon_repo.update_fields(id, set).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_oid(id)?;
        self.coupon_repo.delete(id).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn validate(
        &self,
        code: &str,
        amount: f64,
    ) -> Result<ValidateCouponResponse, ServiceError> {
        let code = normalize_code(code);
        let coupon = self.coupon_repo.find_by_code(&code).await?;
        let eval = evaluate_coupon(coupon.as_ref(), amount, Utc::now());
        if !eval.valid {
            return Ok(ValidateCouponResponse {
                valid: false,
                message: Some("Invalid or expired coupon".to_string()),
                discount_percent: None,
                discount_amount: None,
            });
        }
        Ok(ValidateCouponResponse {
            valid: true,
            message: None,
            discount_percent: Some(eval.discount_percent),
            discount_amount: Some(eval.discount_amount),
        })
    }
}
