use std::sync::Arc;

use mongodb::Database;

use khetkart_backend::config::{JwtConfig, MongoConfig, RewardsConfig};
use khetkart_backend::dto::auth_dto::RegisterRequest;
use khetkart_backend::model::payout::PayoutStatus;
use khetkart_backend::model::user::User;
use khetkart_backend::repository::payout_repo::{MongoPayoutRepository, PayoutRepository};
use khetkart_backend::repository::referral_repo::{MongoReferralRepository, ReferralRepository};
use khetkart_backend::repository::user_repo::{MongoUserRepository, UserRepository};
use khetkart_backend::service::referral_service::{ReferralService, ReferralServiceImpl};
use khetkart_backend::service::user_service::{UserService, UserServiceImpl};
use khetkart_backend::util::error::ServiceError;
use khetkart_backend::util::jwt::JwtTokenUtilsImpl;

struct TestContext {
    user_repo: Arc<MongoUserRepository>,
    referral_repo: Arc<MongoReferralRepository>,
    payout_repo: Arc<MongoPayoutRepository>,
    user_service: UserServiceImpl,
    referral_service: ReferralServiceImpl,
}

async fn setup() -> TestContext {
    let _ = dotenv::dotenv();
    let config = MongoConfig::from_env().expect("Failed to load MongoConfig");
    let db: Database = config
        .connect()
        .await
        .expect("Failed to connect to MongoDB");

    let user_repo = Arc::new(MongoUserRepository::new(&db));
    let referral_repo = Arc::new(MongoReferralRepository::new(&db));
    let payout_repo = Arc::new(MongoPayoutRepository::new(&db));
    let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::from_test_env()));
    let rewards = RewardsConfig::default();

    let user_service = UserServiceImpl::new(
        user_repo.clone(),
        referral_repo.clone(),
        jwt_utils,
        rewards,
    );
    let referral_service = ReferralServiceImpl::new(
        user_repo.clone(),
        referral_repo.clone(),
        payout_repo.clone(),
        rewards,
    );
    TestContext {
        user_repo,
        referral_repo,
        payout_repo,
        user_service,
        referral_service,
    }
}

fn unique_email(tag: &str) -> String {
    format!("{}-{}@khetkart.test", tag, bson::oid::ObjectId::new().to_hex())
}

async fn register_user(ctx: &TestContext, tag: &str, referral_code: Option<String>) -> User {
    let email = unique_email(tag);
    ctx.user_service
        .register(RegisterRequest {
            name: format!("Test {}", tag),
            email: email.clone(),
            password: "secret-pass".to_string(),
            role: None,
            referral_code,
        })
        .await
        .expect("Failed to register user");
    ctx.user_repo
        .find_by_email(&email)
        .await
        .expect("Failed to fetch user")
        .expect("Registered user not found")
}

#[tokio::test]
async fn test_registration_with_code_credits_both_sides() {
    let ctx = setup().await;

    let referrer = register_user(&ctx, "referrer", None).await;
    let code = referrer
        .referral_code
        .clone()
        .expect("Registration should assign a share code");

    let referred = register_user(&ctx, "referred", Some(code)).await;

    let referrer = ctx
        .user_repo
        .find_by_id(&referrer.id.unwrap())
        .await
        .expect("Failed to refetch referrer")
        .expect("Referrer not found");
    assert_eq!(referrer.coins, 50);
    assert_eq!(referred.coins, 20);
    assert_eq!(referred.referred_by, referrer.id);

    let count = ctx
        .referral_repo
        .count_by_referrer(referrer.id.unwrap())
        .await
        .expect("Failed to count referrals");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_referral_applies_at_most_once() {
    let ctx = setup().await;

    let first = register_user(&ctx, "first", None).await;
    let second = register_user(&ctx, "second", None).await;
    let me = register_user(&ctx, "applicant", None).await;
    let my_id = me.id.unwrap().to_hex();

    let applied = ctx
        .referral_service
        .apply(&my_id, &first.referral_code.clone().unwrap())
        .await
        .expect("First application should succeed");
    assert!(applied.ok);
    assert_eq!(applied.coins, 20);

    let err = ctx
        .referral_service
        .apply(&my_id, &second.referral_code.clone().unwrap())
        .await
        .expect_err("Second application should be rejected");
    assert!(matches!(err, ServiceError::Conflict(_)));

    // The back-reference and balance are untouched by the failed attempt.
    let me = ctx
        .user_repo
        .find_by_id(&me.id.unwrap())
        .await
        .expect("Failed to refetch user")
        .expect("User not found");
    assert_eq!(me.referred_by, first.id);
    assert_eq!(me.coins, 20);
}

#[tokio::test]
async fn test_withdraw_requires_balance_and_records_payout() {
    let ctx = setup().await;

    let user = register_user(&ctx, "saver", None).await;
    let user_id = user.id.unwrap();
    let user_hex = user_id.to_hex();

    // A fresh account has nothing to withdraw.
    let err = ctx
        .referral_service
        .withdraw(&user_hex, 10, None, None)
        .await
        .expect_err("Withdrawal from a zero balance should fail");
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    ctx.user_repo
        .credit_coins(user_id, 100)
        .await
        .expect("Failed to credit coins");

    let res = ctx
        .referral_service
        .withdraw(&user_hex, 40, Some("upi".to_string()), None)
        .await
        .expect("Withdrawal within balance should succeed");
    assert!(res.ok);
    assert_eq!(res.coins, 60);
    assert_eq!(res.payout.amount, 40);
    assert_eq!(res.payout.status, PayoutStatus::Pending);

    let payouts = ctx
        .payout_repo
        .list_by_user(user_id)
        .await
        .expect("Failed to list payouts");
    assert_eq!(payouts.len(), 1);

    // The remaining balance still bounds further withdrawals.
    let err = ctx
        .referral_service
        .withdraw(&user_hex, 100, None, None)
        .await
        .expect_err("Withdrawal over the remaining balance should fail");
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let user = ctx
        .user_repo
        .find_by_id(&user_id)
        .await
        .expect("Failed to refetch user")
        .expect("User not found");
    assert_eq!(user.coins, 60);
}
