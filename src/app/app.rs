use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::admin_user_conf::AdminUserConfig;
use crate::config::app_conf::AppConfig;
use crate::config::{JwtConfig, MongoConfig, RewardsConfig, UploadConfig};
use crate::dto::auth_dto::RegisterRequest;
use crate::middlewares::auth_middleware::AuthState;
use crate::model::user::Role;
use crate::repository::coupon_repo::MongoCouponRepository;
use crate::repository::order_repo::MongoOrderRepository;
use crate::repository::payout_repo::MongoPayoutRepository;
use crate::repository::product_repo::MongoProductRepository;
use crate::repository::referral_repo::MongoReferralRepository;
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::router::auth_router::auth_router;
use crate::router::coupon_router::coupon_router;
use crate::router::delivery_router::delivery_router;
use crate::router::order_router::order_router;
use crate::router::product_router::product_router;
use crate::router::referral_router::referral_router;
use crate::router::upload_router::upload_router;
use crate::router::user_router::user_router;
use crate::service::coupon_service::CouponServiceImpl;
use crate::service::order_service::OrderServiceImpl;
use crate::service::product_service::ProductServiceImpl;
use crate::service::referral_service::ReferralServiceImpl;
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::jwt::JwtTokenUtilsImpl;

pub struct App {
    config: AppConfig,
    router: Router,
    pub user_service: Arc<UserServiceImpl>,
}

impl App {
    pub async fn new() -> Self {
        let config = AppConfig::from_env();
        let jwt_config = JwtConfig::from_env().expect("JWT config error");
        let mongo_config = MongoConfig::from_env().expect("Mongo config error");
        let rewards = RewardsConfig::from_env().expect("Rewards config error");
        let upload_config =
            Arc::new(UploadConfig::from_env().expect("Upload config error"));

        // Connect once at startup; a bad URI fails the process here
        // instead of surfacing per request.
        let db = mongo_config
            .connect()
            .await
            .expect("Failed to connect to MongoDB");
        info!("Connected to MongoDB database '{}'", mongo_config.database);

        let user_repo = Arc::new(MongoUserRepository::new(&db));
        if let Err(e) = user_repo.ensure_indexes().await {
            warn!("Failed to create user indexes: {e}");
        }
        let product_repo = Arc::new(MongoProductRepository::new(&db));
        let order_repo = Arc::new(MongoOrderRepository::new(&db));
        let coupon_repo = Arc::new(MongoCouponRepository::new(&db));
        let referral_repo = Arc::new(MongoReferralRepository::new(&db));
        let payout_repo = Arc::new(MongoPayoutRepository::new(&db));

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let user_service = Arc::new(UserServiceImpl::new(
            user_repo.clone(),
            referral_repo.clone(),
            jwt_utils.clone(),
            rewards.clone(),
        ));
        let product_service = Arc::new(ProductServiceImpl::new(product_repo.clone()));
        let order_service = Arc::new(OrderServiceImpl::new(
            order_repo,
            product_repo,
            coupon_repo.clone(),
        ));
        let coupon_service = Arc::new(CouponServiceImpl::new(coupon_repo));
        let referral_service = Arc::new(ReferralServiceImpl::new(
            user_repo,
            referral_repo,
            payout_repo,
            rewards,
        ));

        let any_auth = AuthState::any_role(jwt_utils.clone());
        let admin_auth = AuthState::roles(jwt_utils.clone(), &[Role::Admin]);
        let seller_auth = AuthState::roles(jwt_utils.clone(), &[Role::Admin, Role::Farmer]);
        let staff_auth = AuthState::roles(jwt_utils.clone(), &[Role::Admin, Role::Delivery]);
        let delivery_auth = AuthState::roles(jwt_utils, &[Role::Delivery]);

        let router = Router::new()
            .merge(auth_router(user_service.clone(), any_auth.clone()))
            .merge(user_router(user_service.clone(), admin_auth.clone()))
            .merge(product_router(product_service, seller_auth, admin_auth.clone()))
            .merge(coupon_router(coupon_service, admin_auth.clone()))
            .merge(order_router(
                order_service.clone(),
                any_auth.clone(),
                staff_auth,
                admin_auth.clone(),
            ))
            .merge(delivery_router(order_service, delivery_auth))
            .merge(referral_router(referral_service, any_auth.clone(), admin_auth))
            .merge(upload_router(upload_config.clone(), any_auth))
            .nest_service(
                upload_config.public_prefix.as_str(),
                ServeDir::new(&upload_config.upload_dir),
            )
            .route("/health", get(|| async { "OK" }))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let app = App {
            config,
            router,
            user_service,
        };
        app.create_first_admin_user().await;
        app
    }

    pub async fn start(self) {
        let addr = SocketAddr::new(
            self.config.host.parse().expect("Invalid host"),
            self.config.port,
        );
        info!("Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind address");
        axum::serve(listener, self.router)
            .await
            .expect("Failed to start server");
    }

    async fn create_first_admin_user(&self) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };

        match self
            .user_service
            .user_repo
            .find_by_email(&admin_conf.email)
            .await
        {
            Ok(Some(_)) => {
                info!("Admin user already exists, skipping creation.");
                return;
            }
            Ok(None) => {}
            Err(e) => {
                error!("Failed to check for existing admin user: {e}");
                return;
            }
        }

        let req = RegisterRequest {
            name: admin_conf.name.clone(),
            email: admin_conf.email.clone(),
            password: admin_conf.password.clone(),
            role: Some(Role::Admin),
            referral_code: None,
        };
        match self.user_service.register(req).await {
            Ok(_) => info!("First admin user created."),
            Err(e) => error!("Failed to create admin user: {e}"),
        }
    }
}
