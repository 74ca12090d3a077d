pub mod admin_user_conf;
pub mod app_conf;
pub mod jwt_conf;
pub mod mongo_conf;
pub mod rewards_conf;
pub mod upload_conf;

pub use jwt_conf::JwtConfig;
pub use mongo_conf::MongoConfig;
pub use rewards_conf::RewardsConfig;
pub use upload_conf::UploadConfig;

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
