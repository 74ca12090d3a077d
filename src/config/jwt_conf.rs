use std::env;

use tracing::{error, info, warn};

use crate::config::ConfigError;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub jwt_secret: String,
    /// Token expiration time in minutes
    pub token_expiration_minutes: i64,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing JWT tokens (required)
    /// - JWT_EXPIRES_IN: Token expiration in minutes (defaults to 10080 = 7 days)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            error!("JWT_SECRET environment variable not found");
            ConfigError::EnvVarNotFound("JWT_SECRET".to_string())
        })?;

        let token_expiration_minutes = env::var("JWT_EXPIRES_IN")
            .unwrap_or_else(|_| {
                warn!("JWT_EXPIRES_IN not set, using default: 10080 minutes (7 days)");
                "10080".to_string()
            })
            .parse::<i64>()
            .map_err(|_| {
                error!("Invalid JWT_EXPIRES_IN value");
                ConfigError::InvalidValue("Invalid JWT_EXPIRES_IN value".to_string())
            })?;

        let config = JwtConfig {
            jwt_secret,
            token_expiration_minutes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            error!("JWT secret is too short ({} chars)", self.jwt_secret.len());
            return Err(ConfigError::ValidationError(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }
        if self.token_expiration_minutes <= 0 {
            return Err(ConfigError::ValidationError(
                "JWT_EXPIRES_IN must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Create JwtConfig for testing
    pub fn from_test_env() -> Self {
        JwtConfig {
            jwt_secret: "test-secret-key-that-is-long-enough-for-hs256".to_string(),
            token_expiration_minutes: 60,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "dev-secret-change-me-in-production-envs!".to_string(),
            token_expiration_minutes: 10080,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(JwtConfig::default().validate().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = JwtConfig::from_test_env();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_expiry_rejected() {
        let mut config = JwtConfig::from_test_env();
        config.token_expiration_minutes = 0;
        assert!(config.validate().is_err());
    }
}
