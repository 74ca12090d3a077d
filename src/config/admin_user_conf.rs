use std::env;

use crate::config::ConfigError;

/// Bootstrap admin account created at startup when configured.
pub struct AdminUserConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let name = env::var("ADMIN_NAME")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_NAME".to_string()))?;
        let email = env::var("ADMIN_EMAIL")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_EMAIL".to_string()))?;
        let password = env::var("ADMIN_PASSWORD")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PASSWORD".to_string()))?;
        Ok(AdminUserConfig {
            name,
            email,
            password,
        })
    }
}
