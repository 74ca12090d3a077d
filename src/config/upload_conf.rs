use std::env;
use std::path::PathBuf;

use crate::config::ConfigError;

/// Local image upload storage configuration.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploaded files are written to and served from.
    pub upload_dir: PathBuf,
    /// URL prefix files are served under.
    pub public_prefix: String,
}

impl UploadConfig {
    /// Load from UPLOAD_DIR (defaults to "public/uploads").
    pub fn from_env() -> Result<Self, ConfigError> {
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "public/uploads".to_string());
        let config = UploadConfig {
            upload_dir: PathBuf::from(upload_dir),
            public_prefix: "/uploads".to_string(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "UPLOAD_DIR cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            upload_dir: PathBuf::from("public/uploads"),
            public_prefix: "/uploads".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_upload_config() {
        let config = UploadConfig::default();
        assert_eq!(config.upload_dir, PathBuf::from("public/uploads"));
        assert_eq!(config.public_prefix, "/uploads");
        assert!(config.validate().is_ok());
    }
}
