use std::env;

use tracing::warn;

use crate::config::ConfigError;

/// Referral reward amounts, in coins.
#[derive(Debug, Clone, Copy)]
pub struct RewardsConfig {
    /// Coins credited to the owner of an applied referral code.
    pub referrer_reward: i64,
    /// Coins credited to the user who applied the code.
    pub referred_reward: i64,
}

impl RewardsConfig {
    /// Load from REFERRER_REWARD / REFERRED_REWARD (defaults 50 / 20).
    pub fn from_env() -> Result<Self, ConfigError> {
        let referrer_reward = env::var("REFERRER_REWARD")
            .unwrap_or_else(|_| "50".to_string())
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidValue("Invalid REFERRER_REWARD value".to_string()))?;
        let referred_reward = env::var("REFERRED_REWARD")
            .unwrap_or_else(|_| "20".to_string())
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidValue("Invalid REFERRED_REWARD value".to_string()))?;

        let config = RewardsConfig {
            referrer_reward,
            referred_reward,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.referrer_reward < 0 || self.referred_reward < 0 {
            warn!("Negative referral reward configured");
            return Err(ConfigError::ValidationError(
                "Referral rewards cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        RewardsConfig {
            referrer_reward: 50,
            referred_reward: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rewards() {
        let config = RewardsConfig::default();
        assert_eq!(config.referrer_reward, 50);
        assert_eq!(config.referred_reward, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_negative_reward_rejected() {
        let config = RewardsConfig {
            referrer_reward: -1,
            referred_reward: 20,
        };
        assert!(config.validate().is_err());
    }
}
