//! Retry configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_cooldown_secs() -> u64 {
    15
}

fn default_asset_max_retries() -> u32 {
    3
}

fn default_asset_retry_delay_secs() -> u64 {
    5
}

/// Retry knobs for both policies.
///
/// Deserialized from the `[retry]` table of the configuration file.
///
/// # Examples
///
/// ```
/// use fabula_retry::RetrySettings;
/// use std::time::Duration;
///
/// let settings = RetrySettings::default();
/// assert_eq!(settings.cooldown(), Duration::from_secs(15));
/// assert!(settings.max_completion_attempts().is_none());
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RetrySettings {
    /// Seconds to wait after a failed completion call
    #[serde(default = "default_cooldown_secs")]
    cooldown_secs: u64,
    /// Upper bound on completion attempts; unbounded when absent
    #[serde(default)]
    max_completion_attempts: Option<u32>,
    /// Attempts allowed per image
    #[serde(default = "default_asset_max_retries")]
    asset_max_retries: u32,
    /// Seconds between image attempts
    #[serde(default = "default_asset_retry_delay_secs")]
    asset_retry_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            max_completion_attempts: None,
            asset_max_retries: default_asset_max_retries(),
            asset_retry_delay_secs: default_asset_retry_delay_secs(),
        }
    }
}

impl RetrySettings {
    /// Cooldown between completion attempts.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Delay between image attempts.
    pub fn asset_retry_delay(&self) -> Duration {
        Duration::from_secs(self.asset_retry_delay_secs)
    }

    /// Validate that the settings can drive both policies.
    pub fn validate(&self) -> Result<(), String> {
        if self.asset_max_retries == 0 {
            return Err("asset_max_retries must be at least 1".to_string());
        }
        if self.max_completion_attempts == Some(0) {
            return Err("max_completion_attempts must be at least 1 when set".to_string());
        }
        Ok(())
    }

    /// Override the completion cooldown.
    pub fn with_cooldown_secs(mut self, secs: u64) -> Self {
        self.cooldown_secs = secs;
        self
    }

    /// Bound the number of completion attempts.
    pub fn with_max_completion_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_completion_attempts = attempts;
        self
    }

    /// Override the image retry budget.
    pub fn with_asset_retries(mut self, max_retries: u32, delay_secs: u64) -> Self {
        self.asset_max_retries = max_retries;
        self.asset_retry_delay_secs = delay_secs;
        self
    }
}
