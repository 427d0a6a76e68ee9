//! Cache backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Which cache backs pending question state
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: CacheBackend,

    /// Minutes a pending question survives without a reply (0 = no expiry)
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_minutes: u64,

    /// Key prefix for pending question entries
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl CacheConfig {
    /// Pending question expiry, if any
    pub fn pending_ttl(&self) -> Option<Duration> {
        match self.pending_ttl_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes * 60)),
        }
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key_prefix.trim().is_empty() {
            return Err(ValidationError::MissingRequired("CACHE_KEY_PREFIX"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            pending_ttl_minutes: default_pending_ttl(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_pending_ttl() -> u64 {
    30
}

fn default_key_prefix() -> String {
    "pending".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.pending_ttl(), Some(Duration::from_secs(30 * 60)));
        assert_eq!(config.key_prefix, "pending");
    }

    #[test]
    fn test_zero_ttl_disables_expiry() {
        let config = CacheConfig {
            pending_ttl_minutes: 0,
            ..Default::default()
        };
        assert_eq!(config.pending_ttl(), None);
    }

    #[test]
    fn test_blank_prefix_is_invalid() {
        let config = CacheConfig {
            key_prefix: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
