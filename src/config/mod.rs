//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `QUESTION_FLOW` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use question_flow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Pending questions expire after {:?}", config.cache.pending_ttl());
//! ```

mod cache;
mod conversation;
mod error;
mod logging;
mod redis;

pub use cache::{CacheBackend, CacheConfig};
pub use conversation::ConversationConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use redis::RedisConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Cache backend and pending question expiry
    #[serde(default)]
    pub cache: CacheConfig,

    /// Redis connection (required when the cache backend is redis)
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Affirmative words and handover policy
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `QUESTION_FLOW` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Splits `conversation.affirmative_words` on commas
    /// 5. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `QUESTION_FLOW__CACHE__BACKEND=redis` -> `cache.backend = redis`
    /// - `QUESTION_FLOW__REDIS__URL=...` -> `redis.url = ...`
    /// - `QUESTION_FLOW__CONVERSATION__AFFIRMATIVE_WORDS=ja,jawohl` -> list
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("QUESTION_FLOW")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("conversation.affirmative_words"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid, or if
    /// the redis backend is selected without redis settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cache.validate()?;
        match (&self.cache.backend, &self.redis) {
            (CacheBackend::Redis, None) => return Err(ValidationError::MissingRequired("REDIS_URL")),
            (_, Some(redis)) => redis.validate()?,
            (CacheBackend::Memory, None) => {}
        }
        self.conversation.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Check if pending state is durable across processes
    pub fn is_durable(&self) -> bool {
        self.cache.backend == CacheBackend::Redis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 7] = [
        "QUESTION_FLOW__CACHE__BACKEND",
        "QUESTION_FLOW__CACHE__PENDING_TTL_MINUTES",
        "QUESTION_FLOW__REDIS__URL",
        "QUESTION_FLOW__REDIS__PASSWORD",
        "QUESTION_FLOW__REDIS__NAMESPACE",
        "QUESTION_FLOW__CONVERSATION__AFFIRMATIVE_WORDS",
        "QUESTION_FLOW__CONVERSATION__HANDOVER_TARGET",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_from_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert!(config.redis.is_none());
        assert_eq!(config.conversation.handover_threshold, 2);
        assert!(config.validate().is_ok());
        assert!(!config.is_durable());
    }

    #[test]
    fn test_load_redis_backend() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("QUESTION_FLOW__CACHE__BACKEND", "redis");
        env::set_var("QUESTION_FLOW__CACHE__PENDING_TTL_MINUTES", "15");
        env::set_var("QUESTION_FLOW__REDIS__URL", "redis://localhost:6379");
        env::set_var("QUESTION_FLOW__REDIS__PASSWORD", "s3cret");
        env::set_var("QUESTION_FLOW__REDIS__NAMESPACE", "bots");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_durable());
        assert_eq!(config.cache.pending_ttl_minutes, 15);
        let redis = config.redis.as_ref().unwrap();
        assert_eq!(redis.url, "redis://localhost:6379");
        assert_eq!(redis.namespace, "bots");
        assert_eq!(redis.password.as_ref().unwrap().expose_secret(), "s3cret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_affirmative_words_from_list() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("QUESTION_FLOW__CONVERSATION__AFFIRMATIVE_WORDS", "ja,jawohl,klar");
        env::set_var("QUESTION_FLOW__CONVERSATION__HANDOVER_TARGET", "support");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(
            config.conversation.affirmative_words,
            vec!["ja", "jawohl", "klar"]
        );
        assert_eq!(config.conversation.handover_target.as_deref(), Some("support"));
    }

    #[test]
    fn test_redis_backend_requires_redis_settings() {
        let config = AppConfig {
            cache: CacheConfig {
                backend: CacheBackend::Redis,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("REDIS_URL"))
        ));
    }
}
