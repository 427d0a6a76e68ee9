//! Logging bootstrap.
//!
//! Installs a `tracing` subscriber driven by `RUST_LOG`, falling back to the
//! configured filter directive.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the configured directive cannot be parsed or a global
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_directive() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "question_flow=[".to_string(),
            json: false,
        };
        assert!(init_tracing(&config).is_err());
    }
}
