use crate::{
    config::RetroConfig,
    error::{Result, RetroError},
};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global fmt subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|err| RetroError::ConfigError(format!("Invalid log filter: {}", err)))?,
    };

    if fmt().with_env_filter(filter).with_target(true).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

/// [`init_tracing`] with the configured `log_filter` as fallback
pub fn init_from_config(config: &RetroConfig) -> Result<()> {
    init_tracing(&config.log_filter)
}
