//! Semantic configuration checks (syntactic ones live in serde).

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A configuration value that parsed but makes no sense.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    #[error("upstream.attempt_timeout_secs must be non-zero")]
    ZeroTimeout,

    #[error("retries.base_delay_ms must be non-zero")]
    ZeroBaseDelay,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), ValidationError> {
    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        return Err(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.upstream.attempt_timeout_secs == 0 {
        return Err(ValidationError::ZeroTimeout);
    }
    if config.retries.base_delay_ms == 0 {
        return Err(ValidationError::ZeroBaseDelay);
    }
    Ok(())
}
