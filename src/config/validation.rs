//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Enforce production requirements (real secret, shared rate-limit store)
//! - Validate value ranges (window > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig -> Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::session::token::MIN_SECRET_LEN;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("session.secret must be set to at least {MIN_SECRET_LEN} characters in production (set SESSION_SECRET)")]
    SessionSecretRequired,

    #[error("rate_limit.redis_url must be configured in production (set REDIS_URL); the in-process store cannot coordinate across instances")]
    SharedStoreRequired,

    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,

    #[error("rate_limit.max_requests must be at least 1")]
    ZeroMaxRequests,

    #[error("rate_limit.window_secs must be at least 1")]
    ZeroWindow,

    #[error("limits.max_body_bytes must be at least 1")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.environment.is_production() {
        let secret_ok = config
            .session
            .secret
            .as_deref()
            .is_some_and(|s| s.len() >= MIN_SECRET_LEN);
        if !secret_ok {
            errors.push(ValidationError::SessionSecretRequired);
        }

        if config.rate_limit.redis_url.is_none() {
            errors.push(ValidationError::SharedStoreRequired);
        }
    }

    if config.listener.bind_address.is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroMaxRequests);
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;

    #[test]
    fn test_development_defaults_pass() {
        let config = GatewayConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_production_requires_secret_and_store() {
        let mut config = GatewayConfig::default();
        config.environment = Environment::Production;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::SessionSecretRequired));
        assert!(errors.contains(&ValidationError::SharedStoreRequired));
    }

    #[test]
    fn test_production_short_secret_rejected() {
        let mut config = GatewayConfig::default();
        config.environment = Environment::Production;
        config.session.secret = Some("too-short".to_string());
        config.rate_limit.redis_url = Some("redis://127.0.0.1:6379".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::SessionSecretRequired]);
    }

    #[test]
    fn test_production_fully_configured_passes() {
        let mut config = GatewayConfig::default();
        config.environment = Environment::Production;
        config.session.secret = Some("a-real-secret-of-adequate-length".to_string());
        config.rate_limit.redis_url = Some("redis://127.0.0.1:6379".to_string());

        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_ranges_rejected() {
        let mut config = GatewayConfig::default();
        config.rate_limit.max_requests = 0;
        config.rate_limit.window_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroMaxRequests));
        assert!(errors.contains(&ValidationError::ZeroWindow));
    }
}
