//! Configuration loading from disk and environment.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load, overlay, and validate configuration.
///
/// Order of precedence: environment variables override the config
/// file, which overrides built-in defaults. Secrets (SESSION_SECRET,
/// REDIS_URL, GENERATION_API_KEY) normally arrive via the environment
/// so they stay out of files on disk.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto a parsed configuration.
/// Empty values are ignored so an empty export does not mask the file.
pub fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Ok(flag) = std::env::var("APP_ENV") {
        if !flag.is_empty() {
            config.environment = Environment::from_flag(&flag);
        }
    }
    if let Ok(secret) = std::env::var("SESSION_SECRET") {
        if !secret.is_empty() {
            config.session.secret = Some(secret);
        }
    }
    if let Ok(url) = std::env::var("REDIS_URL") {
        if !url.is_empty() {
            config.rate_limit.redis_url = Some(url);
        }
    }
    if let Ok(key) = std::env::var("GENERATION_API_KEY") {
        if !key.is_empty() {
            config.upstream.api_key = Some(key);
        }
    }
    if let Ok(url) = std::env::var("GENERATION_API_URL") {
        if !url.is_empty() {
            config.upstream.base_url = url;
        }
    }
}
