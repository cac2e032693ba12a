//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `listener.port`.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {name} value {value:?}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, then apply environment
/// overrides. Validation is left to the caller so CLI overrides can land
/// first.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

/// Apply overrides read through `lookup` (the process environment in
/// production).
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(PORT_ENV) {
        config.listener.port = value.trim().parse().map_err(|_| ConfigError::Env {
            name: PORT_ENV,
            value,
        })?;
    }
    Ok(())
}

/// Run semantic validation, wrapping failures as a `ConfigError`.
pub fn finalize(config: AppConfig) -> Result<AppConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_env_overrides_default() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |name| {
            (name == PORT_ENV).then(|| "4100".to_string())
        })
        .unwrap();
        assert_eq!(config.listener.port, 4100);
    }

    #[test]
    fn bad_port_env_is_rejected() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, |_| Some("http".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: PORT_ENV, .. }));
    }

    #[test]
    fn validation_errors_are_joined() {
        let mut config = AppConfig::default();
        config.timeouts.request_secs = 0;
        config.http.max_body_size = 0;
        let err = finalize(config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.request_secs must be greater than 0, \
             http.max_body_size must be greater than 0"
        );
    }
}
