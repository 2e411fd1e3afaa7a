//! Configuration loading from disk and environment.
//!
//! Order of precedence: defaults, then an optional TOML file, then
//! environment overrides. A malformed override is fatal, never silently
//! ignored.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GateConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `rate_limit.max_requests`.
pub const ENV_RATE_LIMIT_MAX: &str = "RATE_LIMIT_MAX";
/// Environment variable overriding `rate_limit.window_ms` (milliseconds).
pub const ENV_RATE_LIMIT_WINDOW: &str = "RATE_LIMIT_WINDOW";
/// Environment variable overriding `classifier.limited_prefixes` (comma-separated).
pub const ENV_RATE_LIMIT_PATHS: &str = "RATE_LIMIT_PATHS";
/// Environment variable selecting the mode; `production` enables HSTS.
pub const ENV_APP_ENV: &str = "APP_ENV";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override and validate configuration.
///
/// `path = None` starts from built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<GateConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GateConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment-style overrides from the given lookup function.
///
/// The lookup indirection keeps this testable without mutating process
/// environment (which is racy across parallel tests).
fn apply_env_overrides(
    config: &mut GateConfig,
    env: impl Fn(&'static str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(value) = env(ENV_RATE_LIMIT_MAX) {
        config.rate_limit.max_requests =
            value.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
                var: ENV_RATE_LIMIT_MAX,
                value,
                reason: e.to_string(),
            })?;
    }

    if let Some(value) = env(ENV_RATE_LIMIT_WINDOW) {
        config.rate_limit.window_ms =
            value.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
                var: ENV_RATE_LIMIT_WINDOW,
                value,
                reason: e.to_string(),
            })?;
    }

    if let Some(value) = env(ENV_RATE_LIMIT_PATHS) {
        config.classifier.limited_prefixes = value
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
    }

    if let Some(value) = env(ENV_APP_ENV) {
        config.security.production = value.eq_ignore_ascii_case("production");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_map(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn defaults_match_documented_policy() {
        let config = GateConfig::default();
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.rate_limit.window_ms, 900_000);
        assert!(!config.security.production);
        assert_eq!(config.classifier.limited_prefixes, vec!["/api", "/auth"]);
    }

    #[test]
    fn env_overrides_take_effect() {
        let env = env_map(&[
            (ENV_RATE_LIMIT_MAX, "5"),
            (ENV_RATE_LIMIT_WINDOW, "60000"),
            (ENV_APP_ENV, "production"),
            (ENV_RATE_LIMIT_PATHS, "/graphql, /api"),
        ]);
        let mut config = GateConfig::default();
        apply_env_overrides(&mut config, |var| env.get(var).cloned()).unwrap();

        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_ms, 60_000);
        assert!(config.security.production);
        assert_eq!(config.classifier.limited_prefixes, vec!["/graphql", "/api"]);
    }

    #[test]
    fn malformed_env_value_is_fatal() {
        let env = env_map(&[(ENV_RATE_LIMIT_MAX, "lots")]);
        let mut config = GateConfig::default();
        let err = apply_env_overrides(&mut config, |var| env.get(var).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var, .. } if var == ENV_RATE_LIMIT_MAX));
    }

    #[test]
    fn non_production_env_values_disable_hsts() {
        let env = env_map(&[(ENV_APP_ENV, "staging")]);
        let mut config = GateConfig::default();
        config.security.production = true;
        apply_env_overrides(&mut config, |var| env.get(var).cloned()).unwrap();
        assert!(!config.security.production);
    }

    #[test]
    fn toml_round_trip() {
        let toml = r#"
            [rate_limit]
            max_requests = 10
            window_ms = 1000

            [security]
            production = true
        "#;
        let config: GateConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.rate_limit.window_ms, 1000);
        assert!(config.security.production);
        // Unspecified sections keep their defaults.
        assert_eq!(config.classifier.limited_prefixes, vec!["/api", "/auth"]);
    }
}
