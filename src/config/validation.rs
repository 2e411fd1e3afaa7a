//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic ones. An invalid policy must
//! fail fast at startup rather than silently default: a wrong max or window
//! weakens abuse protection without anyone noticing. All errors are
//! collected and returned together, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GateConfig;

/// A single semantic configuration error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rate_limit.max_requests must be greater than zero")]
    NonPositiveMaxRequests,

    #[error("rate_limit.window_ms must be greater than zero")]
    NonPositiveWindow,

    #[error("rate_limit.sweep_interval_secs must be greater than zero")]
    NonPositiveSweepInterval,

    #[error("classifier.limited_prefixes entries must start with '/': {0:?}")]
    InvalidPrefix(String),

    #[error("listener.bind_address is not a valid socket address: {0:?}")]
    InvalidBindAddress(String),
}

/// Validate a configuration, returning every violation found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::NonPositiveMaxRequests);
    }
    if config.rate_limit.window_ms == 0 {
        errors.push(ValidationError::NonPositiveWindow);
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::NonPositiveSweepInterval);
    }

    for prefix in &config.classifier.limited_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix(prefix.clone()));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
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

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GateConfig::default()).is_ok());
    }

    #[test]
    fn zero_policy_values_are_fatal() {
        let mut config = GateConfig::default();
        config.rate_limit.max_requests = 0;
        config.rate_limit.window_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::NonPositiveMaxRequests));
        assert!(errors.contains(&ValidationError::NonPositiveWindow));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = GateConfig::default();
        config.rate_limit.max_requests = 0;
        config.listener.bind_address = "not-an-address".to_string();
        config.classifier.limited_prefixes = vec!["api".to_string()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
