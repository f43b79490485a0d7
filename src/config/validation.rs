//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Refuse an admin API guarded by the placeholder key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GateConfig, PLACEHOLDER_ADMIN_KEY};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    EmptyPath(&'static str),

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroTimeout,

    #[error("observability.log_retention must be greater than 0 when log_file is set")]
    ZeroLogRetention,

    #[error("admin.api_key must be changed from the placeholder when admin is enabled")]
    PlaceholderAdminKey,

    #[error("admin.api_key must not be empty when admin is enabled")]
    EmptyAdminKey,

    #[error("admin and listener cannot share bind address {0}")]
    SharedBindAddress(String),
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address("listener.bind_address", &config.listener.bind_address, &mut errors);

    if config.sources.keys_path.trim().is_empty() {
        errors.push(ValidationError::EmptyPath("sources.keys_path"));
    }
    if config.sources.ip_path.trim().is_empty() {
        errors.push(ValidationError::EmptyPath("sources.ip_path"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if let Some(log_file) = &config.observability.log_file {
        if log_file.trim().is_empty() {
            errors.push(ValidationError::EmptyPath("observability.log_file"));
        }
        if config.observability.log_retention == 0 {
            errors.push(ValidationError::ZeroLogRetention);
        }
    }

    if config.observability.metrics_enabled {
        check_address("observability.metrics_address", &config.observability.metrics_address, &mut errors);
    }

    if config.admin.enabled {
        check_address("admin.bind_address", &config.admin.bind_address, &mut errors);

        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::EmptyAdminKey);
        } else if config.admin.api_key == PLACEHOLDER_ADMIN_KEY {
            errors.push(ValidationError::PlaceholderAdminKey);
        }

        if config.admin.bind_address == config.listener.bind_address {
            errors.push(ValidationError::SharedBindAddress(config.admin.bind_address.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
