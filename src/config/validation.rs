//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every route compiles (endpoint, headers, upgrade, status)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::routing::{spec_from_config, Route, RouteError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("routes[{index}]: {source}")]
    Route {
        index: usize,
        #[source]
        source: RouteError,
    },

    #[error("aliases[{index}]: `{pattern}` must start with `/`")]
    InvalidAlias { index: usize, pattern: String },

    #[error("response_headers[{index}]: `{pattern}` must start with `/` or be `*`")]
    InvalidHeaderPattern { index: usize, pattern: String },
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (index, route) in config.routes.iter().enumerate() {
        if let Err(source) = spec_from_config(route).and_then(Route::build) {
            errors.push(ValidationError::Route { index, source });
        }
    }

    for (index, alias) in config.aliases.iter().enumerate() {
        for pattern in [&alias.from, &alias.to] {
            if !pattern.starts_with('/') {
                errors.push(ValidationError::InvalidAlias {
                    index,
                    pattern: pattern.clone(),
                });
            }
        }
    }

    for (index, entry) in config.response_headers.iter().enumerate() {
        if entry.pattern != "*" && !entry.pattern.starts_with('/') {
            errors.push(ValidationError::InvalidHeaderPattern {
                index,
                pattern: entry.pattern.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
