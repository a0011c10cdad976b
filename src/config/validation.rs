//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (connection and frame limits)
//! - Check that addresses parse and do not collide
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ServerConfig, FRAME_LIMIT_CEILING};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("display.max_connections must be greater than 0")]
    ZeroConnections,

    #[error("display.max_frame_bytes must be between 1 and {max}, got {0}", max = FRAME_LIMIT_CEILING)]
    FrameLimitOutOfRange(usize),

    #[error("display.idle_timeout_ms must be greater than 0")]
    ZeroIdleTimeout,

    #[error("instance.process_marker must not be empty")]
    EmptyProcessMarker,

    #[error("display and web servers cannot share address {0}")]
    AddressConflict(SocketAddr),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let display = parse_addr("display.bind_address", &config.display.bind_address, &mut errors);
    let web = parse_addr("web.bind_address", &config.web.bind_address, &mut errors);

    if let (Some(display), Some(web)) = (display, web) {
        // Port 0 asks the OS for a free port, so it never collides.
        if display == web && display.port() != 0 {
            errors.push(ValidationError::AddressConflict(display));
        }
    }

    if config.display.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections);
    }

    let frame_limit = config.display.max_frame_bytes;
    if frame_limit == 0 || frame_limit > FRAME_LIMIT_CEILING {
        errors.push(ValidationError::FrameLimitOutOfRange(frame_limit));
    }

    if config.display.idle_timeout_ms == 0 {
        errors.push(ValidationError::ZeroIdleTimeout);
    }

    if config.instance.process_marker.trim().is_empty() {
        errors.push(ValidationError::EmptyProcessMarker);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn parse_addr(
    field: &'static str,
    value: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<SocketAddr> {
    match value.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.to_string(),
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServerConfig::default();
        config.display.bind_address = "not-an-address".into();
        config.display.max_connections = 0;
        config.display.max_frame_bytes = 0;
        config.display.idle_timeout_ms = 0;
        config.instance.process_marker = "  ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroIdleTimeout));
        assert!(errors.contains(&ValidationError::ZeroConnections));
        assert!(errors.contains(&ValidationError::EmptyProcessMarker));
    }

    #[test]
    fn rejects_shared_address() {
        let mut config = ServerConfig::default();
        config.web.bind_address = config.display.bind_address.clone();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::AddressConflict(_)));
    }

    #[test]
    fn ephemeral_ports_do_not_conflict() {
        let mut config = ServerConfig::default();
        config.display.bind_address = "127.0.0.1:0".into();
        config.web.bind_address = "127.0.0.1:0".into();
        assert!(validate_config(&config).is_ok());
    }
}
