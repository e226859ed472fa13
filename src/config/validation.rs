//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Check fallback rewrites can always be applied to the paths they claim
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::uri::Authority;

use thiserror::Error;

use crate::config::schema::{FallbackRouteConfig, GatewayConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid socket address for {field}: {value}")]
    InvalidAddress { field: String, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("invalid upstream address for {name}: {value} (expected host:port)")]
    InvalidUpstream { name: String, value: String },

    #[error("upstream identifier must not be empty")]
    EmptyUpstreamName,

    #[error("fallback route #{index}: {reason}")]
    FallbackRoute { index: usize, reason: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero { field: "listener.max_connections" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_body_bytes" });
    }

    for (name, address) in &config.upstreams {
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyUpstreamName);
        }
        if !is_upstream_authority(address) {
            errors.push(ValidationError::InvalidUpstream {
                name: name.clone(),
                value: address.clone(),
            });
        }
    }

    for (index, route) in config.fallback_routes.iter().enumerate() {
        for reason in fallback_route_problems(route) {
            errors.push(ValidationError::FallbackRoute { index, reason });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

/// Upstreams are dialed as `host:port`; the host may be a name.
fn is_upstream_authority(value: &str) -> bool {
    Authority::from_str(value).is_ok_and(|authority| authority.port_u16().is_some())
}

fn fallback_route_problems(route: &FallbackRouteConfig) -> Vec<String> {
    let mut problems = Vec::new();
    if route.name.trim().is_empty() {
        problems.push("name must not be empty".to_string());
    }
    if route.backend.trim().is_empty() {
        problems.push("backend must not be empty".to_string());
    }
    if !route.path_prefix.starts_with('/') {
        problems.push(format!("path_prefix {:?} must start with '/'", route.path_prefix));
    }
    match (&route.rewrite_from, &route.rewrite_to) {
        (None, None) => {}
        (Some(from), Some(to)) => {
            if !from.starts_with('/') || !to.starts_with('/') {
                problems.push("rewrite_from and rewrite_to must start with '/'".to_string());
            }
            if !route.path_prefix.starts_with(from.as_str()) {
                problems.push(format!(
                    "rewrite_from {from:?} is not a prefix of path_prefix {:?}",
                    route.path_prefix
                ));
            }
        }
        _ => problems.push("rewrite_from and rewrite_to must be set together".to_string()),
    }
    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(prefix: &str, from: Option<&str>, to: Option<&str>) -> FallbackRouteConfig {
        FallbackRouteConfig {
            name: "ext".into(),
            path_prefix: prefix.into(),
            backend: "ext".into(),
            rewrite_from: from.map(Into::into),
            rewrite_to: to.map(Into::into),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.limits.max_body_bytes = 0;
        config.upstreams.insert("topo".into(), "localhost".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Zero { field: "limits.max_body_bytes" }));
    }

    #[test]
    fn test_upstream_accepts_host_names() {
        let mut config = GatewayConfig::default();
        config.upstreams.insert("topo".into(), "topo-svc:60001".into());
        config.upstreams.insert("host".into(), "10.0.0.7:60002".into());
        assert_eq!(validate_config(&config), Ok(()));

        config.upstreams.insert("proc".into(), "proc-svc".into());
        config.upstreams.insert("event".into(), "not an address".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ValidationError::InvalidUpstream { .. })));
    }

    #[test]
    fn test_fallback_route_rules() {
        let mut config = GatewayConfig::default();
        config.fallback_routes = vec![
            route("/api/v3/ext/", Some("/api/v3/ext"), Some("/ext/v3")),
            route("api/v3/x/", None, None),
            route("/api/v3/y/", Some("/api/v3/z"), Some("/z/v3")),
            route("/api/v3/w/", Some("/api/v3"), None),
        ];

        let errors = validate_config(&config).unwrap_err();
        let indexes: Vec<usize> = errors
            .iter()
            .map(|e| match e {
                ValidationError::FallbackRoute { index, .. } => *index,
                other => panic!("unexpected error {other}"),
            })
            .collect();
        assert_eq!(indexes, vec![1, 2, 3]);
    }
}
