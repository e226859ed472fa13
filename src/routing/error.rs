//! Classification error taxonomy.

use thiserror::Error;

use crate::routing::backend::BackendType;

/// Errors that end classification of a single request.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The request body could not be read from the transport.
    #[error("read request body failed: {0}")]
    BodyRead(String),

    /// A legacy route matched but its body is empty, not JSON, or lacks a
    /// required field.
    #[error("request body cannot be empty")]
    MalformedRequest {
        route: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// No legacy route, domain rule or fallback matcher claimed the path.
    #[error("unknown requested with backend process: {path}")]
    UnrecognizedRoute { path: String },
}

impl RouteError {
    /// Backend reported alongside the error; always `Unknown`.
    pub fn backend(&self) -> BackendType {
        BackendType::Unknown
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::BodyRead(_) => "body_read",
            RouteError::MalformedRequest { .. } => "malformed_request",
            RouteError::UnrecognizedRoute { .. } => "unrecognized_route",
        }
    }
}

/// Convenience alias for classification results.
pub type RouteResult<T> = Result<T, RouteError>;
