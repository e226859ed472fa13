//! Request classification.
//!
//! A single pass per request:
//!
//! ```text
//! legacy translation
//!     → Cache → Topology → Host → Process → Event
//!     → DataCollect → Operation → Task → Admin → Cloud
//!     → fallback matcher
//!     → UnrecognizedRoute
//! ```
//!
//! The first domain whose table fires rewrites the request and ends the pass.

use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::Request;

use crate::routing::backend::Target;
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::fallback::FallbackMatcher;
use crate::routing::legacy::LegacyTranslator;
use crate::routing::request::RoutableRequest;
use crate::routing::rule::DomainRuleTable;
use crate::routing::tables::domain_tables;

/// Outcome of a successful classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Backend that owns the request.
    pub target: Target,
    /// The request with its path and URI in the backend's canonical form.
    pub request: RoutableRequest,
    /// Whether a legacy endpoint was translated on the way.
    pub legacy: bool,
}

/// Decides which backend owns a request and rewrites it for that backend.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Classifier {
    legacy: LegacyTranslator,
    tables: &'static [DomainRuleTable],
    fallback: Option<Arc<dyn FallbackMatcher>>,
}

impl Classifier {
    /// Classifier with the built-in tables and no fallback.
    pub fn new() -> Self {
        Self {
            legacy: LegacyTranslator::new(),
            tables: domain_tables(),
            fallback: None,
        }
    }

    /// Classifier that consults `fallback` after every built-in domain misses.
    pub fn with_fallback(fallback: Arc<dyn FallbackMatcher>) -> Self {
        Self {
            fallback: Some(fallback),
            ..Self::new()
        }
    }

    pub fn tables(&self) -> &[DomainRuleTable] {
        self.tables
    }

    /// Classify a buffered request.
    pub fn classify(&self, mut request: RoutableRequest) -> RouteResult<Classification> {
        let legacy = self.legacy.translate(&mut request)?;

        for table in self.tables {
            if table.try_rewrite(&mut request) {
                tracing::debug!(
                    backend = %table.backend(),
                    rewritten = %request.uri(),
                    legacy,
                    "Classified request"
                );
                return Ok(Classification {
                    target: Target::Backend(table.backend()),
                    request,
                    legacy,
                });
            }
        }

        if let Some(fallback) = &self.fallback {
            if let Some(identifier) = fallback.match_request(&mut request) {
                tracing::debug!(backend = %identifier, path = %request.path(), "Fallback matched request");
                return Ok(Classification {
                    target: Target::from_identifier(&identifier),
                    request,
                    legacy,
                });
            }
        }

        Err(RouteError::UnrecognizedRoute {
            path: request.path().to_string(),
        })
    }

    /// Buffer an HTTP request body and classify it.
    ///
    /// The returned head plus `Classification::request` rebuild the request
    /// for forwarding via `RoutableRequest::into_http`.
    pub async fn classify_http(
        &self,
        request: Request<Body>,
        body_limit: usize,
    ) -> RouteResult<(Parts, Classification)> {
        let (parts, routable) = RoutableRequest::from_http(request, body_limit).await?;
        let classification = self.classify(routable)?;
        Ok((parts, classification))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
