//! Fallback matching for routes the built-in tables do not know.
//!
//! # Responsibilities
//! - Define the seam deployments use to add dynamic routes
//! - Provide a config-driven prefix matcher and an ordered chain of matchers
//!
//! # Design Decisions
//! - Injected into the classifier at construction, no global registry
//! - A fallback owns its rewrite: the classifier never rewrites a fallback hit
//! - Consulted only after every built-in domain missed

use crate::config::FallbackRouteConfig;
use crate::routing::request::RoutableRequest;

/// A secondary matcher consulted after all built-in domains miss.
pub trait FallbackMatcher: Send + Sync + std::fmt::Debug {
    /// Returns the backend identifier if this matcher claims the request.
    /// The matcher may rewrite the request before claiming it.
    fn match_request(&self, request: &mut RoutableRequest) -> Option<String>;
}

/// Claims every request whose path starts with a prefix.
#[derive(Debug, Clone)]
pub struct PrefixFallback {
    prefix: String,
    backend: String,
    rewrite: Option<(String, String)>,
}

impl PrefixFallback {
    pub fn new(prefix: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            backend: backend.into(),
            rewrite: None,
        }
    }

    /// Replace `from` with `to` on claimed requests.
    pub fn with_rewrite(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.rewrite = Some((from.into(), to.into()));
        self
    }
}

impl FallbackMatcher for PrefixFallback {
    fn match_request(&self, request: &mut RoutableRequest) -> Option<String> {
        if !request.path().starts_with(&self.prefix) {
            return None;
        }
        if let Some((from, to)) = &self.rewrite {
            if !request.path().starts_with(from.as_str()) {
                return None;
            }
            request.revise(from, to);
        }
        Some(self.backend.clone())
    }
}

/// Tries matchers in order; the first hit wins.
#[derive(Debug, Default)]
pub struct FallbackChain {
    matchers: Vec<Box<dyn FallbackMatcher>>,
}

impl FallbackChain {
    pub fn new(matchers: Vec<Box<dyn FallbackMatcher>>) -> Self {
        Self { matchers }
    }

    /// Build a chain of prefix matchers from configured routes, in order.
    pub fn from_config(routes: &[FallbackRouteConfig]) -> Self {
        let matchers = routes
            .iter()
            .map(|route| {
                let mut matcher = PrefixFallback::new(&route.path_prefix, &route.backend);
                if let (Some(from), Some(to)) = (&route.rewrite_from, &route.rewrite_to) {
                    matcher = matcher.with_rewrite(from, to);
                }
                Box::new(matcher) as Box<dyn FallbackMatcher>
            })
            .collect();
        Self { matchers }
    }

    pub fn push(&mut self, matcher: Box<dyn FallbackMatcher>) {
        self.matchers.push(matcher);
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl FallbackMatcher for FallbackChain {
    fn match_request(&self, request: &mut RoutableRequest) -> Option<String> {
        self.matchers.iter().find_map(|m| m.match_request(request))
    }
}
