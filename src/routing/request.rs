//! The per-request unit the classifier works on.
//!
//! # Responsibilities
//! - Hold the path, the request URI (path plus query) and the buffered body
//! - Apply prefix rewrites to path and URI together
//! - Buffer an HTTP body once and hand out independent re-readable copies
//!
//! # Design Decisions
//! - The body is buffered as `Bytes`; every consumer gets a cheap clone, so
//!   the bytes forwarded upstream are exactly the bytes that were received
//! - Path and URI are private and only change through `revise` or a legacy
//!   rewrite, which keeps the URI path-prefixed at all times

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Request, Uri};
use bytes::Bytes;

use crate::routing::error::{RouteError, RouteResult};

/// A request reduced to what routing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutableRequest {
    path: String,
    uri: String,
    body: Bytes,
}

impl RoutableRequest {
    /// Build from a request URI (path with optional query) and a body.
    pub fn new(uri: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let uri = uri.into();
        let path = match uri.split_once('?') {
            Some((path, _)) => path.to_string(),
            None => uri.clone(),
        };
        Self {
            path,
            uri,
            body: body.into(),
        }
    }

    /// Buffer the body of an incoming HTTP request.
    ///
    /// Returns the request head untouched so the caller can rebuild the
    /// request after classification.
    pub async fn from_http(request: Request<Body>, body_limit: usize) -> RouteResult<(Parts, Self)> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, body_limit)
            .await
            .map_err(|e| RouteError::BodyRead(e.to_string()))?;

        let path = parts.uri.path().to_string();
        let uri = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| path.clone());

        Ok((parts, Self { path, uri, body }))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// A fresh body stream over the buffered bytes.
    pub fn body_stream(&self) -> Body {
        Body::from(self.body.clone())
    }

    /// Replace the leading `from` of both path and URI with `to`.
    ///
    /// `from` must be a prefix of the current path; rules only fire when it
    /// is, so a miss here is a bug in a rule table.
    pub fn revise(&mut self, from: &str, to: &str) {
        let (Some(path_rest), Some(uri_rest)) =
            (self.path.strip_prefix(from), self.uri.strip_prefix(from))
        else {
            unreachable!("rewrite prefix {from:?} is not a prefix of {:?}", self.uri);
        };
        self.path = format!("{to}{path_rest}");
        self.uri = format!("{to}{uri_rest}");
    }

    /// Point the request at an entirely new path, dropping any query.
    /// `uri` is the wire form of `path`.
    pub(crate) fn replace_path(&mut self, path: String, uri: String) {
        self.path = path;
        self.uri = uri;
    }

    /// Reassemble an HTTP request from the original head and this request's
    /// URI and body. With an authority the URI becomes absolute (`http`).
    pub fn into_http(
        self,
        mut parts: Parts,
        authority: Option<Authority>,
    ) -> Result<Request<Body>, axum::http::Error> {
        let mut uri_parts = parts.uri.into_parts();
        uri_parts.path_and_query = Some(PathAndQuery::try_from(self.uri.as_str())?);
        if let Some(authority) = authority {
            uri_parts.scheme = Some(Scheme::HTTP);
            uri_parts.authority = Some(authority);
        }
        parts.uri = Uri::from_parts(uri_parts)?;

        Ok(Request::from_parts(parts, Body::from(self.body)))
    }
}
