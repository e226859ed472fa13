//! Translation of deprecated `/api/v3/cc/...` endpoints.
//!
//! # Responsibilities
//! - Recognize the closed set of legacy paths with one map lookup
//! - Pull identifiers out of the JSON body where the new path needs them
//! - Rewrite path and URI into the canonical `/api/v3` space before any
//!   domain table runs
//!
//! # Design Decisions
//! - The mapping is a const table; adding a legacy endpoint is adding a row
//! - Required fields are typed: `bk_obj_id` is a string, `bk_inst_id` and
//!   `id` are integers; absent or mistyped fields fail the request
//! - The body is only read, never consumed, so it is forwarded unchanged
//! - Identifiers are literal in the path and percent-encoded in the URI

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::routing::error::{RouteError, RouteResult};
use crate::routing::request::RoutableRequest;

/// How a legacy route builds its new path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyTemplate {
    /// A fixed path; the body is not inspected.
    Fixed(&'static str),
    /// `{base}/{bk_obj_id}`
    Object(&'static str),
    /// `{base}/{bk_obj_id}/inst/{bk_inst_id}`
    ObjectInstance(&'static str),
    /// `{base}/{id}`
    Association(&'static str),
}

#[derive(Debug, Deserialize)]
struct ObjectFields {
    bk_obj_id: String,
}

#[derive(Debug, Deserialize)]
struct ObjectInstanceFields {
    bk_obj_id: String,
    bk_inst_id: i64,
}

#[derive(Debug, Deserialize)]
struct AssociationFields {
    id: i64,
}

impl LegacyTemplate {
    /// Body fields this template interpolates.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            LegacyTemplate::Fixed(_) => &[],
            LegacyTemplate::Object(_) => &["bk_obj_id"],
            LegacyTemplate::ObjectInstance(_) => &["bk_obj_id", "bk_inst_id"],
            LegacyTemplate::Association(_) => &["id"],
        }
    }

    /// Build the new path, parsing `body` only when fields are required.
    ///
    /// Repeated keys in the body resolve to their last value.
    pub fn render(&self, body: &[u8]) -> Result<LegacyTarget, serde_json::Error> {
        match *self {
            LegacyTemplate::Fixed(path) => Ok(LegacyTarget::join(path, &[])),
            LegacyTemplate::Object(base) => {
                let fields: ObjectFields = parse_fields(body)?;
                Ok(LegacyTarget::join(base, &[fields.bk_obj_id.as_str()]))
            }
            LegacyTemplate::ObjectInstance(base) => {
                let fields: ObjectInstanceFields = parse_fields(body)?;
                let inst_id = fields.bk_inst_id.to_string();
                Ok(LegacyTarget::join(base, &[fields.bk_obj_id.as_str(), "inst", inst_id.as_str()]))
            }
            LegacyTemplate::Association(base) => {
                let fields: AssociationFields = parse_fields(body)?;
                Ok(LegacyTarget::join(base, &[fields.id.to_string().as_str()]))
            }
        }
    }
}

fn parse_fields<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    let value: Value = serde_json::from_slice(body)?;
    serde_json::from_value(value)
}

/// A rendered legacy destination.
///
/// `path` carries body identifiers verbatim; `uri` carries them
/// percent-encoded so each stays a single path segment on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTarget {
    pub path: String,
    pub uri: String,
}

impl LegacyTarget {
    fn join(base: &str, segments: &[&str]) -> Self {
        let mut path = base.to_string();
        let mut uri = base.to_string();
        for segment in segments {
            path.push('/');
            path.push_str(segment);
            uri.push('/');
            uri.push_str(&urlencoding::encode(segment));
        }
        Self { path, uri }
    }
}

/// One deprecated endpoint and its canonical replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyRoute {
    pub old_path: &'static str,
    pub template: LegacyTemplate,
}

const fn route(old_path: &'static str, template: LegacyTemplate) -> LegacyRoute {
    LegacyRoute { old_path, template }
}

/// Every legacy endpoint still served.
pub const LEGACY_ROUTES: &[LegacyRoute] = &[
    route("/api/v3/cc/search_inst/", LegacyTemplate::Object("/api/v3/find/instassociation/object")),
    route("/api/v3/cc/create_inst/", LegacyTemplate::Object("/api/v3/create/instance/object")),
    route("/api/v3/cc/update_inst/", LegacyTemplate::ObjectInstance("/api/v3/update/instance/object")),
    route("/api/v3/cc/batch_update_inst/", LegacyTemplate::Object("/api/v3/updatemany/instance/object")),
    route("/api/v3/cc/delete_inst/", LegacyTemplate::ObjectInstance("/api/v3/delete/instance/object")),
    route("/api/v3/cc/list_hosts_without_biz/", LegacyTemplate::Fixed("/api/v3/hosts/list_hosts_without_app")),
    route("/api/v3/cc/batch_update_host/", LegacyTemplate::Fixed("/api/v3/hosts/property/batch")),
    route("/api/v3/cc/search_hostidentifier/", LegacyTemplate::Fixed("/api/v3/identifier/host/search")),
    route("/api/v3/cc/find_instance_association/", LegacyTemplate::Fixed("/api/v3/find/instassociation")),
    route("/api/v3/cc/add_instance_association/", LegacyTemplate::Fixed("/api/v3/create/instassociation")),
    route("/api/v3/cc/delete_instance_association/", LegacyTemplate::Association("/api/v3/delete/instassociation")),
    route("/api/v3/cc/search_related_inst_asso/", LegacyTemplate::Fixed("/api/v3/find/instassociation/related")),
    route("/api/v3/cc/delete_related_inst_asso/", LegacyTemplate::Fixed("/api/v3/delete/instassociation/batch")),
];

/// Rewrites legacy requests into the canonical path space.
#[derive(Debug, Clone)]
pub struct LegacyTranslator {
    routes: HashMap<&'static str, &'static LegacyRoute>,
}

impl LegacyTranslator {
    pub fn new() -> Self {
        let routes = LEGACY_ROUTES.iter().map(|r| (r.old_path, r)).collect();
        Self { routes }
    }

    pub fn lookup(&self, path: &str) -> Option<&'static LegacyRoute> {
        self.routes.get(path).copied()
    }

    /// Rewrite `request` if its path is a legacy endpoint.
    ///
    /// Returns `Ok(true)` when a rewrite happened. On error the request is
    /// left exactly as it was.
    pub fn translate(&self, request: &mut RoutableRequest) -> RouteResult<bool> {
        let Some(legacy) = self.lookup(request.path()) else {
            return Ok(false);
        };

        let target = legacy
            .template
            .render(request.body())
            .map_err(|source| RouteError::MalformedRequest {
                route: legacy.old_path,
                source,
            })?;

        tracing::debug!(from = %legacy.old_path, to = %target.path, "Translated legacy route");
        request.replace_path(target.path, target.uri);
        Ok(true)
    }
}

impl Default for LegacyTranslator {
    fn default() -> Self {
        Self::new()
    }
}
