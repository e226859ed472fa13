//! Edge request router for the configuration-management platform.
//!
//! Classifies every inbound API call to exactly one backend service and
//! rewrites its URL into that backend's canonical form.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{BackendType, Classification, Classifier, RoutableRequest, RouteError, Target};
