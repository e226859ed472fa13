//! Request classification and URL rewriting.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, URI, body)
//!     → request.rs (buffer body once, re-readable)
//!     → legacy.rs (translate deprecated /api/v3/cc/... endpoints)
//!     → tables.rs (ten domain tables, fixed global order)
//!     → fallback.rs (injected matcher, only after every domain missed)
//!     → Return: (Target, rewritten request) or RouteError
//!
//! Table construction (once, at first use):
//!     static rows
//!     → compile regexes
//!     → freeze as immutable DomainRuleTable values
//! ```
//!
//! # Design Decisions
//! - Tables are data, immutable at runtime (thread-safe without locks)
//! - Deterministic: same input always yields the same target and path
//! - First match wins, both across domains and within a domain
//! - Explicit UnrecognizedRoute rather than a silent default

pub mod backend;
pub mod classifier;
pub mod error;
pub mod fallback;
pub mod legacy;
pub mod request;
pub mod rule;
pub mod tables;

pub use backend::{BackendType, Target};
pub use classifier::{Classification, Classifier};
pub use error::{RouteError, RouteResult};
pub use fallback::{FallbackChain, FallbackMatcher, PrefixFallback};
pub use legacy::{LegacyRoute, LegacyTarget, LegacyTemplate, LegacyTranslator, LEGACY_ROUTES};
pub use request::RoutableRequest;
pub use rule::{DomainRuleTable, MatchStrategy, RewriteRule};
