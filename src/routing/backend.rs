//! Backend service identities.
//!
//! Every classified request belongs to exactly one logical backend. Built-in
//! domains are a closed set; fallback matchers may name additional backends
//! by identifier.

use std::fmt;
use std::str::FromStr;

/// The closed set of backend services known to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    Unknown,
    Cache,
    Topology,
    Host,
    Process,
    Event,
    DataCollect,
    Operation,
    Task,
    Admin,
    Cloud,
}

impl BackendType {
    /// Built-in domains in global dispatch order.
    pub const DISPATCH_ORDER: [BackendType; 10] = [
        BackendType::Cache,
        BackendType::Topology,
        BackendType::Host,
        BackendType::Process,
        BackendType::Event,
        BackendType::DataCollect,
        BackendType::Operation,
        BackendType::Task,
        BackendType::Admin,
        BackendType::Cloud,
    ];

    /// Stable identifier used in config files, logs and metrics labels.
    pub fn identifier(&self) -> &'static str {
        match self {
            BackendType::Unknown => "unknown",
            BackendType::Cache => "cache",
            BackendType::Topology => "topo",
            BackendType::Host => "host",
            BackendType::Process => "proc",
            BackendType::Event => "event",
            BackendType::DataCollect => "collector",
            BackendType::Operation => "operation",
            BackendType::Task => "task",
            BackendType::Admin => "admin",
            BackendType::Cloud => "cloud",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Error returned when an identifier names no built-in backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown backend identifier: {0}")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendType {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(BackendType::Unknown),
            "cache" => Ok(BackendType::Cache),
            "topo" => Ok(BackendType::Topology),
            "host" => Ok(BackendType::Host),
            "proc" => Ok(BackendType::Process),
            "event" => Ok(BackendType::Event),
            "collector" => Ok(BackendType::DataCollect),
            "operation" => Ok(BackendType::Operation),
            "task" => Ok(BackendType::Task),
            "admin" => Ok(BackendType::Admin),
            "cloud" => Ok(BackendType::Cloud),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

/// Where a classified request goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// A built-in backend domain.
    Backend(BackendType),
    /// A backend named by a fallback matcher that is not a built-in domain.
    Dynamic(String),
}

impl Target {
    /// Map a fallback-reported identifier onto a target, preferring built-ins.
    ///
    /// `unknown` never names a built-in here: a successful classification
    /// always has a real destination.
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier.parse::<BackendType>() {
            Ok(BackendType::Unknown) | Err(_) => Target::Dynamic(identifier.to_string()),
            Ok(backend) => Target::Backend(backend),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Target::Backend(backend) => backend.identifier(),
            Target::Dynamic(name) => name,
        }
    }

    /// The built-in backend, if any.
    pub fn backend(&self) -> Option<BackendType> {
        match self {
            Target::Backend(backend) => Some(*backend),
            Target::Dynamic(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}
