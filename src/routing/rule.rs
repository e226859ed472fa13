//! Rewrite rules and ordered per-domain rule tables.
//!
//! # Design Decisions
//! - Tables are plain data: adding a route is adding a row
//! - Declaration order is the only priority; first match wins
//! - A rule never fires on a path outside its `from` prefix, so a fired rule
//!   can always apply its rewrite

use regex::Regex;

use crate::routing::backend::BackendType;
use crate::routing::request::RoutableRequest;

/// How a rule tests the request path.
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Path equals the literal.
    ExactEquals(String),
    /// Path starts with the literal.
    HasPrefix(String),
    /// Path contains the literal anywhere.
    Contains(String),
    /// Path matches the regular expression.
    RegexMatch(Regex),
}

impl MatchStrategy {
    pub fn is_match(&self, path: &str) -> bool {
        match self {
            MatchStrategy::ExactEquals(literal) => path == literal,
            MatchStrategy::HasPrefix(literal) => path.starts_with(literal.as_str()),
            MatchStrategy::Contains(fragment) => path.contains(fragment.as_str()),
            MatchStrategy::RegexMatch(re) => re.is_match(path),
        }
    }
}

/// A match condition plus the prefix substitution applied on a hit.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    strategy: MatchStrategy,
    from: String,
    to: String,
}

impl RewriteRule {
    pub fn new(strategy: MatchStrategy, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            strategy,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn strategy(&self) -> &MatchStrategy {
        &self.strategy
    }

    pub fn from_prefix(&self) -> &str {
        &self.from
    }

    pub fn to_prefix(&self) -> &str {
        &self.to
    }

    /// True if this rule claims `path`.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(self.from.as_str()) && self.strategy.is_match(path)
    }

    /// Apply this rule's prefix substitution.
    pub fn apply(&self, request: &mut RoutableRequest) {
        request.revise(&self.from, &self.to);
    }
}

/// The ordered rules owned by one backend domain.
#[derive(Debug, Clone)]
pub struct DomainRuleTable {
    backend: BackendType,
    rules: Vec<RewriteRule>,
}

impl DomainRuleTable {
    pub fn new(backend: BackendType, rules: Vec<RewriteRule>) -> Self {
        Self { backend, rules }
    }

    pub fn backend(&self) -> BackendType {
        self.backend
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// First rule, in declaration order, that claims `path`.
    pub fn find(&self, path: &str) -> Option<&RewriteRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Rewrite `request` with the first matching rule. Returns whether a
    /// rule fired.
    pub fn try_rewrite(&self, request: &mut RoutableRequest) -> bool {
        match self.find(request.path()) {
            Some(rule) => {
                rule.apply(request);
                true
            }
            None => false,
        }
    }
}
