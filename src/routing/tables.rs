//! Built-in domain rule tables.
//!
//! One ordered table per backend domain, keyed on the public `/api/v3` root.
//! Tables are built once on first use and shared read-only afterwards.
//!
//! Row order inside each table is load bearing. Some rows are shadowed by
//! earlier ones (the trailing topo regex, `/objectattgroupproperty` after
//! `/objectattgroup`); they stay so the tables read the same as the routes
//! the backends were written against.

use std::sync::LazyLock;

use regex::Regex;

use crate::routing::backend::BackendType;
use crate::routing::rule::{DomainRuleTable, MatchStrategy, RewriteRule};

/// Public root every built-in rule is keyed on.
pub const ROOT_PATH: &str = "/api/v3";

/// Verbs shared by the CRUD-style endpoints.
pub const VERBS: &str = "create|createmany|update|updatemany|delete|deletemany|find|findmany";

pub const CACHE_ROOT: &str = "/cache/v3";
pub const TOPO_ROOT: &str = "/topo/v3";
pub const HOST_ROOT: &str = "/host/v3";
pub const PROC_ROOT: &str = "/process/v3";
pub const EVENT_ROOT: &str = "/event/v3";
pub const COLLECTOR_ROOT: &str = "/collector/v3";
pub const OPERATION_ROOT: &str = "/operation/v3";
pub const TASK_ROOT: &str = "/task/v3";
pub const ADMIN_ROOT: &str = "/migrate/v3";
pub const CLOUD_ROOT: &str = "/cloud/v3";

static DOMAIN_TABLES: LazyLock<Vec<DomainRuleTable>> = LazyLock::new(|| {
    vec![
        cache(),
        topology(),
        host(),
        process(),
        event(),
        data_collect(),
        operation(),
        task(),
        admin(),
        cloud(),
    ]
});

/// All built-in tables in global dispatch order.
pub fn domain_tables() -> &'static [DomainRuleTable] {
    &DOMAIN_TABLES
}

fn api(suffix: &str) -> String {
    format!("{ROOT_PATH}{suffix}")
}

/// `^/api/v3/(<verbs>)<tail>$`
fn verb_regex(tail: &str) -> Regex {
    Regex::new(&format!("^{ROOT_PATH}/({VERBS}){tail}$")).expect("route regex is valid")
}

fn prefix(suffix: &str) -> MatchStrategy {
    MatchStrategy::HasPrefix(api(suffix))
}

fn exact(suffix: &str) -> MatchStrategy {
    MatchStrategy::ExactEquals(api(suffix))
}

fn contains(fragment: &str) -> MatchStrategy {
    MatchStrategy::Contains(fragment.to_string())
}

/// Table whose rows all rewrite the public root to `target`, except rows
/// built with an explicit `RewriteRule`.
struct Rows {
    target: &'static str,
    rules: Vec<RewriteRule>,
}

impl Rows {
    fn new(target: &'static str) -> Self {
        Self {
            target,
            rules: Vec::new(),
        }
    }

    fn root(mut self, strategy: MatchStrategy) -> Self {
        self.rules.push(RewriteRule::new(strategy, ROOT_PATH, self.target));
        self
    }

    fn custom(mut self, strategy: MatchStrategy, from: String, to: &str) -> Self {
        self.rules.push(RewriteRule::new(strategy, from, to));
        self
    }

    fn build(self, backend: BackendType) -> DomainRuleTable {
        DomainRuleTable::new(backend, self.rules)
    }
}

fn cache() -> DomainRuleTable {
    Rows::new(CACHE_ROOT)
        .custom(prefix("/cache/"), api("/cache"), CACHE_ROOT)
        .build(BackendType::Cache)
}

fn topology() -> DomainRuleTable {
    let topo_regex = verb_regex("/(inst|object|objects|topo|biz|module|set|resource)/.*");
    let object_regex = verb_regex("/object");

    Rows::new(TOPO_ROOT)
        .custom(prefix("/biz/"), api("/biz"), "/topo/v3/app")
        .root(prefix("/topo/"))
        .root(MatchStrategy::RegexMatch(topo_regex.clone()))
        .root(MatchStrategy::RegexMatch(object_regex))
        .root(prefix("/identifier/"))
        .root(prefix("/inst/"))
        .root(prefix("/module/"))
        .root(prefix("/object/"))
        .root(prefix("/set/"))
        // object model
        .root(contains("/objectclassification"))
        .root(contains("/classificationobject"))
        .root(contains("/objectattr"))
        .root(contains("/objectunique"))
        .root(contains("/objectattgroup"))
        .root(contains("/objectattgroupproperty"))
        .root(contains("/objectattgroupasst"))
        .root(contains("/objecttopo"))
        .root(contains("/topomodelmainline"))
        .root(contains("/topoinst"))
        .root(contains("/topopath"))
        // associations and instances
        .root(contains("/instassttopo"))
        .root(contains("/objecttopology"))
        .root(contains("/topoassociationtype"))
        .root(contains("/objectassociation"))
        .root(contains("/instassociation"))
        .root(contains("/insttopo"))
        .root(contains("/instance"))
        .root(contains("/instassociationdetail"))
        .root(contains("/associationtype"))
        // search and audit
        .root(contains("/find/full_text"))
        .root(contains("/find/audit_dict"))
        .root(contains("/findmany/audit_list"))
        .root(prefix("/find/audit"))
        .root(MatchStrategy::RegexMatch(topo_regex))
        .build(BackendType::Topology)
}

fn host() -> DomainRuleTable {
    let cloud_area_regex = verb_regex("/(cloudarea|cloudarea/.*)");
    let host_regex = verb_regex("/(host|hosts|host_apply_rule|host_apply_plan)/.*");

    Rows::new(HOST_ROOT)
        .custom(prefix("/host/"), api("/host"), HOST_ROOT)
        .root(prefix("/hosts/"))
        // dynamic grouping
        .root(exact("/dynamicgroup"))
        .root(prefix("/dynamicgroup/"))
        .root(exact("/usercustom"))
        .root(prefix("/usercustom/"))
        .root(MatchStrategy::RegexMatch(cloud_area_regex))
        .root(MatchStrategy::RegexMatch(host_regex))
        .root(prefix("/system/config"))
        .root(prefix("/findmany/module_relation/bk_biz_id/"))
        .build(BackendType::Host)
}

fn process() -> DomainRuleTable {
    Rows::new(PROC_ROOT)
        .custom(prefix("/proc/"), api("/proc"), PROC_ROOT)
        .root(MatchStrategy::RegexMatch(verb_regex("/proc/.*")))
        .build(BackendType::Process)
}

fn event() -> DomainRuleTable {
    Rows::new(EVENT_ROOT)
        .custom(prefix("/event/"), api("/event"), EVENT_ROOT)
        .build(BackendType::Event)
}

fn data_collect() -> DomainRuleTable {
    Rows::new(COLLECTOR_ROOT)
        .custom(prefix("/collector/"), api("/collector"), COLLECTOR_ROOT)
        .build(BackendType::DataCollect)
}

fn operation() -> DomainRuleTable {
    Rows::new(OPERATION_ROOT)
        .root(prefix("/operation/"))
        .root(MatchStrategy::RegexMatch(verb_regex("/operation/.*")))
        .build(BackendType::Operation)
}

fn task() -> DomainRuleTable {
    Rows::new(TASK_ROOT)
        .root(prefix("/task/"))
        .build(BackendType::Task)
}

fn admin() -> DomainRuleTable {
    Rows::new(ADMIN_ROOT)
        .custom(prefix("/admin/"), api("/admin"), ADMIN_ROOT)
        .build(BackendType::Admin)
}

fn cloud() -> DomainRuleTable {
    Rows::new(CLOUD_ROOT)
        .root(prefix("/cloud/"))
        .root(MatchStrategy::RegexMatch(verb_regex("/cloud/.*")))
        .build(BackendType::Cloud)
}
