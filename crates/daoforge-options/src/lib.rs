//! Generation options for daoforge: the options document, the
//! filter/capability rule engine, and override patches.

pub mod filter;
pub mod model;
pub mod overrides;
pub mod parse;

pub use filter::{
    CapabilitySet, Decision, Filter, FilterEngine, FilterRule, NamePattern, ObjectKind,
    RuleAction, UnusedRule,
};
pub use model::{DatabaseKind, GenOptions, StrategyKind, DEFAULT_WORKER_LIMIT};
pub use overrides::{Overrides, ProcedureOverride, TableOverride};
pub use parse::{load_options, parse_options};
