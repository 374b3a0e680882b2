//! Filter rules deciding which objects generate and with what capabilities.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use regex::Regex;

bitflags! {
    /// DAO capability mask, spelled with the letters `C`, `R`, `U`, `D`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CapabilitySet: u8 {
        const CREATE = 0b0001;
        const READ   = 0b0010;
        const UPDATE = 0b0100;
        const DELETE = 0b1000;
    }
}

impl FromStr for CapabilitySet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = CapabilitySet::empty();
        for letter in s.chars() {
            set |= match letter {
                'C' => CapabilitySet::CREATE,
                'R' => CapabilitySet::READ,
                'U' => CapabilitySet::UPDATE,
                'D' => CapabilitySet::DELETE,
                other => {
                    return Err(format!(
                        "unknown capability letter '{other}' (expected C, R, U or D)"
                    ));
                }
            };
        }
        Ok(set)
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (letter, flag) in [
            ('C', CapabilitySet::CREATE),
            ('R', CapabilitySet::READ),
            ('U', CapabilitySet::UPDATE),
            ('D', CapabilitySet::DELETE),
        ] {
            if self.contains(flag) {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// Object category a filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ObjectKind {
    Table,
    View,
    StoredProcedure,
    CustomView,
    Command,
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "view" => Ok(Self::View),
            "storedprocedure" => Ok(Self::StoredProcedure),
            "customview" => Ok(Self::CustomView),
            "command" => Ok(Self::Command),
            other => Err(format!("unknown filter type '{other}'")),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Table => "table",
            ObjectKind::View => "view",
            ObjectKind::StoredProcedure => "storedprocedure",
            ObjectKind::CustomView => "customview",
            ObjectKind::Command => "command",
        };
        f.write_str(name)
    }
}

/// Whether a matching rule pulls an object in or pushes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Include,
    Exclude,
}

impl FromStr for RuleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "include" => Ok(Self::Include),
            "exclude" => Ok(Self::Exclude),
            other => Err(format!(
                "unknown rule action '{other}' (expected include or exclude)"
            )),
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleAction::Include => "include",
            RuleAction::Exclude => "exclude",
        };
        f.write_str(name)
    }
}

/// Rule name pattern: a literal with `*` wildcards, matched whole.
#[derive(Debug, Clone)]
pub struct NamePattern {
    raw: String,
    regex: Regex,
}

impl NamePattern {
    pub fn new(raw: &str) -> Result<Self, regex::Error> {
        let mut expr = String::from("^");
        for (index, part) in raw.split('*').enumerate() {
            if index > 0 {
                expr.push_str(".*");
            }
            expr.push_str(&regex::escape(part));
        }
        expr.push('$');
        Ok(Self {
            raw: raw.to_string(),
            regex: Regex::new(&expr)?,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Pattern as written in the options file.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// One filter rule.
#[derive(Debug, Clone)]
pub struct FilterRule {
    pub action: RuleAction,
    pub pattern: NamePattern,
    /// Capability mask granted by an include rule.
    pub capabilities: CapabilitySet,
}

/// An ordered rule list scoped to one object kind.
#[derive(Debug, Clone)]
pub struct Filter {
    pub kind: ObjectKind,
    pub rules: Vec<FilterRule>,
}

/// Outcome of filtering one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub included: bool,
    pub capabilities: CapabilitySet,
}

/// A rule that never matched any object during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnusedRule {
    pub kind: ObjectKind,
    pub action: RuleAction,
    pub pattern: String,
}

impl fmt::Display for UnusedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rule '{}' for {} objects never matched",
            self.action, self.pattern, self.kind
        )
    }
}

/// Evaluates filter rules and remembers which ones ever matched.
pub struct FilterEngine {
    filters: Vec<Filter>,
    hits: Vec<Vec<bool>>,
}

impl FilterEngine {
    pub fn new(filters: Vec<Filter>) -> Self {
        let hits = filters.iter().map(|f| vec![false; f.rules.len()]).collect();
        Self { filters, hits }
    }

    /// Decide inclusion and capabilities for one named object.
    ///
    /// Only filters of the matching kind are consulted. Every rule is
    /// evaluated in declaration order with no short-circuit, and the last
    /// matching rule wins; an intermediate exclude does not stop a later
    /// include from re-admitting the object. `None` means no rule matched
    /// at all, which defaults to excluded.
    pub fn decide(&mut self, kind: ObjectKind, name: &str) -> Option<Decision> {
        let mut outcome = None;
        for (filter_index, filter) in self.filters.iter().enumerate() {
            if filter.kind != kind {
                continue;
            }
            for (rule_index, rule) in filter.rules.iter().enumerate() {
                if !rule.pattern.matches(name) {
                    continue;
                }
                self.hits[filter_index][rule_index] = true;
                outcome = Some(match rule.action {
                    RuleAction::Include => Decision {
                        included: true,
                        capabilities: rule.capabilities,
                    },
                    RuleAction::Exclude => Decision {
                        included: false,
                        capabilities: CapabilitySet::empty(),
                    },
                });
            }
        }
        outcome
    }

    /// Rules that never matched, in declaration order. Surfaced after the
    /// run so a stale pattern in the options file does not go unnoticed.
    pub fn unused_rules(&self) -> Vec<UnusedRule> {
        let mut unused = Vec::new();
        for (filter, hits) in self.filters.iter().zip(&self.hits) {
            for (rule, hit) in filter.rules.iter().zip(hits) {
                if !hit {
                    unused.push(UnusedRule {
                        kind: filter.kind,
                        action: rule.action,
                        pattern: rule.pattern.as_str().to_string(),
                    });
                }
            }
        }
        unused
    }
}
