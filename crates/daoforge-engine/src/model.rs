//! Work units handed to workers and the run report handed back.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use daoforge_core::SchemaObjects;
use daoforge_options::CapabilitySet;

/// One unit of generation work. Units are independent; workers may run
/// them in any order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    /// Entity (unless shared) followed by the DAO for one relation.
    Relation {
        name: String,
        capabilities: CapabilitySet,
        emit_entity: bool,
    },
    /// Entity-only unit for an entity pulled in by reference.
    Entity { name: String },
    Procedure { name: String },
    CustomView { name: String },
    Command { name: String },
}

impl WorkUnit {
    /// Name of the object the unit generates for.
    pub fn name(&self) -> &str {
        match self {
            WorkUnit::Relation { name, .. }
            | WorkUnit::Entity { name }
            | WorkUnit::Procedure { name }
            | WorkUnit::CustomView { name }
            | WorkUnit::Command { name } => name,
        }
    }
}

/// Unit counts by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCounts {
    pub relations: u64,
    pub entities: u64,
    pub procedures: u64,
    pub custom_views: u64,
    pub commands: u64,
}

impl UnitCounts {
    pub fn total(&self) -> u64 {
        self.relations + self.entities + self.procedures + self.custom_views + self.commands
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub schema: String,
    pub strategy: String,
    pub started_at: String,
    pub units: UnitCounts,
    /// Free-text progress lines from the strategy, in completion order.
    pub feedback: Vec<String>,
    /// Filter rules that never matched any object.
    pub unused_rules: Vec<String>,
    pub types_resolved: u64,
    pub duration_ms: u64,
    /// Error text of the failure that stopped the run, when it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl GenerationReport {
    pub fn new(run_id: String, schema: String, strategy: String) -> Self {
        Self {
            run_id,
            schema,
            strategy,
            started_at: Utc::now().to_rfc3339(),
            units: UnitCounts::default(),
            feedback: Vec::new(),
            unused_rules: Vec::new(),
            types_resolved: 0,
            duration_ms: 0,
            failure: None,
        }
    }

    pub fn record_unit(&mut self, unit: &WorkUnit) {
        match unit {
            WorkUnit::Relation { .. } => self.units.relations += 1,
            WorkUnit::Entity { .. } => self.units.entities += 1,
            WorkUnit::Procedure { .. } => self.units.procedures += 1,
            WorkUnit::CustomView { .. } => self.units.custom_views += 1,
            WorkUnit::Command { .. } => self.units.commands += 1,
        }
    }

    pub fn record_feedback(&mut self, lines: Vec<String>) {
        self.feedback.extend(lines);
    }

    pub fn record_unused_rule(&mut self, rule: &str) {
        self.unused_rules.push(rule.to_string());
    }

    pub fn record_failure(&mut self, message: &str) {
        self.failure = Some(message.to_string());
    }
}

/// Sorted name listing written beside the generated artifacts so callers
/// can discover what a schema declares without re-parsing it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameIndex {
    pub schema: String,
    pub enums: Vec<String>,
    pub tables: Vec<String>,
    pub views: Vec<String>,
    pub stored_procedures: Vec<String>,
}

impl NameIndex {
    pub fn from_objects(schema: &str, objects: &SchemaObjects) -> Self {
        Self {
            schema: schema.to_string(),
            enums: objects.enums.keys().cloned().collect(),
            tables: objects.tables.keys().cloned().collect(),
            views: objects.views.keys().cloned().collect(),
            stored_procedures: objects.procedures.keys().cloned().collect(),
        }
    }
}
