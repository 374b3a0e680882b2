//! The parsed schema and its object catalogs.

use std::collections::BTreeMap;

use crate::command::{Command, CustomView};
use crate::enums::DbEnum;
use crate::error::{Error, Result};
use crate::procedure::StoredProcedure;
use crate::relation::{Relation, Table, View};

/// All schema objects, keyed by logical name.
///
/// `BTreeMap` keeps every walk over the catalogs deterministic, which in
/// turn keeps generated output stable across runs.
#[derive(Debug, Clone, Default)]
pub struct SchemaObjects {
    pub enums: BTreeMap<String, DbEnum>,
    pub tables: BTreeMap<String, Table>,
    pub views: BTreeMap<String, View>,
    pub procedures: BTreeMap<String, StoredProcedure>,
    pub custom_views: BTreeMap<String, CustomView>,
    pub commands: BTreeMap<String, Command>,
    /// Tables synthesized for custom views that declare a new entity.
    /// Populated during generation, empty right after parsing.
    pub custom_view_tables: BTreeMap<String, Table>,
}

impl SchemaObjects {
    /// Resolve a name to a relation across tables, views, and synthesized
    /// custom-view tables.
    pub fn relation(&self, name: &str) -> Option<&dyn Relation> {
        if let Some(table) = self.tables.get(name) {
            return Some(table);
        }
        if let Some(view) = self.views.get(name) {
            return Some(view);
        }
        self.custom_view_tables
            .get(name)
            .map(|table| table as &dyn Relation)
    }

    /// True when the name already identifies an entity: a relation name,
    /// or an entity another relation maps onto.
    pub fn entity_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
            || self.views.contains_key(name)
            || self.custom_view_tables.contains_key(name)
            || self.tables.values().any(|t| t.entity_name == name)
            || self.views.values().any(|v| v.entity_name == name)
    }

    /// Total number of declared objects, synthesized tables excluded.
    pub fn declared_len(&self) -> usize {
        self.enums.len()
            + self.tables.len()
            + self.views.len()
            + self.procedures.len()
            + self.custom_views.len()
            + self.commands.len()
    }
}

/// A parsed schema definition.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    pub objects: SchemaObjects,
}

impl Schema {
    /// Merge the objects of another schema file into this one.
    ///
    /// Used for the additional schema file; a name collision between the
    /// two files is fatal.
    pub fn merge(&mut self, other: Schema) -> Result<()> {
        merge_catalog(&mut self.objects.enums, other.objects.enums, "enum")?;
        merge_catalog(&mut self.objects.tables, other.objects.tables, "table")?;
        merge_catalog(&mut self.objects.views, other.objects.views, "view")?;
        merge_catalog(
            &mut self.objects.procedures,
            other.objects.procedures,
            "stored procedure",
        )?;
        merge_catalog(
            &mut self.objects.custom_views,
            other.objects.custom_views,
            "custom view",
        )?;
        merge_catalog(&mut self.objects.commands, other.objects.commands, "command")?;
        Ok(())
    }
}

fn merge_catalog<T>(
    target: &mut BTreeMap<String, T>,
    source: BTreeMap<String, T>,
    kind: &str,
) -> Result<()> {
    for (name, object) in source {
        if target.contains_key(&name) {
            return Err(Error::InvalidSchema(format!(
                "duplicate {kind} '{name}' across schema files"
            )));
        }
        target.insert(name, object);
    }
    Ok(())
}
