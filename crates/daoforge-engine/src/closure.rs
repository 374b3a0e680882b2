//! Single-pass inclusion closure over the filtered object set.
//!
//! Filtering decides which declared objects generate; the closure then
//! pulls in every entity those objects reference so no generated DAO
//! points at a type that was never emitted. Custom views with a declared
//! custom entity get that entity synthesized here as a relation.

use std::collections::{BTreeMap, BTreeSet};

use daoforge_core::{
    CustomViewEntity, Relation, RelationKind, SchemaObjects, Table, default_physical_name,
};
use daoforge_options::{CapabilitySet, FilterEngine, ObjectKind};

use crate::errors::GenerationError;

/// Objects selected by filtering plus the entities generation pulls in.
#[derive(Debug, Default)]
pub struct Selection {
    /// Included tables with their capability masks.
    pub tables: BTreeMap<String, CapabilitySet>,
    /// Included views with their capability masks.
    pub views: BTreeMap<String, CapabilitySet>,
    pub procedures: BTreeSet<String>,
    pub custom_views: BTreeSet<String>,
    pub commands: BTreeSet<String>,
    /// Entities pulled in by reference that no selected relation emits
    /// itself, keyed by entity name.
    pub additional: BTreeSet<String>,
}

/// Compute the closure in one pass over the declared objects.
///
/// Synthesized custom entities are registered in
/// `objects.custom_view_tables` as a side effect so later lookups can
/// resolve them like any other relation.
pub fn compute_closure(
    objects: &mut SchemaObjects,
    filters: &mut FilterEngine,
) -> Result<Selection, GenerationError> {
    let mut selection = Selection::default();

    for name in keys(&objects.tables) {
        let Some(decision) = filters.decide(ObjectKind::Table, &name) else {
            continue;
        };
        if !decision.included {
            continue;
        }
        let entity = objects.tables[&name].entity_name.clone();
        if entity != name {
            selection.additional.insert(entity);
        }
        selection.tables.insert(name, decision.capabilities);
    }

    for name in keys(&objects.views) {
        let Some(decision) = filters.decide(ObjectKind::View, &name) else {
            continue;
        };
        if !decision.included {
            continue;
        }
        let entity = objects.views[&name].entity_name.clone();
        if entity != name {
            selection.additional.insert(entity);
        }
        selection.views.insert(name, decision.capabilities);
    }

    for name in keys(&objects.procedures) {
        let Some(decision) = filters.decide(ObjectKind::StoredProcedure, &name) else {
            continue;
        };
        if !decision.included {
            continue;
        }
        for result_set in objects.procedures[&name].result_sets.clone() {
            selection.additional.insert(result_set);
        }
        selection.procedures.insert(name);
    }

    for name in keys(&objects.custom_views) {
        let Some(decision) = filters.decide(ObjectKind::CustomView, &name) else {
            continue;
        };
        if !decision.included {
            continue;
        }
        match objects.custom_views[&name].entity.clone() {
            CustomViewEntity::Synthesized(entity) => {
                if objects.entity_exists(&entity) {
                    return Err(GenerationError::EntityCollision(entity));
                }
                let columns = objects.custom_views[&name].columns.clone();
                objects.custom_view_tables.insert(
                    entity.clone(),
                    Table {
                        name: entity.clone(),
                        physical_name: default_physical_name(&entity),
                        entity_name: entity.clone(),
                        columns,
                        constraints: Vec::new(),
                        optimistic_lock: None,
                        kind: RelationKind::CustomView,
                    },
                );
                selection.additional.insert(entity);
            }
            CustomViewEntity::Existing(target) => {
                let Some(relation) = objects.relation(&target) else {
                    return Err(GenerationError::UnresolvedReference(target));
                };
                selection.additional.insert(relation.entity_name().to_string());
            }
        }
        selection.custom_views.insert(name);
    }

    for name in keys(&objects.commands) {
        let Some(decision) = filters.decide(ObjectKind::Command, &name) else {
            continue;
        };
        if decision.included {
            selection.commands.insert(name);
        }
    }

    // An entity already emitted by a selected relation of the same name
    // does not need a separate unit.
    let emitted_directly = |entity: &String| {
        let by_table = selection
            .tables
            .contains_key(entity)
            .then(|| objects.tables[entity].entity_name == *entity)
            .unwrap_or(false);
        let by_view = selection
            .views
            .contains_key(entity)
            .then(|| objects.views[entity].entity_name == *entity)
            .unwrap_or(false);
        by_table || by_view
    };
    selection.additional.retain(|entity| !emitted_directly(entity));

    Ok(selection)
}

/// Relation whose columns define the named entity: the relation named
/// like the entity when one exists, otherwise the first relation mapping
/// onto it.
pub fn entity_source<'a>(objects: &'a SchemaObjects, entity: &str) -> Option<&'a dyn Relation> {
    if let Some(relation) = objects.relation(entity) {
        return Some(relation);
    }
    objects
        .tables
        .values()
        .map(|table| table as &dyn Relation)
        .chain(objects.views.values().map(|view| view as &dyn Relation))
        .find(|relation| relation.entity_name() == entity)
}

fn keys<V>(map: &BTreeMap<String, V>) -> Vec<String> {
    map.keys().cloned().collect()
}
