//! Cross-reference checks over a parsed schema.

use std::collections::BTreeSet;

use crate::column::Column;
use crate::command::CustomViewEntity;
use crate::error::{Error, Result};
use crate::schema::{Schema, SchemaObjects};

/// Validate internal consistency of a parsed schema.
///
/// Structural shape is already enforced by parsing; this pass checks the
/// references between objects: constraint members, optimistic-lock
/// columns, enum bindings, foreign-key targets, custom-view entity
/// references, and ref-cursor element types.
pub fn validate_schema(schema: &Schema) -> Result<()> {
    let objects = &schema.objects;
    let cursor_targets = cursor_target_names(objects);

    for table in objects.tables.values() {
        for constraint in &table.constraints {
            for member in &constraint.columns {
                if !table.columns.iter().any(|c| &c.name == member) {
                    return Err(Error::InvalidSchema(format!(
                        "constraint '{}' on table '{}' names unknown column '{member}'",
                        constraint.name, table.name
                    )));
                }
            }
        }
        if let Some(lock) = &table.optimistic_lock {
            if !table.columns.iter().any(|c| &c.name == lock) {
                return Err(Error::InvalidSchema(format!(
                    "optimistic-lock column '{lock}' not found on table '{}'",
                    table.name
                )));
            }
        }
        for column in &table.columns {
            check_column(objects, &cursor_targets, &table.name, column)?;
        }
    }

    for view in objects.views.values() {
        for column in &view.columns {
            check_column(objects, &cursor_targets, &view.name, column)?;
        }
    }

    for procedure in objects.procedures.values() {
        for parameter in &procedure.parameters {
            check_column(objects, &cursor_targets, &procedure.name, &parameter.column)?;
        }
    }

    for command in objects.commands.values() {
        for parameter in &command.parameters {
            check_column(objects, &cursor_targets, &command.name, &parameter.column)?;
        }
    }

    for custom_view in objects.custom_views.values() {
        if let CustomViewEntity::Existing(target) = &custom_view.entity {
            if objects.relation(target).is_none() {
                return Err(Error::InvalidSchema(format!(
                    "custom view '{}' references unknown relation '{target}'",
                    custom_view.name
                )));
            }
        }
        for parameter in &custom_view.parameters {
            check_column(
                objects,
                &cursor_targets,
                &custom_view.name,
                &parameter.column,
            )?;
        }
        for column in &custom_view.columns {
            check_column(objects, &cursor_targets, &custom_view.name, column)?;
        }
    }

    Ok(())
}

/// Names a ref-cursor element type may legally resolve to: every relation
/// plus every entity a custom view synthesizes.
fn cursor_target_names(objects: &SchemaObjects) -> BTreeSet<&str> {
    let mut targets: BTreeSet<&str> = BTreeSet::new();
    targets.extend(objects.tables.keys().map(String::as_str));
    targets.extend(objects.views.keys().map(String::as_str));
    for custom_view in objects.custom_views.values() {
        if let CustomViewEntity::Synthesized(name) = &custom_view.entity {
            targets.insert(name);
        }
    }
    targets
}

fn check_column(
    objects: &SchemaObjects,
    cursor_targets: &BTreeSet<&str>,
    owner: &str,
    column: &Column,
) -> Result<()> {
    if let Some(enum_name) = &column.enum_name {
        if !objects.enums.contains_key(enum_name) {
            return Err(Error::InvalidSchema(format!(
                "column '{}' of '{owner}' is bound to unknown enum '{enum_name}'",
                column.name
            )));
        }
    }
    if let Some(reference) = &column.attributes.references {
        let Some(target) = objects.tables.get(&reference.table) else {
            return Err(Error::InvalidSchema(format!(
                "column '{}' of '{owner}' references unknown table '{}'",
                column.name, reference.table
            )));
        };
        if !target.columns.iter().any(|c| c.name == reference.column) {
            return Err(Error::InvalidSchema(format!(
                "column '{}' of '{owner}' references unknown column '{}' on table '{}'",
                column.name, reference.column, reference.table
            )));
        }
    }
    if let Some(element) = &column.attributes.cursor_element {
        if !cursor_targets.contains(element.as_str()) {
            return Err(Error::InvalidSchema(format!(
                "column '{}' of '{owner}' names unknown ref-cursor element '{element}'",
                column.name
            )));
        }
    }
    Ok(())
}
