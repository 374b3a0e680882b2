//! Single-pass walk from definition nodes into the typed schema model.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::column::{CharMode, Column, ColumnAttributes, ColumnKind, ColumnRef, Requirement};
use crate::command::{Command, CustomView, CustomViewEntity};
use crate::constraint::{Constraint, ConstraintKind};
use crate::enums::{DbEnum, EnumValue};
use crate::error::{Error, Result};
use crate::names;
use crate::node::{AttributeSet, DefNode};
use crate::procedure::{ParamDirection, Parameter, ProcedureKind, StoredProcedure};
use crate::relation::{RelationKind, Table, View};
use crate::schema::{Schema, SchemaObjects};

/// Load and parse a schema file.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let root = DefNode::from_path(path)?;
    parse_schema(&root)
}

/// Parse a `schema` document into the typed model.
///
/// The walk is a single pass: every element is read through an
/// [`AttributeSet`], so a typo'd attribute or a misplaced child element
/// fails the parse instead of silently dropping a declaration.
pub fn parse_schema(root: &DefNode) -> Result<Schema> {
    if root.element != "schema" {
        return Err(Error::InvalidSchema(format!(
            "expected <schema> document root, found <{}>",
            root.element
        )));
    }
    let mut attrs = AttributeSet::new(root);
    let name = attrs.required("name")?.to_string();
    attrs.finish()?;

    let mut objects = SchemaObjects::default();
    for child in &root.children {
        match child.element.as_str() {
            "enum" => {
                let parsed = parse_enum(child)?;
                insert_unique(&mut objects.enums, parsed.name.clone(), parsed, "enum")?;
            }
            "table" => {
                let parsed = parse_table(child)?;
                insert_unique(&mut objects.tables, parsed.name.clone(), parsed, "table")?;
            }
            "view" => {
                let parsed = parse_view(child)?;
                insert_unique(&mut objects.views, parsed.name.clone(), parsed, "view")?;
            }
            "storedprocedure" => {
                let parsed = parse_procedure(child)?;
                insert_unique(
                    &mut objects.procedures,
                    parsed.name.clone(),
                    parsed,
                    "stored procedure",
                )?;
            }
            "command" => {
                let parsed = parse_command(child)?;
                insert_unique(&mut objects.commands, parsed.name.clone(), parsed, "command")?;
            }
            "customview" => {
                let parsed = parse_custom_view(child)?;
                insert_unique(
                    &mut objects.custom_views,
                    parsed.name.clone(),
                    parsed,
                    "custom view",
                )?;
            }
            _ => return Err(root.unknown_child(child)),
        }
    }
    Ok(Schema { name, objects })
}

fn insert_unique<T>(
    map: &mut BTreeMap<String, T>,
    name: String,
    value: T,
    kind: &str,
) -> Result<()> {
    if map.contains_key(&name) {
        return Err(Error::InvalidSchema(format!("duplicate {kind} '{name}'")));
    }
    map.insert(name, value);
    Ok(())
}

fn ensure_leaf(node: &DefNode) -> Result<()> {
    match node.children.first() {
        Some(child) => Err(node.unknown_child(child)),
        None => Ok(()),
    }
}

fn parse_enum(node: &DefNode) -> Result<DbEnum> {
    let mut attrs = AttributeSet::new(node);
    let name = attrs.required("name")?.to_string();
    attrs.finish()?;

    let mut values = Vec::new();
    // Codes count up from 1; an explicit override pins the counter and
    // later values continue from it.
    let mut next_code = 1;
    for child in &node.children {
        match child.element.as_str() {
            "value" => {
                ensure_leaf(child)?;
                let mut vattrs = AttributeSet::new(child);
                let title = vattrs.required("title")?.to_string();
                let override_code = vattrs.parse_opt::<i32>("override")?;
                vattrs.finish()?;
                let code = override_code.unwrap_or(next_code);
                next_code = code + 1;
                values.push(EnumValue {
                    title,
                    override_code,
                    code,
                });
            }
            _ => return Err(node.unknown_child(child)),
        }
    }
    if values.is_empty() {
        return Err(Error::InvalidSchema(format!(
            "enum '{name}' declares no values"
        )));
    }
    Ok(DbEnum { name, values })
}

fn parse_table(node: &DefNode) -> Result<Table> {
    let mut attrs = AttributeSet::new(node);
    let name = attrs.required("name")?.to_string();
    let physical_name = physical_or_default(&mut attrs, &name);
    let entity_name = attrs.string_or("entity", &name);
    let optimistic_lock = attrs.optional("optimisticlockcolumn").map(str::to_string);
    attrs.finish()?;

    let mut columns = Vec::new();
    let mut constraints = Vec::new();
    for child in &node.children {
        match child.element.as_str() {
            "column" => columns.push(parse_column(child)?),
            "constraint" => constraints.push(parse_constraint(child)?),
            _ => return Err(node.unknown_child(child)),
        }
    }

    let mut table = Table {
        name,
        physical_name,
        entity_name,
        columns,
        constraints,
        optimistic_lock,
        kind: RelationKind::Table,
    };
    settle_primary_key(&mut table)?;
    Ok(table)
}

/// Reconcile explicit primary-key constraints with per-column markers.
///
/// An explicit constraint wins: its members get `requirement = primarykey`
/// and stray markers outside it are demoted to mandatory. Without one,
/// marked columns synthesize a constraint, so every keyed table ends up
/// with exactly one live primary key.
fn settle_primary_key(table: &mut Table) -> Result<()> {
    let primaries = table
        .constraints
        .iter()
        .filter(|c| c.is_primary_key())
        .count();
    if primaries > 1 {
        return Err(Error::InvalidSchema(format!(
            "table '{}' declares more than one primary-key constraint",
            table.name
        )));
    }

    let members: Option<Vec<String>> = table
        .constraints
        .iter()
        .find(|c| c.is_primary_key())
        .map(|c| c.columns.clone());
    match members {
        Some(members) => {
            for column in &mut table.columns {
                if members.iter().any(|m| m == &column.name) {
                    column.requirement = Requirement::PrimaryKey;
                } else if column.requirement == Requirement::PrimaryKey {
                    column.requirement = Requirement::Mandatory;
                }
            }
        }
        None => {
            let marked: Vec<String> = table
                .columns
                .iter()
                .filter(|c| c.is_primary_key())
                .map(|c| c.name.clone())
                .collect();
            if !marked.is_empty() {
                table.constraints.push(Constraint {
                    name: format!("{}_PK", table.physical_name),
                    kind: ConstraintKind::PrimaryKey,
                    columns: marked,
                });
            }
        }
    }
    Ok(())
}

fn parse_view(node: &DefNode) -> Result<View> {
    let mut attrs = AttributeSet::new(node);
    let name = attrs.required("name")?.to_string();
    let physical_name = physical_or_default(&mut attrs, &name);
    let entity_name = attrs.string_or("entity", &name);
    attrs.finish()?;

    let mut columns = Vec::new();
    for child in &node.children {
        match child.element.as_str() {
            "column" => columns.push(parse_column(child)?),
            _ => return Err(node.unknown_child(child)),
        }
    }
    Ok(View {
        name,
        physical_name,
        entity_name,
        columns,
    })
}

fn parse_constraint(node: &DefNode) -> Result<Constraint> {
    let mut attrs = AttributeSet::new(node);
    let name = attrs.required("name")?.to_string();
    let kind = attrs.parse_required::<ConstraintKind>("type")?;
    attrs.finish()?;

    let mut columns = Vec::new();
    for child in &node.children {
        match child.element.as_str() {
            "column" => {
                ensure_leaf(child)?;
                let mut cattrs = AttributeSet::new(child);
                columns.push(cattrs.required("name")?.to_string());
                cattrs.finish()?;
            }
            _ => return Err(node.unknown_child(child)),
        }
    }
    if columns.is_empty() {
        return Err(Error::InvalidSchema(format!(
            "constraint '{name}' declares no columns"
        )));
    }
    Ok(Constraint {
        name,
        kind,
        columns,
    })
}

fn parse_procedure(node: &DefNode) -> Result<StoredProcedure> {
    let mut attrs = AttributeSet::new(node);
    let name = attrs.required("name")?.to_string();
    let physical_name = physical_or_default(&mut attrs, &name);
    let catalog = attrs.optional("catalog").map(str::to_string);
    let schema_name = attrs.optional("schema").map(str::to_string);
    let kind = attrs.parse_or("type", ProcedureKind::Procedure)?;
    attrs.finish()?;

    let mut parameters = Vec::new();
    let mut ordinal = 0;
    for child in &node.children {
        match child.element.as_str() {
            "parameter" => {
                // Lossy metadata importers emit a trailing RETURN parameter
                // on plain procedures; drop it instead of failing the run.
                if kind == ProcedureKind::Procedure
                    && child.attributes.get("direction").map(String::as_str) == Some("return")
                {
                    warn!(
                        procedure = %name,
                        "dropping return parameter declared on a procedure"
                    );
                    continue;
                }
                ordinal += 1;
                parameters.push(parse_parameter(child, ordinal, &name)?);
            }
            _ => return Err(node.unknown_child(child)),
        }
    }
    Ok(StoredProcedure {
        name,
        physical_name,
        catalog,
        schema_name,
        kind,
        parameters,
        result_sets: Vec::new(),
    })
}

fn parse_parameter(node: &DefNode, ordinal: usize, owner: &str) -> Result<Parameter> {
    ensure_leaf(node)?;
    let mut attrs = AttributeSet::new(node);
    let direction = attrs.parse_or("direction", ParamDirection::In)?;
    let name = match attrs.optional("name") {
        Some(name) => name.to_string(),
        // Anonymous parameters are positional and only legal inbound.
        None if direction == ParamDirection::In => format!("Arg{ordinal}"),
        None => {
            return Err(Error::InvalidSchema(format!(
                "non-in parameter {ordinal} of '{owner}' must carry an explicit name"
            )));
        }
    };
    let column = read_column_body(&mut attrs, name)?;
    attrs.finish()?;
    Ok(Parameter { column, direction })
}

fn parse_command(node: &DefNode) -> Result<Command> {
    let mut attrs = AttributeSet::new(node);
    let name = attrs.required("name")?.to_string();
    let preserve_newlines = attrs.bool_or("preservenewlinesinsql", false)?;
    attrs.finish()?;

    let mut parameters = Vec::new();
    let mut sql = None;
    let mut ordinal = 0;
    for child in &node.children {
        match child.element.as_str() {
            "parameter" => {
                ordinal += 1;
                parameters.push(parse_parameter(child, ordinal, &name)?);
            }
            "sql" => sql = Some(parse_sql_body(child, &name, preserve_newlines)?),
            _ => return Err(node.unknown_child(child)),
        }
    }
    let sql = sql.ok_or_else(|| {
        Error::InvalidSchema(format!("command '{name}' is missing its sql body"))
    })?;
    Ok(Command {
        name,
        preserve_newlines,
        parameters,
        sql,
    })
}

fn parse_custom_view(node: &DefNode) -> Result<CustomView> {
    let mut attrs = AttributeSet::new(node);
    let name = attrs.required("name")?.to_string();
    let entity = match (attrs.optional("entity"), attrs.optional("customentity")) {
        (Some(existing), None) => CustomViewEntity::Existing(existing.to_string()),
        (None, Some(custom)) => CustomViewEntity::Synthesized(custom.to_string()),
        (Some(_), Some(_)) => {
            return Err(Error::InvalidSchema(format!(
                "custom view '{name}' declares both entity and customentity"
            )));
        }
        (None, None) => {
            return Err(Error::InvalidSchema(format!(
                "custom view '{name}' must declare either entity or customentity"
            )));
        }
    };
    let preserve_newlines = attrs.bool_or("preservenewlinesinsql", false)?;
    attrs.finish()?;

    let mut parameters = Vec::new();
    let mut columns = Vec::new();
    let mut sql = None;
    let mut ordinal = 0;
    for child in &node.children {
        match child.element.as_str() {
            "parameter" => {
                ordinal += 1;
                parameters.push(parse_parameter(child, ordinal, &name)?);
            }
            "column" => columns.push(parse_column(child)?),
            "sql" => sql = Some(parse_sql_body(child, &name, preserve_newlines)?),
            _ => return Err(node.unknown_child(child)),
        }
    }
    let sql = sql.ok_or_else(|| {
        Error::InvalidSchema(format!("custom view '{name}' is missing its sql body"))
    })?;
    if matches!(entity, CustomViewEntity::Synthesized(_)) && columns.is_empty() {
        return Err(Error::InvalidSchema(format!(
            "custom view '{name}' declares a custom entity but no columns"
        )));
    }
    Ok(CustomView {
        name,
        entity,
        preserve_newlines,
        parameters,
        columns,
        sql,
    })
}

fn parse_sql_body(node: &DefNode, owner: &str, preserve_newlines: bool) -> Result<String> {
    ensure_leaf(node)?;
    AttributeSet::new(node).finish()?;
    let text = node.text.as_deref().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(Error::InvalidSchema(format!(
            "'{owner}' has an empty sql body"
        )));
    }
    Ok(normalize_sql(text, preserve_newlines))
}

/// Collapse whitespace runs to single spaces unless the declaration asks
/// for newlines to be kept.
fn normalize_sql(text: &str, preserve_newlines: bool) -> String {
    if preserve_newlines {
        text.lines()
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn parse_column(node: &DefNode) -> Result<Column> {
    ensure_leaf(node)?;
    let mut attrs = AttributeSet::new(node);
    let name = attrs.required("name")?.to_string();
    let column = read_column_body(&mut attrs, name)?;
    attrs.finish()?;
    Ok(column)
}

/// The column attributes shared between relation columns and parameters.
/// The caller has already settled the name, which differs between the two.
fn read_column_body(attrs: &mut AttributeSet<'_>, name: String) -> Result<Column> {
    let element = attrs.element().to_string();
    let physical_name = physical_or_default(attrs, &name);
    let requirement = attrs.parse_or("requirement", Requirement::Optional)?;
    let identity = attrs.bool_or("identity", false)?;
    let enum_name = attrs.optional("enumname").map(str::to_string);
    let mode = attrs.parse_or("mode", CharMode::Varying)?;
    let kind = ColumnKind::from_tag(attrs.required("type")?, mode);
    let size = attrs.parse_opt("size")?;
    let scale = attrs.parse_opt("scale")?;
    let precision = attrs.parse_opt("precision")?;
    let references = match (
        attrs.optional("referencedtable"),
        attrs.optional("referencedcolumn"),
    ) {
        (Some(table), Some(column)) => Some(ColumnRef {
            table: table.to_string(),
            column: column.to_string(),
        }),
        (None, None) => None,
        (Some(_), None) => {
            return Err(Error::MissingAttribute {
                element,
                attribute: "referencedcolumn".to_string(),
            });
        }
        (None, Some(_)) => {
            return Err(Error::MissingAttribute {
                element,
                attribute: "referencedtable".to_string(),
            });
        }
    };
    let cursor_element = attrs.optional("refcursor-type").map(str::to_string);
    if kind == ColumnKind::RefCursor && cursor_element.is_none() {
        return Err(Error::MissingAttribute {
            element,
            attribute: "refcursor-type".to_string(),
        });
    }
    Ok(Column {
        name,
        physical_name,
        requirement,
        identity,
        enum_name,
        attributes: ColumnAttributes {
            kind,
            size,
            scale,
            precision,
            references,
            cursor_element,
        },
    })
}

fn physical_or_default(attrs: &mut AttributeSet<'_>, name: &str) -> String {
    match attrs.optional("physicalname") {
        Some(physical) => physical.to_string(),
        None => names::default_physical_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: serde_json::Value) -> DefNode {
        serde_json::from_value(value).unwrap()
    }

    fn parse(value: serde_json::Value) -> Result<Schema> {
        parse_schema(&node(value))
    }

    #[test]
    fn parses_a_minimal_table() {
        let schema = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "table",
                "attributes": { "name": "CustomerOrder" },
                "children": [
                    {
                        "element": "column",
                        "attributes": {
                            "name": "Id",
                            "type": "integer",
                            "requirement": "primarykey",
                            "identity": "true"
                        }
                    },
                    {
                        "element": "column",
                        "attributes": { "name": "Notes", "type": "text" }
                    }
                ]
            }]
        }))
        .unwrap();

        let table = &schema.objects.tables["CustomerOrder"];
        assert_eq!(table.physical_name, "CUSTOMER_ORDER");
        assert_eq!(table.entity_name, "CustomerOrder");
        assert_eq!(table.columns.len(), 2);
        assert!(table.columns[0].identity);
        assert_eq!(table.columns[1].requirement, Requirement::Optional);
    }

    #[test]
    fn markers_synthesize_a_primary_constraint() {
        let schema = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "table",
                "attributes": { "name": "OrderLine" },
                "children": [
                    {
                        "element": "column",
                        "attributes": { "name": "OrderId", "type": "integer", "requirement": "primarykey" }
                    },
                    {
                        "element": "column",
                        "attributes": { "name": "LineNo", "type": "integer", "requirement": "primarykey" }
                    }
                ]
            }]
        }))
        .unwrap();

        let table = &schema.objects.tables["OrderLine"];
        let primary = table
            .constraints
            .iter()
            .find(|c| c.is_primary_key())
            .unwrap();
        assert_eq!(primary.name, "ORDER_LINE_PK");
        assert_eq!(primary.columns, vec!["OrderId", "LineNo"]);
    }

    #[test]
    fn explicit_primary_constraint_overwrites_markers() {
        let schema = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "table",
                "attributes": { "name": "Customer" },
                "children": [
                    {
                        "element": "column",
                        "attributes": { "name": "Id", "type": "integer", "requirement": "mandatory" }
                    },
                    {
                        "element": "column",
                        "attributes": { "name": "Code", "type": "text", "requirement": "primarykey" }
                    },
                    {
                        "element": "constraint",
                        "attributes": { "name": "CUSTOMER_PK", "type": "primarykey" },
                        "children": [
                            { "element": "column", "attributes": { "name": "Id" } }
                        ]
                    }
                ]
            }]
        }))
        .unwrap();

        let table = &schema.objects.tables["Customer"];
        assert_eq!(table.columns[0].requirement, Requirement::PrimaryKey);
        assert_eq!(table.columns[1].requirement, Requirement::Mandatory);
        assert_eq!(
            table.constraints.iter().filter(|c| c.is_primary_key()).count(),
            1
        );
    }

    #[test]
    fn two_primary_constraints_fail() {
        let err = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "table",
                "attributes": { "name": "Customer" },
                "children": [
                    { "element": "column", "attributes": { "name": "Id", "type": "integer" } },
                    {
                        "element": "constraint",
                        "attributes": { "name": "PK1", "type": "primarykey" },
                        "children": [{ "element": "column", "attributes": { "name": "Id" } }]
                    },
                    {
                        "element": "constraint",
                        "attributes": { "name": "PK2", "type": "primarykey" },
                        "children": [{ "element": "column", "attributes": { "name": "Id" } }]
                    }
                ]
            }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("more than one primary-key"));
    }

    #[test]
    fn unknown_child_element_names_its_parent() {
        let err = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "table",
                "attributes": { "name": "Customer" },
                "children": [
                    { "element": "colunm", "attributes": { "name": "Id", "type": "integer" } }
                ]
            }]
        }))
        .unwrap_err();
        match err {
            Error::UnknownElement { parent, element } => {
                assert_eq!(parent, "table");
                assert_eq!(element, "colunm");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_attribute_is_fatal() {
        let err = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "table",
                "attributes": { "name": "Customer", "phyiscalname": "CUST" },
                "children": []
            }]
        }))
        .unwrap_err();
        match err {
            Error::UnknownAttribute { element, attribute } => {
                assert_eq!(element, "table");
                assert_eq!(attribute, "phyiscalname");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn refcursor_requires_an_element_type() {
        let err = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "storedprocedure",
                "attributes": { "name": "FetchCustomers", "type": "function" },
                "children": [{
                    "element": "parameter",
                    "attributes": { "name": "Result", "direction": "return", "type": "oracle-refcursor" }
                }]
            }]
        }))
        .unwrap_err();
        match err {
            Error::MissingAttribute { attribute, .. } => {
                assert_eq!(attribute, "refcursor-type");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn enum_codes_run_sequentially_and_respect_overrides() {
        let schema = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "enum",
                "attributes": { "name": "OrderState" },
                "children": [
                    { "element": "value", "attributes": { "title": "Open" } },
                    { "element": "value", "attributes": { "title": "Held", "override": "10" } },
                    { "element": "value", "attributes": { "title": "Closed" } }
                ]
            }]
        }))
        .unwrap();

        let codes: Vec<i32> = schema.objects.enums["OrderState"]
            .values
            .iter()
            .map(|v| v.code)
            .collect();
        assert_eq!(codes, vec![1, 10, 11]);
    }

    #[test]
    fn return_parameter_on_a_procedure_is_dropped() {
        let schema = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "storedprocedure",
                "attributes": { "name": "PruneOrders", "type": "procedure" },
                "children": [
                    {
                        "element": "parameter",
                        "attributes": { "name": "CutOff", "direction": "in", "type": "date" }
                    },
                    {
                        "element": "parameter",
                        "attributes": { "direction": "return", "type": "integer" }
                    }
                ]
            }]
        }))
        .unwrap();

        let procedure = &schema.objects.procedures["PruneOrders"];
        assert_eq!(procedure.parameters.len(), 1);
        assert_eq!(procedure.parameters[0].column.name, "CutOff");
    }

    #[test]
    fn return_parameter_on_a_function_is_kept() {
        let schema = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "storedprocedure",
                "attributes": { "name": "CountOrders", "type": "function" },
                "children": [{
                    "element": "parameter",
                    "attributes": { "name": "Total", "direction": "return", "type": "integer" }
                }]
            }]
        }))
        .unwrap();

        let procedure = &schema.objects.procedures["CountOrders"];
        assert!(procedure.return_parameter().is_some());
    }

    #[test]
    fn anonymous_in_parameters_get_positional_names() {
        let schema = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "storedprocedure",
                "attributes": { "name": "Touch", "type": "procedure" },
                "children": [
                    { "element": "parameter", "attributes": { "type": "integer" } },
                    { "element": "parameter", "attributes": { "type": "text" } }
                ]
            }]
        }))
        .unwrap();

        let names: Vec<&str> = schema.objects.procedures["Touch"]
            .parameters
            .iter()
            .map(|p| p.column.name.as_str())
            .collect();
        assert_eq!(names, vec!["Arg1", "Arg2"]);
    }

    #[test]
    fn anonymous_out_parameters_fail() {
        let err = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "storedprocedure",
                "attributes": { "name": "Touch", "type": "procedure" },
                "children": [
                    { "element": "parameter", "attributes": { "direction": "out", "type": "integer" } }
                ]
            }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("explicit name"));
    }

    #[test]
    fn command_without_sql_fails() {
        let err = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "command",
                "attributes": { "name": "PurgeAll" },
                "children": []
            }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("missing its sql body"));
    }

    #[test]
    fn sql_whitespace_collapses_by_default() {
        let schema = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "command",
                "attributes": { "name": "PurgeAll" },
                "children": [{
                    "element": "sql",
                    "text": "DELETE\n   FROM  ORDERS\n WHERE 1 = 1"
                }]
            }]
        }))
        .unwrap();
        assert_eq!(
            schema.objects.commands["PurgeAll"].sql,
            "DELETE FROM ORDERS WHERE 1 = 1"
        );
    }

    #[test]
    fn sql_newlines_survive_when_asked() {
        let schema = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "command",
                "attributes": { "name": "PurgeAll", "preservenewlinesinsql": "true" },
                "children": [{
                    "element": "sql",
                    "text": "DELETE FROM ORDERS\nWHERE 1 = 1"
                }]
            }]
        }))
        .unwrap();
        assert_eq!(
            schema.objects.commands["PurgeAll"].sql,
            "DELETE FROM ORDERS\nWHERE 1 = 1"
        );
    }

    #[test]
    fn custom_view_needs_exactly_one_entity_binding() {
        let both = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "customview",
                "attributes": {
                    "name": "TopCustomers",
                    "entity": "Customer",
                    "customentity": "TopCustomer"
                },
                "children": [{ "element": "sql", "text": "SELECT 1" }]
            }]
        }))
        .unwrap_err();
        assert!(both.to_string().contains("both entity and customentity"));

        let neither = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "customview",
                "attributes": { "name": "TopCustomers" },
                "children": [{ "element": "sql", "text": "SELECT 1" }]
            }]
        }))
        .unwrap_err();
        assert!(neither.to_string().contains("either entity or customentity"));
    }

    #[test]
    fn synthesized_entity_requires_columns() {
        let err = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "customview",
                "attributes": { "name": "TopCustomers", "customentity": "TopCustomer" },
                "children": [{ "element": "sql", "text": "SELECT 1" }]
            }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("no columns"));
    }

    #[test]
    fn duplicate_object_names_fail() {
        let err = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [
                { "element": "table", "attributes": { "name": "Customer" }, "children": [] },
                { "element": "table", "attributes": { "name": "Customer" }, "children": [] }
            ]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate table 'Customer'"));
    }

    #[test]
    fn half_a_reference_pair_fails() {
        let err = parse(json!({
            "element": "schema",
            "attributes": { "name": "Shop" },
            "children": [{
                "element": "table",
                "attributes": { "name": "OrderLine" },
                "children": [{
                    "element": "column",
                    "attributes": {
                        "name": "OrderId",
                        "type": "integer",
                        "referencedtable": "CustomerOrder"
                    }
                }]
            }]
        }))
        .unwrap_err();
        match err {
            Error::MissingAttribute { attribute, .. } => {
                assert_eq!(attribute, "referencedcolumn");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
