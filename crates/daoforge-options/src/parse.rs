//! Options documents parsed through the same node machinery as schemas.

use std::path::{Path, PathBuf};

use daoforge_core::{AttributeSet, DefNode, Error, Result};

use crate::filter::{CapabilitySet, Filter, FilterRule, NamePattern, ObjectKind, RuleAction};
use crate::model::{DatabaseKind, GenOptions, StrategyKind, DEFAULT_WORKER_LIMIT};
use crate::overrides::{Overrides, ProcedureOverride, TableOverride};

/// Load and parse an options file. Relative schema paths in the document
/// resolve against the file's own directory.
pub fn load_options(path: &Path) -> Result<GenOptions> {
    let root = DefNode::from_path(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_options(&root, base_dir)
}

/// Parse an `options` document.
pub fn parse_options(root: &DefNode, base_dir: &Path) -> Result<GenOptions> {
    if root.element != "options" {
        return Err(Error::InvalidSchema(format!(
            "expected <options> document root, found <{}>",
            root.element
        )));
    }
    let mut attrs = AttributeSet::new(root);
    let output_base_path = PathBuf::from(attrs.required("output-base-filepath")?);
    let output_package = attrs.required("output-package")?.to_string();
    let database = attrs.parse_required::<DatabaseKind>("database-type")?;
    let database_version = attrs.optional("database-version").map(str::to_string);
    let schema_path = resolve_path(base_dir, attrs.required("schema-filename")?);
    let additional_schema_path = attrs
        .optional("additional-schema-filename")
        .map(|raw| resolve_path(base_dir, raw));
    let bean_style_definitions = attrs.bool_or("bean-style-definitions", false)?;
    let code_strategy = attrs.parse_or("code-strategy", StrategyKind::Manifest)?;
    let worker_limit = attrs.parse_or("worker-limit", DEFAULT_WORKER_LIMIT)?;
    attrs.finish()?;

    if worker_limit == 0 {
        return Err(Error::InvalidAttribute {
            element: root.element.clone(),
            attribute: "worker-limit".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    let mut filters = Vec::new();
    let mut overrides = Overrides::default();
    for child in &root.children {
        match child.element.as_str() {
            "filter" => filters.push(parse_filter(child)?),
            "overrides" => parse_overrides(child, &mut overrides)?,
            _ => return Err(root.unknown_child(child)),
        }
    }

    Ok(GenOptions {
        output_base_path,
        output_package,
        database,
        database_version,
        schema_path,
        additional_schema_path,
        bean_style_definitions,
        code_strategy,
        worker_limit,
        filters,
        overrides,
    })
}

fn resolve_path(base: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn parse_filter(node: &DefNode) -> Result<Filter> {
    let mut attrs = AttributeSet::new(node);
    let kind = attrs.parse_required::<ObjectKind>("type")?;
    attrs.finish()?;

    let mut rules = Vec::new();
    for child in &node.children {
        match child.element.as_str() {
            "rule" => rules.push(parse_rule(child)?),
            _ => return Err(node.unknown_child(child)),
        }
    }
    Ok(Filter { kind, rules })
}

fn parse_rule(node: &DefNode) -> Result<FilterRule> {
    if let Some(child) = node.children.first() {
        return Err(node.unknown_child(child));
    }
    let mut attrs = AttributeSet::new(node);
    let action = attrs.parse_required::<RuleAction>("action")?;
    let raw_pattern = attrs.required("name")?;
    let pattern = NamePattern::new(raw_pattern).map_err(|err| Error::InvalidAttribute {
        element: node.element.clone(),
        attribute: "name".to_string(),
        message: err.to_string(),
    })?;
    let capabilities = attrs.parse_or("capabilities", CapabilitySet::all())?;
    attrs.finish()?;
    Ok(FilterRule {
        action,
        pattern,
        capabilities,
    })
}

fn parse_overrides(node: &DefNode, overrides: &mut Overrides) -> Result<()> {
    AttributeSet::new(node).finish()?;
    for child in &node.children {
        match child.element.as_str() {
            "table" => {
                if let Some(grandchild) = child.children.first() {
                    return Err(child.unknown_child(grandchild));
                }
                let mut attrs = AttributeSet::new(child);
                let patch = TableOverride {
                    name: attrs.required("name")?.to_string(),
                    entity: attrs.optional("entity").map(str::to_string),
                    optimistic_lock_column: attrs
                        .optional("optimisticlockcolumn")
                        .map(str::to_string),
                };
                attrs.finish()?;
                overrides.tables.push(patch);
            }
            "storedprocedure" => {
                if let Some(grandchild) = child.children.first() {
                    return Err(child.unknown_child(grandchild));
                }
                let mut attrs = AttributeSet::new(child);
                let name = attrs.required("name")?.to_string();
                let result_sets = attrs
                    .optional("resultsets")
                    .map(split_name_list)
                    .unwrap_or_default();
                let return_as_out = attrs.bool_or("return-as-out", false)?;
                attrs.finish()?;
                overrides.procedures.push(ProcedureOverride {
                    name,
                    result_sets,
                    return_as_out,
                });
            }
            _ => return Err(node.unknown_child(child)),
        }
    }
    Ok(())
}

fn split_name_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
