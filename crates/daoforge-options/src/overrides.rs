//! Override patches applied to a parsed schema before generation.

use daoforge_core::{Error, ParamDirection, Result, SchemaObjects};

/// Per-table override.
#[derive(Debug, Clone, Default)]
pub struct TableOverride {
    pub name: String,
    /// Rebind the table onto another relation's entity.
    pub entity: Option<String>,
    /// Declare or replace the optimistic-lock column.
    pub optimistic_lock_column: Option<String>,
}

/// Per-procedure override.
#[derive(Debug, Clone, Default)]
pub struct ProcedureOverride {
    pub name: String,
    /// Relations whose shape the procedure returns as result sets.
    pub result_sets: Vec<String>,
    /// Rewrite the function's return value into an out-parameter binding.
    pub return_as_out: bool,
}

/// All override patches from the options file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tables: Vec<TableOverride>,
    pub procedures: Vec<ProcedureOverride>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.procedures.is_empty()
    }

    /// Patch the schema objects in place.
    ///
    /// An override naming an object the schema does not declare is fatal
    /// rather than silently skipped; a stale override usually means the
    /// schema and options files have drifted apart.
    pub fn apply(&self, objects: &mut SchemaObjects) -> Result<()> {
        for patch in &self.tables {
            let Some(table) = objects.tables.get_mut(&patch.name) else {
                return Err(Error::InvalidSchema(format!(
                    "table override names unknown table '{}'",
                    patch.name
                )));
            };
            if let Some(entity) = &patch.entity {
                table.entity_name = entity.clone();
            }
            if let Some(lock) = &patch.optimistic_lock_column {
                if !table.columns.iter().any(|c| &c.name == lock) {
                    return Err(Error::InvalidSchema(format!(
                        "table override for '{}' names unknown lock column '{lock}'",
                        patch.name
                    )));
                }
                table.optimistic_lock = Some(lock.clone());
            }
        }

        for patch in &self.procedures {
            let Some(procedure) = objects.procedures.get_mut(&patch.name) else {
                return Err(Error::InvalidSchema(format!(
                    "procedure override names unknown stored procedure '{}'",
                    patch.name
                )));
            };
            if !patch.result_sets.is_empty() {
                procedure.result_sets = patch.result_sets.clone();
            }
            if patch.return_as_out {
                let rewritten = procedure
                    .parameters
                    .iter_mut()
                    .find(|p| p.direction == ParamDirection::Return);
                let Some(parameter) = rewritten else {
                    return Err(Error::InvalidSchema(format!(
                        "procedure override for '{}' rebinds a return value the procedure does not declare",
                        patch.name
                    )));
                };
                parameter.direction = ParamDirection::ReturnAsOut;
            }
        }
        Ok(())
    }
}
