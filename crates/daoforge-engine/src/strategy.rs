//! Code strategies: the pluggable back half of generation.
//!
//! The engine walks the schema and decides what to generate; a strategy
//! decides what that looks like on disk. Strategies return free-text
//! feedback lines which the engine collects into the run report.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use daoforge_core::{
    Command, CustomView, CustomViewEntity, Relation, RelationKind, Schema, StoredProcedure,
    field_name,
};
use daoforge_options::{CapabilitySet, DatabaseKind, GenOptions, StrategyKind};

use crate::errors::GenerationError;
use crate::infer::TypeCache;
use crate::typeinfo::ColumnTypeInfo;

/// One DAO generation target.
pub enum DaoTarget<'a> {
    Relation(&'a dyn Relation, CapabilitySet),
    Procedure(&'a StoredProcedure),
    CustomView(&'a CustomView),
    Command(&'a Command),
}

impl DaoTarget<'_> {
    /// Name of the object the DAO wraps.
    pub fn name(&self) -> &str {
        match self {
            DaoTarget::Relation(relation, _) => relation.name(),
            DaoTarget::Procedure(procedure) => &procedure.name,
            DaoTarget::CustomView(view) => &view.name,
            DaoTarget::Command(command) => &command.name,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            DaoTarget::Relation(relation, _) => relation_kind_label(relation.kind()),
            DaoTarget::Procedure(_) => "storedprocedure",
            DaoTarget::CustomView(_) => "customview",
            DaoTarget::Command(_) => "command",
        }
    }
}

/// A code strategy renders generation units into output artifacts.
pub trait CodeStrategy: Send + Sync {
    /// Called once before any unit runs.
    fn pre_generate(&self, options: &GenOptions) -> Result<Vec<String>, GenerationError>;

    /// Render the entity for one relation.
    fn generate_entity(
        &self,
        relation: &dyn Relation,
        schema: &Schema,
        types: &TypeCache,
    ) -> Result<Vec<String>, GenerationError>;

    /// Render the DAO for one target.
    fn generate_dao(
        &self,
        target: DaoTarget<'_>,
        schema: &Schema,
        types: &TypeCache,
    ) -> Result<Vec<String>, GenerationError>;

    /// Called once after every unit finished.
    fn post_generate(&self) -> Result<Vec<String>, GenerationError>;
}

/// Instantiate the strategy an options file asked for.
pub fn build_strategy(kind: StrategyKind, options: &GenOptions) -> Arc<dyn CodeStrategy> {
    match kind {
        StrategyKind::Manifest => Arc::new(ManifestStrategy::new(options)),
        StrategyKind::Null => Arc::new(NullStrategy),
    }
}

fn relation_kind_label(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Table => "table",
        RelationKind::View => "view",
        RelationKind::CustomView => "customview",
    }
}

/// One field of an entity manifest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FieldManifest {
    /// Generated field name, snake case.
    pub name: String,
    /// Logical column name as declared.
    pub column: String,
    pub physical: String,
    pub primary_key: bool,
    pub identity: bool,
    /// Database type rendered for the configured dialect.
    pub sql: String,
    #[serde(rename = "type")]
    pub type_info: ColumnTypeInfo,
}

/// Entity description written as `<entity>.entity.json`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntityManifest {
    pub entity: String,
    pub package: String,
    pub database: String,
    /// Physical name of the relation the entity maps to.
    pub relation: String,
    pub kind: String,
    pub bean_style: bool,
    pub fields: Vec<FieldManifest>,
    /// Union of the field imports, sorted and deduplicated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
}

/// One parameter of a DAO manifest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ParameterManifest {
    pub name: String,
    pub column: String,
    pub direction: String,
    #[serde(rename = "type")]
    pub type_info: ColumnTypeInfo,
}

/// DAO description written as `<name>.dao.json`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DaoManifest {
    pub dao: String,
    pub package: String,
    pub database: String,
    pub target_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical: Option<String>,
    /// Entity the DAO reads and writes, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic_lock: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterManifest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub result_sets: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

/// Strategy that writes entity and DAO manifests as pretty JSON under
/// the output path. The manifests carry everything a downstream code
/// emitter needs without re-running inference.
pub struct ManifestStrategy {
    out_dir: PathBuf,
    package: String,
    database: DatabaseKind,
    bean_style: bool,
}

impl ManifestStrategy {
    pub fn new(options: &GenOptions) -> Self {
        Self {
            out_dir: options.output_base_path.clone(),
            package: options.output_package.clone(),
            database: options.database,
            bean_style: options.bean_style_definitions,
        }
    }

    fn write_json<T: Serialize>(&self, file: &str, value: &T) -> Result<PathBuf, GenerationError> {
        let path = self.out_dir.join(file);
        fs::write(&path, serde_json::to_vec_pretty(value)?)?;
        Ok(path)
    }

    fn parameters(
        &self,
        owner: &str,
        parameters: &[daoforge_core::Parameter],
        types: &TypeCache,
    ) -> Vec<ParameterManifest> {
        parameters
            .iter()
            .map(|parameter| ParameterManifest {
                name: field_name(&parameter.column.name),
                column: parameter.column.name.clone(),
                direction: parameter.direction.to_string(),
                type_info: (*types.resolve(owner, &parameter.column)).clone(),
            })
            .collect()
    }
}

impl CodeStrategy for ManifestStrategy {
    fn pre_generate(&self, _options: &GenOptions) -> Result<Vec<String>, GenerationError> {
        fs::create_dir_all(&self.out_dir)?;
        Ok(vec![format!(
            "writing manifests under {}",
            self.out_dir.display()
        )])
    }

    fn generate_entity(
        &self,
        relation: &dyn Relation,
        _schema: &Schema,
        types: &TypeCache,
    ) -> Result<Vec<String>, GenerationError> {
        let mut fields = Vec::with_capacity(relation.columns().len());
        let mut imports = BTreeSet::new();
        for column in relation.columns() {
            let info = types.resolve(relation.name(), column);
            imports.extend(info.imports.iter().cloned());
            fields.push(FieldManifest {
                name: field_name(&column.name),
                column: column.name.clone(),
                physical: column.physical_name.clone(),
                primary_key: column.is_primary_key(),
                identity: column.identity,
                sql: info.sql.render(self.database),
                type_info: (*info).clone(),
            });
        }
        let manifest = EntityManifest {
            entity: relation.entity_name().to_string(),
            package: self.package.clone(),
            database: self.database.to_string(),
            relation: relation.physical_name().to_string(),
            kind: relation_kind_label(relation.kind()).to_string(),
            bean_style: self.bean_style,
            fields,
            imports: imports.into_iter().collect(),
        };
        let path = self.write_json(&format!("{}.entity.json", manifest.entity), &manifest)?;
        Ok(vec![format!("entity {} -> {}", manifest.entity, path.display())])
    }

    fn generate_dao(
        &self,
        target: DaoTarget<'_>,
        schema: &Schema,
        types: &TypeCache,
    ) -> Result<Vec<String>, GenerationError> {
        let name = target.name().to_string();
        let mut manifest = DaoManifest {
            dao: format!("{name}Dao"),
            package: self.package.clone(),
            database: self.database.to_string(),
            target_kind: target.kind_label().to_string(),
            physical: None,
            entity: None,
            capabilities: None,
            key_columns: Vec::new(),
            optimistic_lock: None,
            parameters: Vec::new(),
            result_sets: Vec::new(),
            sql: None,
        };
        match target {
            DaoTarget::Relation(relation, capabilities) => {
                manifest.physical = Some(relation.physical_name().to_string());
                manifest.entity = Some(relation.entity_name().to_string());
                manifest.capabilities = Some(capabilities.to_string());
                manifest.key_columns = relation
                    .primary_constraint()
                    .map(|constraint| constraint.columns.clone())
                    .unwrap_or_default();
                manifest.optimistic_lock =
                    relation.optimistic_lock_column().map(str::to_string);
            }
            DaoTarget::Procedure(procedure) => {
                manifest.physical = Some(procedure.physical_name.clone());
                manifest.parameters =
                    self.parameters(&procedure.name, &procedure.parameters, types);
                manifest.result_sets = procedure.result_sets.clone();
            }
            DaoTarget::CustomView(view) => {
                manifest.entity = Some(match &view.entity {
                    CustomViewEntity::Synthesized(entity) => entity.clone(),
                    CustomViewEntity::Existing(relation) => schema
                        .objects
                        .relation(relation)
                        .map(|found| found.entity_name().to_string())
                        .unwrap_or_else(|| relation.clone()),
                });
                manifest.parameters = self.parameters(&view.name, &view.parameters, types);
                manifest.sql = Some(view.sql.clone());
            }
            DaoTarget::Command(command) => {
                manifest.parameters = self.parameters(&command.name, &command.parameters, types);
                manifest.sql = Some(command.sql.clone());
            }
        }
        let path = self.write_json(&format!("{name}.dao.json"), &manifest)?;
        Ok(vec![format!("dao {} -> {}", manifest.dao, path.display())])
    }

    fn post_generate(&self) -> Result<Vec<String>, GenerationError> {
        Ok(Vec::new())
    }
}

/// Strategy that renders nothing and only reports what it would do.
/// Useful for checking options and schemas without touching disk.
pub struct NullStrategy;

impl CodeStrategy for NullStrategy {
    fn pre_generate(&self, options: &GenOptions) -> Result<Vec<String>, GenerationError> {
        Ok(vec![format!(
            "null strategy selected, nothing will be written under {}",
            options.output_base_path.display()
        )])
    }

    fn generate_entity(
        &self,
        relation: &dyn Relation,
        _schema: &Schema,
        _types: &TypeCache,
    ) -> Result<Vec<String>, GenerationError> {
        Ok(vec![format!("entity {}", relation.entity_name())])
    }

    fn generate_dao(
        &self,
        target: DaoTarget<'_>,
        _schema: &Schema,
        _types: &TypeCache,
    ) -> Result<Vec<String>, GenerationError> {
        Ok(vec![format!("dao {}", target.name())])
    }

    fn post_generate(&self) -> Result<Vec<String>, GenerationError> {
        Ok(Vec::new())
    }
}
