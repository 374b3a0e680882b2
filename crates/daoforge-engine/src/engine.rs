//! The generation orchestrator.
//!
//! A run walks eight steps: apply overrides, filter and close over the
//! object set, flatten the selection into work units, let the strategy
//! prepare, fan the units out over a bounded worker pool, let the
//! strategy finish, write the name index, and hand back the report.
//! When any step fails the report gathered so far travels inside
//! [`GenerationError::Failed`] so diagnostics still reach the caller.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use daoforge_core::{Relation, Schema, SchemaObjects};
use daoforge_options::{FilterEngine, GenOptions};

use crate::closure::{Selection, compute_closure, entity_source};
use crate::errors::GenerationError;
use crate::infer::TypeCache;
use crate::model::{GenerationReport, NameIndex, WorkUnit};
use crate::strategy::{CodeStrategy, DaoTarget};

/// Entry point for a generation run.
pub struct GenerationEngine {
    options: GenOptions,
    strategy: Arc<dyn CodeStrategy>,
}

impl GenerationEngine {
    pub fn new(options: GenOptions, strategy: Arc<dyn CodeStrategy>) -> Self {
        Self { options, strategy }
    }

    /// Run generation over a parsed schema.
    pub async fn run(&self, schema: Schema) -> Result<GenerationReport, GenerationError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut report = GenerationReport::new(
            run_id.clone(),
            schema.name.clone(),
            self.options.code_strategy.to_string(),
        );
        info!(
            run_id = %run_id,
            schema = %schema.name,
            strategy = %self.options.code_strategy,
            workers = self.options.worker_limit,
            "generation started"
        );

        let outcome = self.execute(schema, &mut report).await;
        report.duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                info!(
                    run_id = %run_id,
                    units = report.units.total(),
                    duration_ms = report.duration_ms,
                    "generation completed"
                );
                Ok(report)
            }
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "generation failed");
                report.record_failure(&err.to_string());
                Err(GenerationError::Failed(report))
            }
        }
    }

    async fn execute(
        &self,
        mut schema: Schema,
        report: &mut GenerationReport,
    ) -> Result<(), GenerationError> {
        self.options.overrides.apply(&mut schema.objects)?;

        let mut filters = FilterEngine::new(self.options.filters.clone());
        let selection = compute_closure(&mut schema.objects, &mut filters)?;
        for rule in filters.unused_rules() {
            warn!(rule = %rule, "filter rule never matched");
            report.record_unused_rule(&rule.to_string());
        }

        let units = build_units(&schema.objects, &selection)?;
        for unit in &units {
            report.record_unit(unit);
        }
        info!(
            units = units.len(),
            additional = selection.additional.len(),
            "generation plan ready"
        );

        report.record_feedback(self.strategy.pre_generate(&self.options)?);

        let schema = Arc::new(schema);
        let types = Arc::new(TypeCache::new());
        let semaphore = Arc::new(Semaphore::new(self.options.worker_limit.max(1)));
        let mut workers: JoinSet<Result<Vec<String>, GenerationError>> = JoinSet::new();
        for unit in units {
            let schema = Arc::clone(&schema);
            let types = Arc::clone(&types);
            let semaphore = Arc::clone(&semaphore);
            let strategy = Arc::clone(&self.strategy);
            workers.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|err| GenerationError::Worker(err.to_string()))?;
                run_unit(strategy.as_ref(), &schema, &types, unit)
            });
        }

        // Feedback lands in completion order; the first failure stops
        // the run and cancels the units still in flight.
        let mut failure = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(lines)) => report.record_feedback(lines),
                Ok(Err(err)) => {
                    failure = Some(err);
                    break;
                }
                Err(join_error) => {
                    failure = Some(GenerationError::Worker(join_error.to_string()));
                    break;
                }
            }
        }
        if let Some(err) = failure {
            workers.abort_all();
            return Err(err);
        }

        report.record_feedback(self.strategy.post_generate()?);
        report.types_resolved = types.len() as u64;

        std::fs::create_dir_all(&self.options.output_base_path)?;
        let index = NameIndex::from_objects(&schema.name, &schema.objects);
        let path = self.options.output_base_path.join("name_index.json");
        std::fs::write(&path, serde_json::to_vec_pretty(&index)?)?;
        info!(path = %path.display(), "name index written");

        Ok(())
    }
}

/// Flatten a selection into work units. Relations come first, then
/// pulled-in entities, procedures, custom views and commands; workers
/// are free to reorder execution.
fn build_units(
    objects: &SchemaObjects,
    selection: &Selection,
) -> Result<Vec<WorkUnit>, GenerationError> {
    let mut units = Vec::new();
    for (name, capabilities) in &selection.tables {
        let table = objects
            .tables
            .get(name)
            .ok_or_else(|| GenerationError::UnresolvedReference(name.clone()))?;
        units.push(WorkUnit::Relation {
            name: name.clone(),
            capabilities: *capabilities,
            emit_entity: !table.has_shared_entity(),
        });
    }
    for (name, capabilities) in &selection.views {
        let view = objects
            .views
            .get(name)
            .ok_or_else(|| GenerationError::UnresolvedReference(name.clone()))?;
        units.push(WorkUnit::Relation {
            name: name.clone(),
            capabilities: *capabilities,
            emit_entity: !view.has_shared_entity(),
        });
    }
    for name in &selection.additional {
        units.push(WorkUnit::Entity { name: name.clone() });
    }
    for name in &selection.procedures {
        units.push(WorkUnit::Procedure { name: name.clone() });
    }
    for name in &selection.custom_views {
        units.push(WorkUnit::CustomView { name: name.clone() });
    }
    for name in &selection.commands {
        units.push(WorkUnit::Command { name: name.clone() });
    }
    Ok(units)
}

fn run_unit(
    strategy: &dyn CodeStrategy,
    schema: &Schema,
    types: &TypeCache,
    unit: WorkUnit,
) -> Result<Vec<String>, GenerationError> {
    match unit {
        WorkUnit::Relation {
            name,
            capabilities,
            emit_entity,
        } => {
            let relation = schema
                .objects
                .relation(&name)
                .ok_or_else(|| GenerationError::UnresolvedReference(name.clone()))?;
            let mut lines = Vec::new();
            if emit_entity {
                lines.extend(strategy.generate_entity(relation, schema, types)?);
            }
            lines.extend(strategy.generate_dao(
                DaoTarget::Relation(relation, capabilities),
                schema,
                types,
            )?);
            Ok(lines)
        }
        WorkUnit::Entity { name } => {
            let relation = entity_source(&schema.objects, &name)
                .ok_or_else(|| GenerationError::UnresolvedReference(name.clone()))?;
            strategy.generate_entity(relation, schema, types)
        }
        WorkUnit::Procedure { name } => {
            let procedure = schema
                .objects
                .procedures
                .get(&name)
                .ok_or_else(|| GenerationError::UnresolvedReference(name.clone()))?;
            strategy.generate_dao(DaoTarget::Procedure(procedure), schema, types)
        }
        WorkUnit::CustomView { name } => {
            let view = schema
                .objects
                .custom_views
                .get(&name)
                .ok_or_else(|| GenerationError::UnresolvedReference(name.clone()))?;
            strategy.generate_dao(DaoTarget::CustomView(view), schema, types)
        }
        WorkUnit::Command { name } => {
            let command = schema
                .objects
                .commands
                .get(&name)
                .ok_or_else(|| GenerationError::UnresolvedReference(name.clone()))?;
            strategy.generate_dao(DaoTarget::Command(command), schema, types)
        }
    }
}
