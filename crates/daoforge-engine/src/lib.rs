//! Generation engine: type inference, the inclusion closure, code
//! strategies and the run orchestrator.

pub mod closure;
pub mod engine;
pub mod errors;
pub mod infer;
pub mod model;
pub mod strategy;
pub mod typeinfo;

pub use closure::{Selection, compute_closure, entity_source};
pub use engine::GenerationEngine;
pub use errors::GenerationError;
pub use infer::{TypeCache, TypeKey, resolve_column};
pub use model::{GenerationReport, NameIndex, UnitCounts, WorkUnit};
pub use strategy::{
    CodeStrategy, DaoManifest, DaoTarget, EntityManifest, FieldManifest, ManifestStrategy,
    NullStrategy, ParameterManifest, build_strategy,
};
pub use typeinfo::{ColumnAccess, ColumnTypeInfo, CopyMode, NumericBounds, SqlType};
