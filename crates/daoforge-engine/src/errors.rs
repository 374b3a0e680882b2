use thiserror::Error;

use crate::model::GenerationReport;

/// Errors raised while planning or running a generation pass.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("schema error: {0}")]
    Schema(#[from] daoforge_core::Error),
    /// A synthesized custom entity would shadow a declared one.
    #[error("custom entity '{0}' collides with an existing entity")]
    EntityCollision(String),
    /// A name pulled in by reference matches nothing generable.
    #[error("'{0}' does not resolve to a known relation")]
    UnresolvedReference(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A worker task was cancelled or panicked.
    #[error("worker failed: {0}")]
    Worker(String),
    /// The run failed; the report carries everything gathered before the
    /// failure, including the triggering error text.
    #[error("generation failed")]
    Failed(GenerationReport),
}
