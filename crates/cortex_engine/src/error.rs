//! Error types for cortex_engine.

use cortex_model::VariableId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Model(#[from] cortex_model::ModelError),

    #[error(transparent)]
    Core(#[from] cortex_core::CoreError),

    #[error(transparent)]
    Resolver(#[from] cortex_resolver::ResolverError),

    /// A requested target could not be satisfied within `max_rounds` rounds.
    #[error("inference for {targets:?} stalled after {rounds_elapsed} round(s)")]
    StalledInference {
        targets: Vec<VariableId>,
        rounds_elapsed: usize,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
