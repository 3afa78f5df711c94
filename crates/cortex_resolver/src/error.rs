//! Error types for cortex_resolver.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error(transparent)]
    Model(#[from] cortex_model::ModelError),

    #[error(transparent)]
    Core(#[from] cortex_core::CoreError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ResolverError>;
