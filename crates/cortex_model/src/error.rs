//! Error types for cortex_model.

use thiserror::Error;

use crate::ids::{FactorId, VariableId};

/// Errors raised by a [`crate::adapter::GraphAdapter`] or the built-in
/// [`crate::graph::FactorGraph`] container.
#[derive(Error, Debug)]
pub enum ModelError {
    /// An adapter does not support an operation the engine needs. `container`
    /// names the adapter's type; `missing_method` is set when a single
    /// operation is unimplemented rather than the whole container being
    /// unusable.
    #[error("unsupported graph adapter `{container}`{}", .missing_method.as_ref().map(|m| format!(" (missing `{m}`)")).unwrap_or_default())]
    UnsupportedEngine {
        container: String,
        missing_method: Option<String>,
    },

    #[error("unknown variable id {0:?}")]
    UnknownVariable(VariableId),

    #[error("unknown factor id {0:?}")]
    UnknownFactor(FactorId),

    #[error("no connection between variable {var:?} and factor {fac:?}")]
    MissingConnection { var: VariableId, fac: FactorId },

    #[error(transparent)]
    Core(#[from] cortex_core::CoreError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
