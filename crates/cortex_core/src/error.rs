//! Error types for cortex_core.

use thiserror::Error;

use crate::signal::SignalId;

/// Errors raised by the signal graph.
#[derive(Error, Debug)]
pub enum CoreError {
    /// `compute` was called on a signal that isn't pending and `force` was
    /// not set.
    #[error("signal {0:?} is not pending")]
    NotPending(SignalId),

    /// A typed signal's variant was set twice to different tags.
    #[error("signal {signal:?} expected variant {expected}, got {actual}")]
    VariantMismatch {
        signal: SignalId,
        expected: String,
        actual: String,
    },

    /// [`crate::dual_pending::DualPendingGroup::add_element`] was called
    /// after an `in` bit had already been set.
    #[error("dual-pending group is sealed: an element is already marked in")]
    GroupSealed,

    /// Generic error for cases not covered by a dedicated variant.
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
