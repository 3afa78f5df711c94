//! Cortex Core: the reactive signal substrate
//!
//! This crate has no notion of variables, factors, or inference: it is a
//! general-purpose dependency graph of [`signal::SignalGraph`] nodes whose
//! per-dependency state (computed/fresh/weak/intermediate) is bit-packed and
//! whose "pending" predicate decides when a node is due for recomputation.
//!
//! - [`signal`]: the arena, the pending predicate, dependency traversal, and
//!   the compute driver.
//! - [`bits`]: the bit-packed per-dependency flag storage backing the
//!   pending predicate.
//! - [`dual_pending`]: the "all but one arrived" tracker used by resolvers
//!   that build product accumulators.
//! - [`time`]: human-readable duration formatting for the tracer.
//! - [`value`] and [`error`]: the value/variant/metadata types a signal
//!   carries, and this crate's error enum.

pub mod bits;
pub mod dual_pending;
pub mod error;
pub mod signal;
pub mod time;
pub mod value;

pub use dual_pending::DualPendingGroup;
pub use error::{CoreError, Result};
pub use signal::{
    AddDependencyOptions, ComputeOptions, ComputeStrategy, SignalGraph, SignalId, SignalView,
};
pub use time::format_duration;
pub use value::{unknown_variant_label, SignalMetadata, SignalValue, SignalVariant};
