//! Cortex Model: the bipartite factor-graph container
//!
//! Defines the [`adapter::GraphAdapter`] trait, the one built-in binding
//! [`graph::FactorGraph`], and the `VariableId`/`FactorId` identifier types.
//! Has no notion of belief propagation or any other inference policy: that
//! lives in `cortex_resolver` and `cortex_engine`.

pub mod adapter;
pub mod error;
pub mod graph;
pub mod ids;

pub use adapter::{Connection, Factor, FunctionalForm, GraphAdapter, Variable};
pub use error::{ModelError, Result};
pub use graph::FactorGraph;
pub use ids::{edge_from_metadata, edge_metadata, FactorId, VariableId};
