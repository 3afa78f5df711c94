//! The dependency-resolver policy interface.

use cortex_model::{FactorId, GraphAdapter, VariableId};

use crate::error::Result;

/// A policy object that wires a model's messages/marginals into a dependency
/// DAG by calling [`cortex_core::SignalGraph::add_dependency`] on signals
/// reachable from `adapter`.
///
/// The engine invokes both methods once per id, over every variable and
/// every factor id the adapter reports, at construction time (when
/// `resolve_dependencies` is enabled).
pub trait DependencyResolver<A: GraphAdapter> {
    fn resolve_variable_dependencies(&self, adapter: &mut A, var: VariableId) -> Result<()>;
    fn resolve_factor_dependencies(&self, adapter: &mut A, fac: FactorId) -> Result<()>;
}
