//! Opaque integer identifiers for variables and factors.
//!
//! Kept as plain `u64` new-types rather than `slotmap` keys: unlike signals,
//! the set of variables/factors in a model is usually known up front and
//! supplied by the caller, so there's no need for generation-tagged handles.

use std::fmt;

/// Identifies a variable node in a bipartite factor graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u64);

/// Identifies a factor node in a bipartite factor graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactorId(pub u64);

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl fmt::Display for FactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

impl From<VariableId> for u64 {
    fn from(id: VariableId) -> u64 {
        id.0
    }
}

impl From<u64> for VariableId {
    fn from(raw: u64) -> Self {
        VariableId(raw)
    }
}

impl From<FactorId> for u64 {
    fn from(id: FactorId) -> u64 {
        id.0
    }
}

impl From<u64> for FactorId {
    fn from(raw: u64) -> Self {
        FactorId(raw)
    }
}

/// The `(variable, factor)` pair carried as a message signal's metadata,
/// convertible to and from [`cortex_core::SignalMetadata::Pair`].
pub fn edge_metadata(var: VariableId, fac: FactorId) -> cortex_core::SignalMetadata {
    cortex_core::SignalMetadata::Pair(var.0, fac.0)
}

/// Recover the `(variable, factor)` pair from a message signal's metadata, if
/// it was built by [`edge_metadata`].
pub fn edge_from_metadata(meta: cortex_core::SignalMetadata) -> Option<(VariableId, FactorId)> {
    meta.as_pair().map(|(v, f)| (VariableId(v), FactorId(f)))
}
