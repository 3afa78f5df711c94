//! The graph adapter: the abstract interface the inference engine uses to
//! read (and, for resolver-created signals, extend) an external bipartite
//! variable/factor container.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use cortex_core::{SignalGraph, SignalId};
use smallvec::SmallVec;

use crate::error::{ModelError, Result};
use crate::ids::{FactorId, VariableId};

/// A factor's functional form: the mathematical rule it represents. Opaque
/// to this crate; the compute strategy that actually evaluates messages
/// downcasts it back to a concrete type.
#[derive(Clone)]
pub struct FunctionalForm(Arc<dyn Any + Send + Sync>);

impl FunctionalForm {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for FunctionalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionalForm(..)")
    }
}

/// A variable node. Owns its marginal signal and any signals the host
/// application wired in directly (observations, priors).
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub index: Option<usize>,
    pub marginal: SignalId,
    pub external_signals: SmallVec<[SignalId; 2]>,
}

/// A factor node. Owns its functional form and the local marginals a
/// resolver may attach (e.g. joint marginals over a cluster of neighbors).
#[derive(Debug, Clone)]
pub struct Factor {
    pub functional_form: FunctionalForm,
    pub local_marginals: SmallVec<[SignalId; 2]>,
}

/// An edge between a variable and a factor, carrying the two directed
/// message signals.
#[derive(Debug, Clone)]
pub struct Connection {
    pub label: String,
    pub index: usize,
    pub message_to_variable: SignalId,
    pub message_to_factor: SignalId,
}

/// Abstract access to an external bipartite variable/factor container.
///
/// All methods must be total on ids the container actually reports via
/// [`get_variable_ids`](Self::get_variable_ids)/[`get_factor_ids`](Self::get_factor_ids).
/// Implementations that don't support a given operation may leave the
/// default, which reports [`ModelError::UnsupportedEngine`] with the method
/// name: this lets partial/experimental adapters fail at engine
/// construction with a precise diagnostic rather than panicking deep inside
/// a resolver.
pub trait GraphAdapter {
    fn get_variable(&self, id: VariableId) -> Result<&Variable>;
    fn get_factor(&self, id: FactorId) -> Result<&Factor>;
    fn get_connection(&self, var: VariableId, fac: FactorId) -> Result<&Connection>;

    fn get_variable_ids(&self) -> Vec<VariableId>;
    fn get_factor_ids(&self) -> Vec<FactorId>;

    fn get_connected_variable_ids(&self, fac: FactorId) -> Vec<VariableId>;
    fn get_connected_factor_ids(&self, var: VariableId) -> Vec<FactorId>;

    /// Shared access to the underlying signal arena.
    fn signals(&self) -> &SignalGraph;
    /// Mutable access, used by resolvers that create new intermediate
    /// signals (products, joint marginals) during dependency wiring.
    fn signals_mut(&mut self) -> &mut SignalGraph;

    /// Attach a resolver-created signal as an additional local marginal of
    /// `fac` (e.g. a `JointMarginal` over a cluster of its neighbors).
    fn add_local_marginal(&mut self, fac: FactorId, signal: SignalId) -> Result<()> {
        let _ = (fac, signal);
        Err(ModelError::UnsupportedEngine {
            container: std::any::type_name::<Self>().to_string(),
            missing_method: Some("add_local_marginal".to_string()),
        })
    }
}
