//! `FactorGraph`: the one built-in [`GraphAdapter`] binding, a plain
//! bipartite container of variables, factors, and the connections between
//! them, backed by an owned [`SignalGraph`].

use cortex_core::{SignalGraph, SignalId, SignalMetadata, SignalValue, SignalVariant};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::adapter::{Connection, Factor, FunctionalForm, GraphAdapter, Variable};
use crate::error::{ModelError, Result};
use crate::ids::{FactorId, VariableId};

/// A bipartite variable/factor graph, owning its own signal arena.
///
/// Built incrementally with [`add_variable`](Self::add_variable),
/// [`add_factor`](Self::add_factor), and [`connect`](Self::connect); once
/// handed to an [`cortex_engine::InferenceEngine`] its topology is expected
/// to stay fixed: mutations should happen outside the span of a request.
#[derive(Default)]
pub struct FactorGraph {
    signals: SignalGraph,
    variables: FxHashMap<VariableId, Variable>,
    factors: FxHashMap<FactorId, Factor>,
    connections: FxHashMap<(VariableId, FactorId), Connection>,
    variable_factors: FxHashMap<VariableId, Vec<FactorId>>,
    factor_variables: FxHashMap<FactorId, Vec<VariableId>>,
    next_variable: u64,
    next_factor: u64,
}

impl FactorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable with an observation-free marginal signal. Returns the
    /// new variable's id.
    pub fn add_variable(&mut self, name: impl Into<String>) -> VariableId {
        self.add_variable_indexed(name, None)
    }

    pub fn add_variable_indexed(&mut self, name: impl Into<String>, index: Option<usize>) -> VariableId {
        let id = VariableId(self.next_variable);
        self.next_variable += 1;

        let marginal = self.signals.create_undef();
        self.variables.insert(
            id,
            Variable {
                name: name.into(),
                index,
                marginal,
                external_signals: SmallVec::new(),
            },
        );
        self.variable_factors.insert(id, Vec::new());
        debug!(?id, "add_variable");
        id
    }

    /// Add a factor with the given functional form. Returns the new factor's
    /// id.
    pub fn add_factor(&mut self, functional_form: FunctionalForm) -> FactorId {
        let id = FactorId(self.next_factor);
        self.next_factor += 1;
        self.factors.insert(
            id,
            Factor {
                functional_form,
                local_marginals: SmallVec::new(),
            },
        );
        self.factor_variables.insert(id, Vec::new());
        debug!(?id, "add_factor");
        id
    }

    /// Register an externally-owned signal (an observation or a prior) as
    /// linked to a variable, so it shows up alongside `var`'s marginal in
    /// diagnostics.
    pub fn link_external_signal(&mut self, var: VariableId, signal: SignalId) -> Result<()> {
        let v = self
            .variables
            .get_mut(&var)
            .ok_or(ModelError::UnknownVariable(var))?;
        v.external_signals.push(signal);
        Ok(())
    }

    /// Wire an edge between `var` and `fac`, creating the two message
    /// signals (both start `Undef`). Errors if either id is unknown or the
    /// edge already exists.
    pub fn connect(
        &mut self,
        var: VariableId,
        fac: FactorId,
        label: impl Into<String>,
    ) -> Result<()> {
        if !self.variables.contains_key(&var) {
            return Err(ModelError::UnknownVariable(var));
        }
        if !self.factors.contains_key(&fac) {
            return Err(ModelError::UnknownFactor(fac));
        }
        if self.connections.contains_key(&(var, fac)) {
            return Err(ModelError::Other(format!(
                "connection {var:?}-{fac:?} already exists"
            )));
        }

        let index = self.connections.len();
        let message_to_variable = self.signals.create(
            SignalValue::Undef,
            SignalVariant::Unspecified,
            SignalMetadata::Undef,
        );
        let message_to_factor = self.signals.create(
            SignalValue::Undef,
            SignalVariant::Unspecified,
            SignalMetadata::Undef,
        );

        self.connections.insert(
            (var, fac),
            Connection {
                label: label.into(),
                index,
                message_to_variable,
                message_to_factor,
            },
        );
        self.variable_factors.entry(var).or_default().push(fac);
        self.factor_variables.entry(fac).or_default().push(var);
        debug!(?var, ?fac, "connect");
        Ok(())
    }
}

impl GraphAdapter for FactorGraph {
    fn get_variable(&self, id: VariableId) -> Result<&Variable> {
        self.variables.get(&id).ok_or(ModelError::UnknownVariable(id))
    }

    fn get_factor(&self, id: FactorId) -> Result<&Factor> {
        self.factors.get(&id).ok_or(ModelError::UnknownFactor(id))
    }

    fn get_connection(&self, var: VariableId, fac: FactorId) -> Result<&Connection> {
        self.connections
            .get(&(var, fac))
            .ok_or(ModelError::MissingConnection { var, fac })
    }

    fn get_variable_ids(&self) -> Vec<VariableId> {
        let mut ids: Vec<VariableId> = self.variables.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn get_factor_ids(&self) -> Vec<FactorId> {
        let mut ids: Vec<FactorId> = self.factors.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn get_connected_variable_ids(&self, fac: FactorId) -> Vec<VariableId> {
        self.factor_variables.get(&fac).cloned().unwrap_or_default()
    }

    fn get_connected_factor_ids(&self, var: VariableId) -> Vec<FactorId> {
        self.variable_factors.get(&var).cloned().unwrap_or_default()
    }

    fn signals(&self) -> &SignalGraph {
        &self.signals
    }

    fn signals_mut(&mut self) -> &mut SignalGraph {
        &mut self.signals
    }

    fn add_local_marginal(&mut self, fac: FactorId, signal: SignalId) -> Result<()> {
        let factor = self.factors.get_mut(&fac).ok_or(ModelError::UnknownFactor(fac))?;
        factor.local_marginals.push(signal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_wires_both_directions() {
        let mut g = FactorGraph::new();
        let v = g.add_variable("p");
        let f = g.add_factor(FunctionalForm::new(()));
        g.connect(v, f, "obs").unwrap();

        assert_eq!(g.get_connected_factor_ids(v), vec![f]);
        assert_eq!(g.get_connected_variable_ids(f), vec![v]);
        assert!(g.get_connection(v, f).is_ok());
    }

    #[test]
    fn unknown_ids_error() {
        let g = FactorGraph::new();
        assert!(matches!(
            g.get_variable(VariableId(42)),
            Err(ModelError::UnknownVariable(_))
        ));
    }

    #[test]
    fn duplicate_connection_rejected() {
        let mut g = FactorGraph::new();
        let v = g.add_variable("p");
        let f = g.add_factor(FunctionalForm::new(()));
        g.connect(v, f, "obs").unwrap();
        assert!(g.connect(v, f, "obs").is_err());
    }
}
