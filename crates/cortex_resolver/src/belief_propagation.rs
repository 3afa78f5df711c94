//! The default (loopy/tree) belief-propagation resolver.

use cortex_core::AddDependencyOptions;
use cortex_model::{FactorId, GraphAdapter, VariableId};
use tracing::trace;

use crate::error::Result;
use crate::resolver::DependencyResolver;

/// Wires the classic sum-product message schedule:
///
/// - A variable's marginal depends on every incoming `message_to_variable`.
/// - Each outgoing `message_to_factor(v, f)` depends on every incoming
///   `message_to_variable(v, f')` for `f' != f` (exclude-self product).
/// - Each outgoing `message_to_variable(v, f)` depends on every incoming
///   `message_to_factor(v', f)` for `v' != v`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeliefPropagationResolver;

impl<A: GraphAdapter> DependencyResolver<A> for BeliefPropagationResolver {
    fn resolve_variable_dependencies(&self, adapter: &mut A, var: VariableId) -> Result<()> {
        let marginal = adapter.get_variable(var)?.marginal;
        let neighbor_factors = adapter.get_connected_factor_ids(var);

        for &fac in &neighbor_factors {
            let msg_to_var = adapter.get_connection(var, fac)?.message_to_variable;
            adapter
                .signals_mut()
                .add_dependency(marginal, msg_to_var, AddDependencyOptions::default());
        }

        for &fac in &neighbor_factors {
            let msg_to_fac = adapter.get_connection(var, fac)?.message_to_factor;
            for &other_fac in &neighbor_factors {
                if other_fac == fac {
                    continue;
                }
                let msg_to_var = adapter.get_connection(var, other_fac)?.message_to_variable;
                adapter.signals_mut().add_dependency(
                    msg_to_fac,
                    msg_to_var,
                    AddDependencyOptions::default(),
                );
            }
        }

        trace!(?var, neighbors = neighbor_factors.len(), "resolved variable dependencies");
        Ok(())
    }

    fn resolve_factor_dependencies(&self, adapter: &mut A, fac: FactorId) -> Result<()> {
        let neighbor_vars = adapter.get_connected_variable_ids(fac);

        for &var in &neighbor_vars {
            let msg_to_var = adapter.get_connection(var, fac)?.message_to_variable;
            for &other_var in &neighbor_vars {
                if other_var == var {
                    continue;
                }
                let msg_to_fac = adapter.get_connection(other_var, fac)?.message_to_factor;
                adapter.signals_mut().add_dependency(
                    msg_to_var,
                    msg_to_fac,
                    AddDependencyOptions::default(),
                );
            }
        }

        trace!(?fac, neighbors = neighbor_vars.len(), "resolved factor dependencies");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_model::{FactorGraph, FunctionalForm};

    #[test]
    fn iid_observation_wiring_leaves_prior_and_likelihood_independent() {
        // p -- likelihood1, p -- likelihood2: message_to_factor(p, l1) should
        // depend on message_to_variable(p, l2) and vice versa, never on itself.
        let mut g = FactorGraph::new();
        let p = g.add_variable("p");
        let l1 = g.add_factor(FunctionalForm::new(()));
        let l2 = g.add_factor(FunctionalForm::new(()));
        g.connect(p, l1, "l1").unwrap();
        g.connect(p, l2, "l2").unwrap();

        let resolver = BeliefPropagationResolver;
        resolver.resolve_variable_dependencies(&mut g, p).unwrap();
        resolver.resolve_factor_dependencies(&mut g, l1).unwrap();
        resolver.resolve_factor_dependencies(&mut g, l2).unwrap();

        let marginal = g.get_variable(p).unwrap().marginal;
        assert_eq!(g.signals().get_dependencies(marginal).len(), 2);

        let msg_to_l1 = g.get_connection(p, l1).unwrap().message_to_factor;
        let deps = g.signals().get_dependencies(msg_to_l1);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0], g.get_connection(p, l2).unwrap().message_to_variable);
    }
}
