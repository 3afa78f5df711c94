//! A structured (clustering) resolver for variational schemes that treat a
//! subset of a factor's neighbors jointly rather than fully factorized,
//! using a segment-tree style product accumulator per cluster.

use cortex_core::{AddDependencyOptions, SignalId, SignalVariant};
use cortex_model::{FactorId, GraphAdapter, Variable, VariableId};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::belief_propagation::BeliefPropagationResolver;
use crate::error::Result;
use crate::resolver::DependencyResolver;

/// Groups a factor's neighbors by a caller-supplied key (e.g. variable name
/// prefix) and creates one `ProductOfMessages` intermediate signal per
/// cluster of size > 1, so that a neighbor *outside* the cluster depends on
/// a single aggregate edge instead of one edge per cluster member. A
/// `JointMarginal` signal is attached to the factor's local marginals for
/// every cluster with more than one member.
///
/// Variable-side wiring (marginal <- incoming messages, outgoing message <-
/// other incoming messages) is unchanged from [`BeliefPropagationResolver`];
/// only the factor side clusters.
pub struct StructuredResolver<F> {
    cluster_key: F,
}

impl<F> StructuredResolver<F>
where
    F: Fn(&Variable) -> String,
{
    pub fn new(cluster_key: F) -> Self {
        Self { cluster_key }
    }
}

impl<A, F> DependencyResolver<A> for StructuredResolver<F>
where
    A: GraphAdapter,
    F: Fn(&Variable) -> String,
{
    fn resolve_variable_dependencies(&self, adapter: &mut A, var: VariableId) -> Result<()> {
        BeliefPropagationResolver.resolve_variable_dependencies(adapter, var)
    }

    fn resolve_factor_dependencies(&self, adapter: &mut A, fac: FactorId) -> Result<()> {
        let neighbors = adapter.get_connected_variable_ids(fac);

        // Group neighbors by cluster key, preserving first-seen order.
        let mut cluster_order: Vec<String> = Vec::new();
        let mut clusters: FxHashMap<String, Vec<VariableId>> = FxHashMap::default();
        for &v in &neighbors {
            let key = (self.cluster_key)(adapter.get_variable(v)?);
            if !clusters.contains_key(&key) {
                cluster_order.push(key.clone());
            }
            clusters.entry(key).or_default().push(v);
        }

        // One representative signal per cluster: the lone member's own
        // outgoing message if the cluster is a singleton, or a fresh
        // `ProductOfMessages` intermediate aggregating every member's
        // outgoing message otherwise.
        let mut representative: FxHashMap<String, SignalId> = FxHashMap::default();
        for key in &cluster_order {
            let members = &clusters[key];
            if members.len() == 1 {
                let only = members[0];
                representative.insert(key.clone(), adapter.get_connection(only, fac)?.message_to_factor);
                continue;
            }

            let product = adapter.signals_mut().create_undef();
            adapter
                .signals_mut()
                .set_variant(product, SignalVariant::ProductOfMessages)?;
            for &member in members {
                let msg_to_fac = adapter.get_connection(member, fac)?.message_to_factor;
                adapter.signals_mut().add_dependency(
                    product,
                    msg_to_fac,
                    AddDependencyOptions {
                        intermediate: true,
                        ..Default::default()
                    },
                );
            }

            let joint = adapter.signals_mut().create_undef();
            adapter
                .signals_mut()
                .set_variant(joint, SignalVariant::JointMarginal)?;
            adapter
                .signals_mut()
                .add_dependency(joint, product, AddDependencyOptions::default());
            adapter.add_local_marginal(fac, joint)?;

            representative.insert(key.clone(), product);
        }

        // Wire each member's outgoing message: exact exclude-self product
        // against fellow cluster members (pairwise), plus one dependency per
        // *other* cluster on that cluster's representative signal.
        for key in &cluster_order {
            let members = clusters[key].clone();
            for &v in &members {
                let msg_to_var = adapter.get_connection(v, fac)?.message_to_variable;

                for &other in &members {
                    if other == v {
                        continue;
                    }
                    let msg_to_fac = adapter.get_connection(other, fac)?.message_to_factor;
                    adapter.signals_mut().add_dependency(
                        msg_to_var,
                        msg_to_fac,
                        AddDependencyOptions::default(),
                    );
                }

                for other_key in &cluster_order {
                    if other_key == key {
                        continue;
                    }
                    let rep = representative[other_key];
                    let is_singleton = clusters[other_key].len() == 1;
                    adapter.signals_mut().add_dependency(
                        msg_to_var,
                        rep,
                        AddDependencyOptions {
                            intermediate: !is_singleton,
                            ..Default::default()
                        },
                    );
                }
            }
        }

        trace!(?fac, clusters = cluster_order.len(), "resolved structured factor dependencies");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_model::FactorGraph;
    use cortex_model::FunctionalForm;

    #[test]
    fn cluster_of_two_gets_a_joint_marginal() {
        let mut g = FactorGraph::new();
        let a = g.add_variable("group.a");
        let b = g.add_variable("group.b");
        let c = g.add_variable("other");
        let fac = g.add_factor(FunctionalForm::new(()));
        g.connect(a, fac, "a").unwrap();
        g.connect(b, fac, "b").unwrap();
        g.connect(c, fac, "c").unwrap();

        let resolver = StructuredResolver::new(|v: &Variable| {
            v.name.split('.').next().unwrap_or(&v.name).to_string()
        });
        resolver.resolve_factor_dependencies(&mut g, fac).unwrap();

        assert_eq!(g.get_factor(fac).unwrap().local_marginals.len(), 1);

        let msg_to_c = g.get_connection(c, fac).unwrap().message_to_variable;
        // c depends on the "group" cluster's product signal and nothing per-member.
        assert_eq!(g.signals().get_dependencies(msg_to_c).len(), 1);
    }

    #[test]
    fn singleton_clusters_match_plain_belief_propagation() {
        let mut g = FactorGraph::new();
        let a = g.add_variable("a");
        let b = g.add_variable("b");
        let fac = g.add_factor(FunctionalForm::new(()));
        g.connect(a, fac, "a").unwrap();
        g.connect(b, fac, "b").unwrap();

        let resolver = StructuredResolver::new(|v: &Variable| v.name.clone());
        resolver.resolve_factor_dependencies(&mut g, fac).unwrap();

        assert_eq!(g.get_factor(fac).unwrap().local_marginals.len(), 0);
        let msg_to_a = g.get_connection(a, fac).unwrap().message_to_variable;
        let deps = g.signals().get_dependencies(msg_to_a);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0], g.get_connection(b, fac).unwrap().message_to_factor);
    }
}
