//! The inference request scanner.

use cortex_core::SignalId;
use cortex_model::{GraphAdapter, VariableId};
use rustc_hash::FxHashSet;

use crate::error::Result;

/// Tracks one `update_marginals` call across however many rounds it takes.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub targets: Vec<VariableId>,
    pub max_rounds: usize,
    pub rounds_elapsed: usize,
}

impl InferenceRequest {
    pub fn new(targets: Vec<VariableId>, max_rounds: usize) -> Self {
        Self {
            targets,
            max_rounds,
            rounds_elapsed: 0,
        }
    }

    /// True once every target's marginal is computed and non-pending.
    pub fn is_satisfied<A: GraphAdapter>(&self, adapter: &A) -> Result<bool> {
        for &target in &self.targets {
            let marginal = adapter.get_variable(target)?.marginal;
            let signals = adapter.signals();
            if !signals.is_computed(marginal) || signals.is_pending(marginal) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Scan for this round's signals.
    ///
    /// Step 1 seeds from every target marginal via `process_dependencies`
    /// with `retry=true` (crossing intermediate pass-through nodes). Step 2
    /// closes the set under "pending" over direct (non-scanning) edges.
    /// Step 3 orders the result dependencies-before-dependents, breaking
    /// ties by discovery order (which mirrors the order the resolver wired
    /// the graph in).
    pub fn scan_round<A: GraphAdapter>(&self, adapter: &A) -> Result<Vec<SignalId>> {
        let signals = adapter.signals();
        let mut seen: FxHashSet<SignalId> = FxHashSet::default();
        let mut discovery: Vec<SignalId> = Vec::new();

        for &target in &self.targets {
            let marginal = adapter.get_variable(target)?.marginal;

            if signals.is_pending(marginal) && seen.insert(marginal) {
                discovery.push(marginal);
            }

            let mut collect = |dep: SignalId| -> bool {
                let pending = signals.is_pending(dep);
                if pending && seen.insert(dep) {
                    discovery.push(dep);
                }
                pending
            };
            signals.process_dependencies(marginal, &mut collect, true);
        }

        // Step 2: transitive closure over the "pending" relation.
        let mut frontier = discovery.clone();
        while let Some(signal) = frontier.pop() {
            for &dep in signals.get_dependencies(signal) {
                if signals.is_pending(dep) && seen.insert(dep) {
                    discovery.push(dep);
                    frontier.push(dep);
                }
            }
        }

        Ok(topological_order(adapter, &discovery, &seen))
    }
}

/// Order `members` so every signal's in-seed dependencies precede it,
/// preserving `members`'s original relative order as the tie-break. Falls
/// back to appending any signals still blocked by a cycle in their original
/// order (cycles are allowed at the topology level; the freshness bit is
/// what actually halts propagation around one).
fn topological_order<A: GraphAdapter>(
    adapter: &A,
    members: &[SignalId],
    in_seed: &FxHashSet<SignalId>,
) -> Vec<SignalId> {
    let signals = adapter.signals();
    let mut placed: FxHashSet<SignalId> = FxHashSet::default();
    let mut remaining: Vec<SignalId> = members.to_vec();
    let mut ordered: Vec<SignalId> = Vec::with_capacity(members.len());

    while !remaining.is_empty() {
        let mut next_remaining = Vec::new();
        let mut progressed = false;

        for &signal in &remaining {
            let ready = signals
                .get_dependencies(signal)
                .iter()
                .all(|dep| !in_seed.contains(dep) || placed.contains(dep));
            if ready {
                ordered.push(signal);
                placed.insert(signal);
                progressed = true;
            } else {
                next_remaining.push(signal);
            }
        }

        if !progressed {
            ordered.extend(next_remaining);
            break;
        }
        remaining = next_remaining;
    }

    ordered
}
