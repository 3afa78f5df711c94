//! The signal graph: an append-only arena of reactive nodes, the pending
//! predicate, dependency traversal, and the compute driver.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::trace;

use crate::bits::{DepFlags, PackedFlags};
use crate::error::{CoreError, Result};
use crate::value::{SignalMetadata, SignalValue, SignalVariant};

new_key_type! {
    /// Arena handle for a signal. Stable for the lifetime of the graph:
    /// the graph is append-only, so handles are never invalidated.
    pub struct SignalId;
}

/// A single bit per listener: whether a `set_value` notification should
/// reach it at all (`opts.listen` at `add_dependency` time).
#[derive(Debug, Clone, Default)]
struct ListenMask {
    words: Vec<u64>,
    len: usize,
}

impl ListenMask {
    fn push(&mut self, listening: bool) {
        let word_index = self.len / 64;
        if word_index >= self.words.len() {
            self.words.push(0);
        }
        let shift = self.len % 64;
        if listening {
            self.words[word_index] |= 1 << shift;
        }
        self.len += 1;
    }

    fn get(&self, index: usize) -> bool {
        let word_index = index / 64;
        let shift = index % 64;
        (self.words[word_index] >> shift) & 1 != 0
    }
}

struct SignalNode {
    value: SignalValue,
    variant: SignalVariant,
    metadata: SignalMetadata,
    is_computed: bool,
    is_pending: bool,
    dependencies: SmallVec<[SignalId; 4]>,
    dependencies_props: PackedFlags,
    listeners: SmallVec<[SignalId; 4]>,
    listen_mask: ListenMask,
}

impl SignalNode {
    fn refresh_pending(&mut self) {
        self.is_pending = self.dependencies_props.all_slots_pending();
    }
}

/// Options controlling how a dependency edge is wired.
#[derive(Debug, Clone, Copy)]
pub struct AddDependencyOptions {
    /// A weak dependency only needs to be computed, not fresh, to satisfy
    /// the pending predicate.
    pub weak: bool,
    /// An intermediate dependency is crossed transparently by
    /// `process_dependencies`.
    pub intermediate: bool,
    /// Whether `set_value` on the dependency should notify this listener.
    pub listen: bool,
    /// Whether to seed `IsComputed`/`IsFresh` from the dependency's current
    /// state, rather than leaving the new slot computed=false.
    pub check_computed: bool,
}

impl Default for AddDependencyOptions {
    fn default() -> Self {
        Self {
            weak: false,
            intermediate: false,
            listen: true,
            check_computed: true,
        }
    }
}

/// Options controlling [`SignalGraph::compute`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputeOptions {
    /// Compute even if the signal isn't pending.
    pub force: bool,
    /// Skip the call entirely if the signal has no listeners.
    pub skip_if_no_listeners: bool,
}

/// A read-only snapshot of a signal, passed to [`ComputeStrategy::apply`].
#[derive(Debug, Clone)]
pub struct SignalView {
    pub id: SignalId,
    pub value: SignalValue,
    pub variant: SignalVariant,
    pub metadata: SignalMetadata,
}

/// A pluggable computation rule: given a pending signal and its current
/// dependency values, produce the signal's new value.
pub trait ComputeStrategy {
    fn apply(&self, signal: &SignalView, dependencies: &[SignalView]) -> SignalValue;
}

impl<F> ComputeStrategy for F
where
    F: Fn(&SignalView, &[SignalView]) -> SignalValue,
{
    fn apply(&self, signal: &SignalView, dependencies: &[SignalView]) -> SignalValue {
        self(signal, dependencies)
    }
}

/// The reactive signal graph.
#[derive(Default)]
pub struct SignalGraph {
    nodes: SlotMap<SignalId, SignalNode>,
}

impl SignalGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a new signal. `is_computed` starts true iff `value` isn't
    /// [`SignalValue::Undef`].
    pub fn create(
        &mut self,
        value: SignalValue,
        variant: SignalVariant,
        metadata: SignalMetadata,
    ) -> SignalId {
        let is_computed = !value.is_undef();
        self.nodes.insert(SignalNode {
            value,
            variant,
            metadata,
            is_computed,
            is_pending: false,
            dependencies: SmallVec::new(),
            dependencies_props: PackedFlags::new(),
            listeners: SmallVec::new(),
            listen_mask: ListenMask::default(),
        })
    }

    pub fn create_undef(&mut self) -> SignalId {
        self.create(SignalValue::Undef, SignalVariant::Unspecified, SignalMetadata::Undef)
    }

    pub fn get_value(&self, id: SignalId) -> SignalValue {
        self.nodes[id].value.clone()
    }

    pub fn is_computed(&self, id: SignalId) -> bool {
        self.nodes[id].is_computed
    }

    pub fn is_pending(&self, id: SignalId) -> bool {
        self.nodes[id].is_pending
    }

    pub fn get_variant(&self, id: SignalId) -> SignalVariant {
        self.nodes[id].variant
    }

    pub fn get_metadata(&self, id: SignalId) -> SignalMetadata {
        self.nodes[id].metadata
    }

    pub fn set_metadata(&mut self, id: SignalId, metadata: SignalMetadata) {
        self.nodes[id].metadata = metadata;
    }

    /// Set the signal's variant. Allowed from `Unspecified`, or idempotently
    /// to the same tag; any other change is a [`CoreError::VariantMismatch`].
    pub fn set_variant(&mut self, id: SignalId, variant: SignalVariant) -> Result<()> {
        let node = &mut self.nodes[id];
        if node.variant == SignalVariant::Unspecified || node.variant == variant {
            node.variant = variant;
            Ok(())
        } else {
            Err(CoreError::VariantMismatch {
                signal: id,
                expected: node.variant.to_string(),
                actual: variant.to_string(),
            })
        }
    }

    pub fn get_dependencies(&self, id: SignalId) -> &[SignalId] {
        &self.nodes[id].dependencies
    }

    pub fn get_listeners(&self, id: SignalId) -> &[SignalId] {
        &self.nodes[id].listeners
    }

    /// Wire `dep` as a dependency of `id`. A self-dependency is a silent
    /// no-op and returns `None`; otherwise returns the new slot's index.
    pub fn add_dependency(
        &mut self,
        id: SignalId,
        dep: SignalId,
        opts: AddDependencyOptions,
    ) -> Option<usize> {
        if dep == id {
            return None;
        }
        let dep_computed = self.nodes[dep].is_computed;

        let mut flags = DepFlags::empty();
        if opts.weak {
            flags |= DepFlags::WEAK;
        }
        if opts.intermediate {
            flags |= DepFlags::INTERMEDIATE;
        }
        if opts.check_computed && dep_computed {
            flags |= DepFlags::COMPUTED | DepFlags::FRESH;
        }

        let index = {
            let node = &mut self.nodes[id];
            node.dependencies.push(dep);
            node.dependencies_props.push(flags)
        };

        {
            let dep_node = &mut self.nodes[dep];
            dep_node.listeners.push(id);
            dep_node.listen_mask.push(opts.listen);
        }

        self.nodes[id].refresh_pending();
        trace!(?id, ?dep, index, "add_dependency");
        Some(index)
    }

    /// Overwrite `id`'s value, mark it computed and non-pending, clear
    /// freshness on its own dependencies (it just consumed them), and
    /// notify listeners.
    pub fn set_value(&mut self, id: SignalId, value: SignalValue) {
        {
            let node = &mut self.nodes[id];
            node.value = value;
            node.is_computed = true;
            node.is_pending = false;
            for i in 0..node.dependencies_props.len() {
                node.dependencies_props.remove(i, DepFlags::FRESH);
            }
        }

        let listeners: SmallVec<[SignalId; 4]> = self.nodes[id].listeners.clone();
        for (k, listener) in listeners.into_iter().enumerate() {
            if !self.nodes[id].listen_mask.get(k) {
                continue;
            }
            // First matching slot only: duplicate dependencies on the same
            // source notify once, not once per slot.
            let slot = self.nodes[listener]
                .dependencies
                .iter()
                .position(|d| *d == id);
            if let Some(slot) = slot {
                self.nodes[listener]
                    .dependencies_props
                    .insert(slot, DepFlags::COMPUTED | DepFlags::FRESH);
                self.nodes[listener].refresh_pending();
            }
        }
        trace!(?id, "set_value");
    }

    /// Snapshot a signal's value/variant/metadata for a compute strategy.
    pub fn view(&self, id: SignalId) -> SignalView {
        let node = &self.nodes[id];
        SignalView {
            id,
            value: node.value.clone(),
            variant: node.variant,
            metadata: node.metadata,
        }
    }

    /// Walk `id`'s dependencies depth-first over intermediate edges,
    /// invoking `callback` on each. When `retry` is set, an intermediate
    /// dependency whose own recursion produced a hit but whose own callback
    /// initially missed gets one more callback attempt after the recursion
    /// completes.
    pub fn process_dependencies<F>(&self, id: SignalId, callback: &mut F, retry: bool) -> bool
    where
        F: FnMut(SignalId) -> bool,
    {
        let deps: SmallVec<[SignalId; 4]> = self.nodes[id].dependencies.clone();
        let mut any = false;

        for (idx, dep) in deps.into_iter().enumerate() {
            let is_intermediate = self.nodes[id]
                .dependencies_props
                .get(idx)
                .contains(DepFlags::INTERMEDIATE);

            let mut recursed_something = false;
            if is_intermediate {
                recursed_something = self.process_dependencies(dep, callback, retry);
                any |= recursed_something;
            }

            let mut result = callback(dep);
            if is_intermediate && retry && recursed_something && !result {
                result = callback(dep);
            }
            any |= result;
        }

        any
    }

    /// Apply `strategy` to a pending signal and write the result back via
    /// `set_value`. Fails with [`CoreError::NotPending`] unless
    /// `opts.force` or `opts.skip_if_no_listeners` (with no listeners)
    /// applies.
    pub fn compute<S: ComputeStrategy>(
        &mut self,
        strategy: &S,
        id: SignalId,
        opts: ComputeOptions,
    ) -> Result<()> {
        if opts.skip_if_no_listeners && self.nodes[id].listeners.is_empty() {
            return Ok(());
        }
        if !opts.force && !self.is_pending(id) {
            return Err(CoreError::NotPending(id));
        }

        let signal_view = self.view(id);
        let dep_views: Vec<SignalView> = self
            .get_dependencies(id)
            .iter()
            .map(|d| self.view(*d))
            .collect();

        let new_value = strategy.apply(&signal_view, &dep_views);
        self.set_value(id, new_value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with_chain() -> (SignalGraph, SignalId, SignalId, SignalId) {
        let mut g = SignalGraph::new();
        let s1 = g.create(SignalValue::F64(1.0), SignalVariant::Unspecified, SignalMetadata::Undef);
        let s2 = g.create_undef();
        let s3 = g.create_undef();
        g.add_dependency(s2, s1, AddDependencyOptions::default());
        g.add_dependency(s3, s2, AddDependencyOptions::default());
        (g, s1, s2, s3)
    }

    #[test]
    fn scenario_chain_of_three() {
        let (mut g, s1, s2, s3) = graph_with_chain();
        assert!(g.is_pending(s2));
        assert!(!g.is_pending(s3));

        let v1 = g.get_value(s1).as_f64().unwrap();
        g.set_value(s2, SignalValue::F64(v1 * 2.0));
        assert!(!g.is_pending(s2));
        assert!(g.is_pending(s3));

        let v2 = g.get_value(s2).as_f64().unwrap();
        g.set_value(s3, SignalValue::F64(v2 + 1.0));
        assert!(!g.is_pending(s2));
        assert!(!g.is_pending(s3));
        assert_eq!(g.get_value(s3).as_f64(), Some(3.0));
    }

    #[test]
    fn self_dependency_is_a_no_op() {
        let mut g = SignalGraph::new();
        let s = g.create_undef();
        assert_eq!(g.add_dependency(s, s, AddDependencyOptions::default()), None);
        assert!(g.get_dependencies(s).is_empty());
    }

    #[test]
    fn zero_dependency_signal_is_never_pending() {
        let mut g = SignalGraph::new();
        let s = g.create_undef();
        assert!(!g.is_pending(s));
    }

    #[test]
    fn weak_dependency_blocks_until_first_computation_never_again() {
        let mut g = SignalGraph::new();
        let weak = g.create(SignalValue::F64(1.0), SignalVariant::Unspecified, SignalMetadata::Undef);
        let strong = g.create(SignalValue::F64(2.0), SignalVariant::Unspecified, SignalMetadata::Undef);
        let derived = g.create_undef();

        g.add_dependency(
            derived,
            weak,
            AddDependencyOptions {
                weak: true,
                ..Default::default()
            },
        );
        g.add_dependency(derived, strong, AddDependencyOptions::default());

        assert!(g.is_pending(derived));

        g.set_value(derived, SignalValue::F64(0.0));
        assert!(!g.is_pending(derived));

        g.set_value(strong, SignalValue::F64(3.0));
        assert!(g.is_pending(derived));

        g.set_value(derived, SignalValue::F64(1.0));
        g.set_value(weak, SignalValue::F64(4.0));
        assert!(!g.is_pending(derived));
    }

    #[test]
    fn intermediate_traversal_with_retry() {
        let mut g = SignalGraph::new();
        let a = g.create_undef();
        let b = g.create_undef();
        let c = g.create_undef();

        g.add_dependency(b, a, AddDependencyOptions::default());
        g.add_dependency(
            c,
            b,
            AddDependencyOptions {
                intermediate: true,
                ..Default::default()
            },
        );

        let mut visits = Vec::new();
        let result = g.process_dependencies(
            c,
            &mut |x| {
                visits.push(x);
                x == a
            },
            true,
        );

        assert!(result);
        assert_eq!(visits.len(), 3);
        assert_eq!(visits[0], a);
        assert_eq!(visits[1], b);
        assert_eq!(visits[2], b);
    }

    #[test]
    fn circular_pair_alternates_stably() {
        let mut g = SignalGraph::new();
        let s1 = g.create_undef();
        let s2 = g.create_undef();
        g.add_dependency(s1, s2, AddDependencyOptions::default());
        g.add_dependency(s2, s1, AddDependencyOptions::default());

        g.set_value(s1, SignalValue::F64(1.0));
        assert!(g.is_pending(s2));
        assert!(!g.is_pending(s1));

        g.set_value(s2, SignalValue::F64(2.0));
        assert!(g.is_pending(s1));
        assert!(!g.is_pending(s2));
    }

    #[test]
    fn variant_can_be_set_once_then_is_immutable() {
        let mut g = SignalGraph::new();
        let s = g.create_undef();
        g.set_variant(s, SignalVariant::IndividualMarginal).unwrap();
        assert!(g.set_variant(s, SignalVariant::IndividualMarginal).is_ok());
        assert!(matches!(
            g.set_variant(s, SignalVariant::JointMarginal),
            Err(CoreError::VariantMismatch { .. })
        ));
    }

    #[test]
    fn compute_requires_pending_unless_forced() {
        let (mut g, _s1, s2, _s3) = graph_with_chain();
        let strategy = |_: &SignalView, deps: &[SignalView]| {
            SignalValue::F64(deps[0].value.as_f64().unwrap() * 2.0)
        };

        g.compute(&strategy, s2, ComputeOptions::default()).unwrap();
        assert!(!g.is_pending(s2));
        assert_eq!(g.get_value(s2).as_f64(), Some(2.0));

        assert!(matches!(
            g.compute(&strategy, s2, ComputeOptions::default()),
            Err(CoreError::NotPending(_))
        ));
        g.compute(&strategy, s2, ComputeOptions { force: true, ..Default::default() })
            .unwrap();
    }

    #[test]
    fn compute_skips_silently_with_no_listeners() {
        let mut g = SignalGraph::new();
        let s = g.create_undef();
        let strategy = |_: &SignalView, _: &[SignalView]| SignalValue::F64(1.0);
        g.compute(
            &strategy,
            s,
            ComputeOptions {
                skip_if_no_listeners: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(g.get_value(s).is_undef());
    }

    #[test]
    fn duplicate_dependencies_only_notify_first_slot() {
        // Documented quirk: a duplicate dependency yields two slots, but
        // `set_value` on the shared dep only updates the first matching
        // slot. The second slot is never independently notified, so a
        // signal with only duplicate deps on one source can never become
        // pending from it: it doesn't crash, but it doesn't converge
        // either.
        let mut g = SignalGraph::new();
        let a = g.create_undef();
        let b = g.create_undef();
        g.add_dependency(b, a, AddDependencyOptions::default());
        g.add_dependency(b, a, AddDependencyOptions::default());
        assert_eq!(g.get_dependencies(b).len(), 2);

        g.set_value(a, SignalValue::F64(1.0));
        assert!(!g.is_pending(b));
    }

    #[test]
    fn listen_false_never_triggers_pending_from_that_dependency() {
        // `a` is wired weak + non-listening: already computed at wire time,
        // so its slot always satisfies the predicate regardless of what
        // happens to `a` afterward. Only `c` (a normal listening dependency)
        // can flip `b`'s pending status.
        let mut g = SignalGraph::new();
        let a = g.create(SignalValue::F64(1.0), SignalVariant::Unspecified, SignalMetadata::Undef);
        let b = g.create_undef();
        let c = g.create_undef();

        g.add_dependency(
            b,
            a,
            AddDependencyOptions {
                weak: true,
                listen: false,
                ..Default::default()
            },
        );
        g.add_dependency(b, c, AddDependencyOptions::default());

        assert!(!g.is_pending(b));

        g.set_value(c, SignalValue::F64(2.0));
        assert!(g.is_pending(b));

        g.set_value(b, SignalValue::F64(0.0));
        assert!(!g.is_pending(b));

        g.set_value(a, SignalValue::F64(99.0));
        assert!(!g.is_pending(b));

        g.set_value(c, SignalValue::F64(3.0));
        assert!(g.is_pending(b));
    }
}
