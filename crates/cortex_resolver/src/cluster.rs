//! [`ClusterReadiness`]: a thin wrapper over [`cortex_core::DualPendingGroup`]
//! for compute strategies that back a [`crate::structured::StructuredResolver`]
//! cluster's `ProductOfMessages` signal. Not used by the resolver's static
//! wiring itself (dependency pending/fresh bits already give that for free);
//! this exists for strategies that want to know, in O(1), which single
//! member is still missing before firing a partial recomputation.

use cortex_core::DualPendingGroup;

/// Tracks arrival of `n` members' messages and reports, per member, whether
/// every *other* member has arrived.
#[derive(Debug, Clone)]
pub struct ClusterReadiness {
    group: DualPendingGroup,
}

impl ClusterReadiness {
    pub fn new(member_count: usize) -> Self {
        Self {
            group: DualPendingGroup::with_len(member_count),
        }
    }

    /// Record that member `index`'s message has arrived (idempotent).
    pub fn mark_arrived(&mut self, index: usize) {
        self.group.set_pending(index);
    }

    /// True once every member except `index` has arrived.
    pub fn all_but_one_ready(&self, index: usize) -> bool {
        self.group.is_pending_out(index)
    }

    pub fn all_arrived(&self) -> bool {
        self.group.is_pending_in_all()
    }
}
