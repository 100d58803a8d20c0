use crate::tree::SolutionTree;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Capacity-bounded sink for finished trees, shared by all workers of a search.
///
/// Offers past capacity are dropped. Producers poll `is_saturated` between candidates,
/// so a few may be built after the cap is reached, but no more than `cap` are ever kept.
/// Admission is counted separately from the channel, so the cap reserves no memory.
pub(crate) struct TreeCollector {
    cap: usize,
    admitted: AtomicUsize,
    sender: Sender<SolutionTree>,
    receiver: Receiver<SolutionTree>,
}

impl TreeCollector {
    pub fn new(cap: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            cap: cap.max(1),
            admitted: AtomicUsize::new(0),
            sender,
            receiver,
        }
    }

    /// Returns false if the tree was dropped because the collector is full.
    pub fn offer(&self, tree: SolutionTree) -> bool {
        let cap = self.cap;
        let admitted = self
            .admitted
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < cap).then_some(n + 1))
            .is_ok();
        admitted && self.sender.try_send(tree).is_ok()
    }

    pub fn is_saturated(&self) -> bool {
        self.admitted.load(Ordering::Acquire) >= self.cap
    }

    /// Drains every collected tree, in arrival order.
    pub fn into_trees(self) -> Vec<SolutionTree> {
        let Self {
            sender, receiver, ..
        } = self;
        drop(sender);
        receiver.try_iter().collect()
    }
}
