use crate::graph::{ElementGraph, NodeId};
use crate::stream::{Observer, TreeUpdate};
use crate::tree::SolutionTree;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::trace;

/// State shared by every worker of one search invocation.
pub struct SearchContext<'a> {
    graph: &'a ElementGraph,
    started: Instant,
    nodes_explored: AtomicU64,
    observer: Option<&'a dyn Observer>,
}

impl<'a> SearchContext<'a> {
    pub fn new(graph: &'a ElementGraph, observer: Option<&'a dyn Observer>) -> Self {
        Self {
            graph,
            started: Instant::now(),
            nodes_explored: AtomicU64::new(0),
            observer,
        }
    }

    pub fn graph(&self) -> &'a ElementGraph {
        self.graph
    }

    /// Counts one graph-node visit.
    pub fn record_visit(&self) {
        self.nodes_explored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn nodes_explored(&self) -> u64 {
        self.nodes_explored.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Hands a candidate to the observer, if any. Observer failures never reach the search.
    pub fn report(&self, tree: &SolutionTree) {
        let Some(observer) = self.observer else {
            return;
        };
        let update = TreeUpdate::new(tree.clone(), self.elapsed(), self.nodes_explored());
        if let Err(err) = observer.observe(update) {
            trace!(error = %err, "observer rejected update");
        }
    }

    pub fn leaf(&self, id: NodeId) -> SolutionTree {
        let node = self.graph.node(id);
        SolutionTree::leaf(node.name(), node.image_path())
    }

    pub fn combine(&self, id: NodeId, first: SolutionTree, second: SolutionTree) -> SolutionTree {
        let node = self.graph.node(id);
        SolutionTree::combine(node.name(), node.image_path(), first, second)
    }
}

/// Locks a memo, recovering the data if another worker panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
