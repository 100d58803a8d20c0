use super::SearchStrategy;
use super::collector::TreeCollector;
use super::context::{SearchContext, lock};
use crate::error::SearchError;
use crate::graph::{NodeId, Recipe};
use crate::tree::SolutionTree;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use rayon::prelude::*;
use std::sync::{Arc, Mutex};
use tracing::debug;

type TreeSet = Arc<Vec<SolutionTree>>;
type Memo = Mutex<AHashMap<NodeId, TreeSet>>;

/// Depth-first search: every accepted recipe of the target is explored by its own rayon
/// task, ingredients are solved recursively and their result sets crossed.
#[derive(Debug, Default, Clone, Copy)]
pub struct DepthFirst;

impl DepthFirst {
    /// Up to `cap` trees for `id`. Results are memoized for the rest of the search.
    fn solve(ctx: &SearchContext<'_>, memo: &Memo, id: NodeId, cap: usize) -> TreeSet {
        ctx.record_visit();
        if let Some(found) = lock(memo).get(&id) {
            return Arc::clone(found);
        }

        let node = ctx.graph().node(id);
        let trees: Vec<SolutionTree> = if node.is_base() {
            vec![ctx.leaf(id)]
        } else {
            node.recipes()
                .par_iter()
                .filter_map(Recipe::ingredients)
                .map(|(first, second)| {
                    let (left, right) = rayon::join(
                        || Self::solve(ctx, memo, first, cap),
                        || Self::solve(ctx, memo, second, cap),
                    );
                    left.iter()
                        .cartesian_product(right.iter())
                        .take(cap)
                        .map(|(l, r)| ctx.combine(id, l.clone(), r.clone()))
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .take(cap)
                .collect()
        };

        Arc::clone(lock(memo).entry(id).or_insert_with(|| Arc::new(trees)))
    }

    /// Up to `cap` trees for `target`. Candidates reach the observer only when `report`
    /// is set; sub-searches for an ingredient of some other target leave it unset.
    pub(super) fn collect_trees(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
        cap: usize,
        report: bool,
    ) -> Result<Vec<SolutionTree>, SearchError> {
        let node = ctx.graph().node(target);
        ctx.record_visit();
        if node.is_base() {
            let leaf = ctx.leaf(target);
            if report {
                ctx.report(&leaf);
            }
            return Ok(vec![leaf]);
        }

        let collector = TreeCollector::new(cap);
        let memo = Memo::default();
        node.recipes()
            .par_iter()
            .filter_map(Recipe::ingredients)
            .for_each(|(first, second)| {
                if collector.is_saturated() {
                    return;
                }
                let (left, right) = rayon::join(
                    || Self::solve(ctx, &memo, first, cap),
                    || Self::solve(ctx, &memo, second, cap),
                );
                for (l, r) in left.iter().cartesian_product(right.iter()) {
                    if collector.is_saturated() {
                        break;
                    }
                    let tree = ctx.combine(target, l.clone(), r.clone());
                    if report {
                        ctx.report(&tree);
                    }
                    collector.offer(tree);
                }
            });

        let trees = collector.into_trees();
        debug!(
            target = node.name(),
            found = trees.len(),
            memoized = lock(&memo).len(),
            "dfs finished"
        );
        if trees.is_empty() {
            return Err(SearchError::NoSolution(node.name().to_string()));
        }
        Ok(trees)
    }
}

impl SearchStrategy for DepthFirst {
    fn find_trees(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
        cap: usize,
    ) -> Result<Vec<SolutionTree>, SearchError> {
        self.collect_trees(ctx, target, cap, true)
    }

    fn best_tree(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
    ) -> Result<SolutionTree, SearchError> {
        let mut search = BestSearch::new(ctx);
        let best = search
            .best(target)?
            .ok_or_else(|| SearchError::NoSolution(ctx.graph().name(target).to_string()))?;
        ctx.report(&best);
        Ok(best)
    }
}

/// Minimum node-count derivation per element, with the current recursion path tracked
/// so a cycle fails instead of recursing forever.
struct BestSearch<'c, 'a> {
    ctx: &'c SearchContext<'a>,
    memo: AHashMap<NodeId, Option<SolutionTree>>,
    path: AHashSet<NodeId>,
}

impl<'c, 'a> BestSearch<'c, 'a> {
    fn new(ctx: &'c SearchContext<'a>) -> Self {
        Self {
            ctx,
            memo: AHashMap::new(),
            path: AHashSet::new(),
        }
    }

    fn best(&mut self, id: NodeId) -> Result<Option<SolutionTree>, SearchError> {
        if let Some(found) = self.memo.get(&id) {
            return Ok(found.clone());
        }
        let graph = self.ctx.graph();
        if !self.path.insert(id) {
            return Err(SearchError::CycleDetected(graph.name(id).to_string()));
        }
        self.ctx.record_visit();

        let node = graph.node(id);
        let best = if node.is_base() {
            Some(self.ctx.leaf(id))
        } else {
            let mut best: Option<SolutionTree> = None;
            for (first, second) in node.recipes().iter().filter_map(Recipe::ingredients) {
                let (Some(left), Some(right)) = (self.best(first)?, self.best(second)?) else {
                    continue;
                };
                let cost = left.node_count() + right.node_count() + 1;
                // Strictly smaller only: ties keep the earlier recipe.
                if best.as_ref().is_none_or(|b| cost < b.node_count()) {
                    best = Some(self.ctx.combine(id, left, right));
                }
            }
            best
        };

        self.path.remove(&id);
        self.memo.insert(id, best.clone());
        Ok(best)
    }
}
