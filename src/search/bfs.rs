use super::SearchStrategy;
use super::collector::TreeCollector;
use super::context::{SearchContext, lock};
use crate::error::SearchError;
use crate::graph::{NodeId, Recipe};
use crate::tree::SolutionTree;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// Level offset added to an element pushed back while its ingredients are pending. The
/// worklist pops the lowest level first, so a requeued element waits behind everything
/// queued within this many levels of it.
pub const REQUEUE_PENALTY: u32 = 1000;

type TreeSet = Arc<Vec<SolutionTree>>;
type Resolved = Mutex<AHashMap<NodeId, TreeSet>>;

/// Breadth-first search: one worker per recipe of the target, each resolving its two
/// ingredients through a worklist that defers elements until their ingredients are known.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreadthFirst;

/// Worklist entry. Ordered by level, then by `order`: back pushes count up from zero and
/// front pushes count down from -1, so a front push beats every back push on its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Pending {
    level: u32,
    order: i64,
    id: NodeId,
}

/// Worklist state owned by one worker. The resolved map is shared with every other worker.
struct Worker<'r, 'a> {
    ctx: &'r SearchContext<'a>,
    resolved: &'r Resolved,
    cap: usize,
    queue: BinaryHeap<Reverse<Pending>>,
    queued: AHashSet<NodeId>,
    next_back: i64,
    next_front: i64,
    requeues: AHashMap<NodeId, usize>,
}

impl<'r, 'a> Worker<'r, 'a> {
    fn new(ctx: &'r SearchContext<'a>, resolved: &'r Resolved, cap: usize) -> Self {
        Self {
            ctx,
            resolved,
            cap,
            queue: BinaryHeap::new(),
            queued: AHashSet::new(),
            next_back: 0,
            next_front: -1,
            requeues: AHashMap::new(),
        }
    }

    fn push_back(&mut self, id: NodeId, level: u32) {
        if self.queued.insert(id) {
            let order = self.next_back;
            self.next_back += 1;
            self.queue.push(Reverse(Pending { level, order, id }));
        }
    }

    fn push_front(&mut self, id: NodeId, level: u32) {
        if self.queued.insert(id) {
            let order = self.next_front;
            self.next_front -= 1;
            self.queue.push(Reverse(Pending { level, order, id }));
        }
    }

    /// Resolves `first` and `second` and every element they depend on.
    fn run(&mut self, first: NodeId, second: NodeId) -> Result<(), SearchError> {
        let graph = self.ctx.graph();
        for id in [first, second] {
            self.push_back(id, graph.node(id).tier().unwrap_or(0));
        }

        while let Some(Reverse(Pending { id, level, .. })) = self.queue.pop() {
            self.queued.remove(&id);
            self.ctx.record_visit();
            if lock(self.resolved).contains_key(&id) {
                continue;
            }

            let node = graph.node(id);
            if node.is_base() {
                lock(self.resolved)
                    .entry(id)
                    .or_insert_with(|| Arc::new(vec![self.ctx.leaf(id)]));
                continue;
            }

            let missing: Vec<NodeId> = {
                let resolved = lock(self.resolved);
                node.recipes()
                    .iter()
                    .filter_map(Recipe::ingredients)
                    .flat_map(|(a, b)| [a, b])
                    .filter(|ingredient| !resolved.contains_key(ingredient))
                    .unique()
                    .collect()
            };

            if !missing.is_empty() {
                let count = self.requeues.entry(id).or_default();
                *count += 1;
                if *count > graph.len() {
                    return Err(SearchError::CycleDetected(node.name().to_string()));
                }
                trace!(element = node.name(), level, missing = missing.len(), "requeue");
                for &ingredient in missing.iter().rev() {
                    self.push_front(ingredient, level.saturating_sub(1));
                }
                self.push_back(id, level.saturating_add(REQUEUE_PENALTY));
                continue;
            }

            let trees = self.combine_all(id);
            lock(self.resolved)
                .entry(id)
                .or_insert_with(|| Arc::new(trees));
        }
        Ok(())
    }

    /// Crosses the ingredient lists of every recipe of `id`, up to the cap.
    fn combine_all(&self, id: NodeId) -> Vec<SolutionTree> {
        let node = self.ctx.graph().node(id);
        let pairs: Vec<(TreeSet, TreeSet)> = {
            let resolved = lock(self.resolved);
            node.recipes()
                .iter()
                .filter_map(Recipe::ingredients)
                .filter_map(|(a, b)| Some((resolved.get(&a)?.clone(), resolved.get(&b)?.clone())))
                .collect()
        };
        pairs
            .iter()
            .flat_map(|(left, right)| left.iter().cartesian_product(right.iter()))
            .take(self.cap)
            .map(|(l, r)| self.ctx.combine(id, l.clone(), r.clone()))
            .collect()
    }

    fn trees_for(&self, id: NodeId) -> Option<TreeSet> {
        lock(self.resolved).get(&id).cloned()
    }
}

impl BreadthFirst {
    /// Single-pass derivation: always the first accepted recipe, each element built once.
    /// Cheap, deterministic and not necessarily minimal.
    pub fn first_tree(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
    ) -> Result<SolutionTree, SearchError> {
        let mut built = AHashMap::new();
        let tree = first_derivation(ctx, target, &mut built)?;
        ctx.report(&tree);
        Ok(tree)
    }
}

fn first_derivation(
    ctx: &SearchContext<'_>,
    id: NodeId,
    built: &mut AHashMap<NodeId, SolutionTree>,
) -> Result<SolutionTree, SearchError> {
    if let Some(tree) = built.get(&id) {
        return Ok(tree.clone());
    }
    ctx.record_visit();
    let node = ctx.graph().node(id);
    let tree = if node.is_base() {
        ctx.leaf(id)
    } else {
        let (first, second) = node
            .recipes()
            .iter()
            .find_map(Recipe::ingredients)
            .ok_or_else(|| SearchError::NoSolution(node.name().to_string()))?;
        let left = first_derivation(ctx, first, built)?;
        let right = first_derivation(ctx, second, built)?;
        ctx.combine(id, left, right)
    };
    built.insert(id, tree.clone());
    Ok(tree)
}

impl SearchStrategy for BreadthFirst {
    fn find_trees(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
        cap: usize,
    ) -> Result<Vec<SolutionTree>, SearchError> {
        let node = ctx.graph().node(target);
        ctx.record_visit();
        if node.is_base() {
            let leaf = ctx.leaf(target);
            ctx.report(&leaf);
            return Ok(vec![leaf]);
        }

        let collector = TreeCollector::new(cap);
        let resolved = Resolved::default();
        let failures: Vec<SearchError> = node
            .recipes()
            .par_iter()
            .filter_map(Recipe::ingredients)
            .filter_map(|(first, second)| {
                if collector.is_saturated() {
                    return None;
                }
                let mut worker = Worker::new(ctx, &resolved, cap);
                if let Err(err) = worker.run(first, second) {
                    debug!(target = node.name(), error = %err, "bfs worker failed");
                    return Some(err);
                }
                let (left, right) = (worker.trees_for(first)?, worker.trees_for(second)?);
                for (l, r) in left.iter().cartesian_product(right.iter()) {
                    if collector.is_saturated() {
                        break;
                    }
                    let tree = ctx.combine(target, l.clone(), r.clone());
                    ctx.report(&tree);
                    collector.offer(tree);
                }
                None
            })
            .collect();

        let trees = collector.into_trees();
        debug!(
            target = node.name(),
            found = trees.len(),
            failed_workers = failures.len(),
            "bfs finished"
        );
        if trees.is_empty() {
            return Err(failures
                .into_iter()
                .next()
                .unwrap_or_else(|| SearchError::NoSolution(node.name().to_string())));
        }
        Ok(trees)
    }

    /// Sweeps the target's ancestors level by level in tier order, keeping the smallest
    /// derivation of each element. Elements on one level are computed in parallel.
    fn best_tree(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
    ) -> Result<SolutionTree, SearchError> {
        let graph = ctx.graph();
        let mut members: Vec<NodeId> = graph.node(target).made_from().iter().copied().collect();
        members.push(target);
        members.sort_by_key(|&id| (graph.node(id).tier(), id));

        let mut best: AHashMap<NodeId, SolutionTree> = AHashMap::with_capacity(members.len());
        for (tier, level) in &members.iter().chunk_by(|&&id| graph.node(id).tier()) {
            let level: Vec<NodeId> = level.copied().collect();
            let computed: Vec<(NodeId, SolutionTree)> = level
                .par_iter()
                .filter_map(|&id| {
                    ctx.record_visit();
                    let node = graph.node(id);
                    if node.is_base() {
                        return Some((id, ctx.leaf(id)));
                    }
                    node.recipes()
                        .iter()
                        .filter_map(Recipe::ingredients)
                        .filter_map(|(a, b)| Some((best.get(&a)?, best.get(&b)?)))
                        .min_by_key(|(l, r)| l.node_count() + r.node_count())
                        .map(|(l, r)| (id, ctx.combine(id, l.clone(), r.clone())))
                })
                .collect();
            trace!(?tier, elements = level.len(), solved = computed.len(), "bfs level");
            best.extend(computed);
        }

        let tree = best
            .remove(&target)
            .ok_or_else(|| SearchError::NoSolution(graph.name(target).to_string()))?;
        ctx.report(&tree);
        Ok(tree)
    }
}
