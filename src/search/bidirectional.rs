use super::SearchStrategy;
use super::dfs::DepthFirst;
use super::context::SearchContext;
use crate::error::SearchError;
use crate::graph::{ElementGraph, NodeId};
use crate::tree::SolutionTree;
use ahash::AHashSet;
use itertools::Itertools;
use tracing::debug;

/// Bidirectional search: an upper frontier decomposes the target through its recipes
/// while a lower frontier composes upward from the base elements it is made from.
/// When the two meet at the target, concrete trees are materialized with a depth-first
/// sub-search, or by completing a partially built tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bidirectional;

struct Frontier {
    visited: AHashSet<NodeId>,
    fresh: Vec<NodeId>,
}

impl Frontier {
    fn seeded(seeds: Vec<NodeId>) -> Self {
        Self {
            visited: seeds.iter().copied().collect(),
            fresh: seeds,
        }
    }

    fn is_exhausted(&self) -> bool {
        self.fresh.is_empty()
    }

    /// Expands one full level. `next` yields the neighbors of a node on this side.
    fn expand<I>(&mut self, ctx: &SearchContext<'_>, next: impl Fn(NodeId) -> I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut fresh = Vec::new();
        for id in std::mem::take(&mut self.fresh) {
            ctx.record_visit();
            for neighbor in next(id) {
                if self.visited.insert(neighbor) {
                    fresh.push(neighbor);
                }
            }
        }
        self.fresh = fresh;
    }

    fn newly_reached(&self, id: NodeId) -> bool {
        self.fresh.contains(&id)
    }
}

impl Bidirectional {
    /// Finds up to `cap` trees for `target` that extend `partial`.
    ///
    /// `partial` must be rooted at the target and every internal node must be an accepted
    /// recipe. Its non-base leaves are completed with fresh derivations.
    pub fn continue_from(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
        partial: &SolutionTree,
        cap: usize,
    ) -> Result<Vec<SolutionTree>, SearchError> {
        validate_partial(ctx.graph(), target, partial)?;
        self.search(ctx, target, cap, Some(partial))
    }

    fn search(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
        cap: usize,
        partial: Option<&SolutionTree>,
    ) -> Result<Vec<SolutionTree>, SearchError> {
        let graph = ctx.graph();
        if !meet(ctx, target) {
            return Err(SearchError::NoSolution(graph.name(target).to_string()));
        }

        let candidates = match partial {
            Some(partial) => {
                let completed = complete(ctx, partial, cap)?;
                completed.iter().for_each(|tree| ctx.report(tree));
                completed
            }
            None => DepthFirst.find_trees(ctx, target, cap)?,
        };
        let trees: Vec<SolutionTree> = candidates
            .into_iter()
            .unique_by(SolutionTree::canonical_key)
            .take(cap)
            .collect();

        if trees.is_empty() {
            return Err(SearchError::NoSolution(graph.name(target).to_string()));
        }
        Ok(trees)
    }
}

/// Expands both frontiers a level at a time until the lower one reaches the target.
/// Returns false if either side runs out first.
fn meet(ctx: &SearchContext<'_>, target: NodeId) -> bool {
    let graph = ctx.graph();
    let ancestry = graph.node(target).made_from();
    let lower_seeds = if graph.is_base(target) {
        vec![target]
    } else {
        graph.base_ancestors(target)
    };

    let mut upper = Frontier::seeded(vec![target]);
    let mut lower = Frontier::seeded(lower_seeds);
    let mut depth = 0;

    loop {
        let met = (upper.newly_reached(target) && lower.visited.contains(&target))
            || (lower.newly_reached(target) && upper.visited.contains(&target));
        if met {
            debug!(target = graph.name(target), depth, "frontiers met");
            return true;
        }
        if upper.is_exhausted() || lower.is_exhausted() {
            debug!(target = graph.name(target), depth, "frontier exhausted before meeting");
            return false;
        }

        rayon::join(
            || {
                upper.expand(ctx, |id| {
                    graph
                        .node(id)
                        .recipes()
                        .iter()
                        .filter_map(|r| r.ingredients())
                        .flat_map(|(a, b)| [a, b])
                })
            },
            || {
                lower.expand(ctx, |id| {
                    graph
                        .node(id)
                        .uses()
                        .iter()
                        .map(|r| r.target())
                        .filter(|t| *t == target || ancestry.contains(t))
                })
            },
        );
        depth += 1;
    }
}

fn validate_partial(
    graph: &ElementGraph,
    target: NodeId,
    partial: &SolutionTree,
) -> Result<(), SearchError> {
    if partial.name() != graph.name(target) {
        return Err(SearchError::InvalidRequest(format!(
            "partial tree is rooted at '{}', expected '{}'",
            partial.name(),
            graph.name(target)
        )));
    }
    for node in partial.iter() {
        let id = graph.id_of(node.name()).ok_or_else(|| {
            SearchError::InvalidRequest(format!("partial tree names unknown element '{}'", node.name()))
        })?;
        if let Some((first, second)) = node.children() {
            if graph.find_recipe(id, first.name(), second.name()).is_none() {
                return Err(SearchError::InvalidRequest(format!(
                    "partial tree uses '{} + {} => {}', which is not an accepted recipe",
                    first.name(),
                    second.name(),
                    node.name()
                )));
            }
        }
    }
    Ok(())
}

/// Every completion of `tree`, up to `cap`. Base leaves are kept, other leaves are
/// replaced by depth-first derivations.
fn complete(
    ctx: &SearchContext<'_>,
    tree: &SolutionTree,
    cap: usize,
) -> Result<Vec<SolutionTree>, SearchError> {
    let graph = ctx.graph();
    let id = graph
        .id_of(tree.name())
        .ok_or_else(|| SearchError::NotFound(tree.name().to_string()))?;

    let Some((first, second)) = tree.children() else {
        if graph.is_base(id) {
            return Ok(vec![tree.clone()]);
        }
        return DepthFirst.collect_trees(ctx, id, cap, false);
    };

    let (left, right) = rayon::join(
        || complete(ctx, first, cap),
        || complete(ctx, second, cap),
    );
    let (left, right) = (left?, right?);
    Ok(left
        .iter()
        .cartesian_product(right.iter())
        .take(cap)
        .map(|(l, r)| ctx.combine(id, l.clone(), r.clone()))
        .collect())
}

impl SearchStrategy for Bidirectional {
    fn find_trees(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
        cap: usize,
    ) -> Result<Vec<SolutionTree>, SearchError> {
        self.search(ctx, target, cap, None)
    }

    fn best_tree(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
    ) -> Result<SolutionTree, SearchError> {
        if !meet(ctx, target) {
            return Err(SearchError::NoSolution(ctx.graph().name(target).to_string()));
        }
        DepthFirst.best_tree(ctx, target)
    }
}
