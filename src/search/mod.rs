//! Recipe-tree searches over an [`ElementGraph`].
//!
//! Three interchangeable strategies implement [`SearchStrategy`]: [`DepthFirst`],
//! [`BreadthFirst`] and [`Bidirectional`]. Each finds up to `cap` distinct trees for a
//! target, or the single smallest one. [`Solver`] validates requests, picks the strategy
//! for a [`SearchMode`] and wires in progress reporting.

use crate::error::SearchError;
use crate::graph::{ElementGraph, NodeId};
use crate::stream::{Observer, Pacer, UpdateSink};
use crate::tree::SolutionTree;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

mod bfs;
mod bidirectional;
mod collector;
mod context;
mod dfs;

pub use bfs::{BreadthFirst, REQUEUE_PENALTY};
pub use bidirectional::Bidirectional;
pub use context::SearchContext;
pub use dfs::DepthFirst;

pub(crate) use context::lock;

/// A search algorithm over the element graph.
///
/// Implementations must be safe to share between threads; all per-search state lives in
/// the [`SearchContext`] or on the stack.
pub trait SearchStrategy: Send + Sync {
    /// Up to `cap` distinct trees deriving `target`. Fails with `NoSolution` if none exist.
    fn find_trees(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
        cap: usize,
    ) -> Result<Vec<SolutionTree>, SearchError>;

    /// The tree deriving `target` with the fewest nodes.
    fn best_tree(
        &self,
        ctx: &SearchContext<'_>,
        target: NodeId,
    ) -> Result<SolutionTree, SearchError>;
}

/// The available search strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Recursive descent with parallel recipe branches.
    #[default]
    Dfs,
    /// Per-recipe workers resolving ingredients through a worklist.
    Bfs,
    /// Frontiers from the target and from its base elements.
    Bidirectional,
}

impl SearchMode {
    pub const ALL: [SearchMode; 3] = [SearchMode::Dfs, SearchMode::Bfs, SearchMode::Bidirectional];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Dfs => "dfs",
            SearchMode::Bfs => "bfs",
            SearchMode::Bidirectional => "bidirectional",
        }
    }

    pub fn strategy(self) -> &'static dyn SearchStrategy {
        match self {
            SearchMode::Dfs => &DepthFirst,
            SearchMode::Bfs => &BreadthFirst,
            SearchMode::Bidirectional => &Bidirectional,
        }
    }
}

impl FromStr for SearchMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dfs" => Ok(SearchMode::Dfs),
            "bfs" => Ok(SearchMode::Bfs),
            "bidirectional" => Ok(SearchMode::Bidirectional),
            other => Err(SearchError::InvalidRequest(format!(
                "unknown search mode '{}', expected dfs, bfs or bidirectional",
                other
            ))),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub target: String,
    pub mode: SearchMode,
    pub max_tree_count: usize,
    /// Pacing interval for progress updates. Zero disables updates entirely.
    pub delay: Duration,
    /// A partially built tree to continue from. Bidirectional mode only.
    pub partial: Option<SolutionTree>,
}

impl SearchRequest {
    pub fn new(target: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            target: target.into(),
            mode,
            max_tree_count: 1,
            delay: Duration::ZERO,
            partial: None,
        }
    }

    /// Validates raw request parameters as they arrive over the wire.
    pub fn parse(
        target: &str,
        mode: &str,
        max_tree_count: i64,
        delay_ms: i64,
    ) -> Result<Self, SearchError> {
        let mode = mode.parse()?;
        let max_tree_count = usize::try_from(max_tree_count)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                SearchError::InvalidRequest(format!(
                    "max_tree_count must be positive, got {}",
                    max_tree_count
                ))
            })?;
        let delay_ms = u64::try_from(delay_ms).map_err(|_| {
            SearchError::InvalidRequest(format!("delay_ms must not be negative, got {}", delay_ms))
        })?;
        Ok(Self::new(target, mode)
            .max_tree_count(max_tree_count)
            .delay(Duration::from_millis(delay_ms)))
    }

    pub fn max_tree_count(mut self, count: usize) -> Self {
        self.max_tree_count = count;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn partial(mut self, tree: SolutionTree) -> Self {
        self.partial = Some(tree);
        self
    }
}

/// The result of a successful search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub trees: Vec<SolutionTree>,
    pub duration: Duration,
    pub nodes_explored: u64,
}

/// Runs searches against one graph.
#[derive(Debug, Clone, Copy)]
pub struct Solver<'g> {
    graph: &'g ElementGraph,
}

impl<'g> Solver<'g> {
    pub fn new(graph: &'g ElementGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &'g ElementGraph {
        self.graph
    }

    fn resolve(&self, target: &str) -> Result<NodeId, SearchError> {
        self.graph
            .id_of(target)
            .ok_or_else(|| SearchError::NotFound(target.to_string()))
    }

    /// Runs `request`, reporting candidates to `observer` unless the request's delay is
    /// zero. At most `max_tree_count` trees are returned.
    pub fn solve(
        &self,
        request: &SearchRequest,
        observer: Option<&dyn Observer>,
    ) -> Result<SearchOutcome, SearchError> {
        if request.max_tree_count == 0 {
            return Err(SearchError::InvalidRequest(
                "max_tree_count must be positive".to_string(),
            ));
        }
        if request.partial.is_some() && request.mode != SearchMode::Bidirectional {
            return Err(SearchError::InvalidRequest(format!(
                "partial trees are only supported in bidirectional mode, not {}",
                request.mode
            )));
        }
        let target = self.resolve(&request.target)?;
        let observer = if request.delay.is_zero() { None } else { observer };
        let ctx = SearchContext::new(self.graph, observer);
        let cap = request.max_tree_count;

        debug!(target = %request.target, mode = %request.mode, cap, "search started");
        let result = match &request.partial {
            Some(partial) => Bidirectional.continue_from(&ctx, target, partial, cap),
            None => request.mode.strategy().find_trees(&ctx, target, cap),
        };

        let mut trees = result.inspect_err(|err| {
            info!(target = %request.target, mode = %request.mode, error = %err, "search failed");
        })?;
        trees.truncate(cap);

        let outcome = SearchOutcome {
            trees,
            duration: ctx.elapsed(),
            nodes_explored: ctx.nodes_explored(),
        };
        info!(
            target = %request.target,
            mode = %request.mode,
            trees = outcome.trees.len(),
            duration_ms = outcome.duration.as_millis() as u64,
            nodes_explored = outcome.nodes_explored,
            "search finished"
        );
        Ok(outcome)
    }

    /// Runs `request`, pacing updates to `sink` at the request's delay.
    pub fn solve_paced(
        &self,
        request: &SearchRequest,
        sink: Option<&mut dyn UpdateSink>,
    ) -> Result<SearchOutcome, SearchError> {
        match sink {
            Some(sink) if !request.delay.is_zero() => Pacer::run(request.delay, sink, |pacer| {
                self.solve(request, Some(pacer as &dyn Observer))
            }),
            _ => self.solve(request, None),
        }
    }

    /// The smallest tree deriving `target`, found with the given strategy.
    pub fn best_tree(&self, target: &str, mode: SearchMode) -> Result<SearchOutcome, SearchError> {
        let id = self.resolve(target)?;
        let ctx = SearchContext::new(self.graph, None);
        let tree = mode.strategy().best_tree(&ctx, id)?;
        Ok(SearchOutcome {
            trees: vec![tree],
            duration: ctx.elapsed(),
            nodes_explored: ctx.nodes_explored(),
        })
    }

    /// One quick derivation of `target`, following the first recipe of every element.
    pub fn first_tree(&self, target: &str) -> Result<SolutionTree, SearchError> {
        let id = self.resolve(target)?;
        let ctx = SearchContext::new(self.graph, None);
        BreadthFirst.first_tree(&ctx, id)
    }
}

/// Finds up to `max_tree_count` trees for `target` with the named strategy.
///
/// When `delay_ms` is positive, progress updates are delivered to `on_candidate` at most
/// once per `delay_ms`, latest value wins. All parameter errors are returned as
/// `InvalidRequest` before any traversal happens.
///
/// # Example
///
/// ```rust,no_run
/// use tsukuri::prelude::*;
///
/// # fn run() -> Result<()> {
/// let catalog = Catalog::from_file("data/elements.json")?;
/// let graph = ElementGraph::builder(catalog).build()?;
/// let outcome = generate_recipe_tree(&graph, "Life", "dfs", 5, None, 0)?;
/// for tree in &outcome.trees {
///     println!("{}", tree);
/// }
/// # Ok(())
/// # }
/// ```
pub fn generate_recipe_tree(
    graph: &ElementGraph,
    target: &str,
    mode: &str,
    max_tree_count: i64,
    on_candidate: Option<&mut dyn UpdateSink>,
    delay_ms: i64,
) -> Result<SearchOutcome, SearchError> {
    let request = SearchRequest::parse(target, mode, max_tree_count, delay_ms)?;
    Solver::new(graph).solve_paced(&request, on_candidate)
}
