//! Wire messages exchanged with a transport, and a transport-agnostic session that turns
//! request lines into responses.

use crate::error::SearchError;
use crate::graph::ElementGraph;
use crate::search::{SearchMode, SearchOutcome, SearchRequest, Solver};
use crate::stream::UpdateSink;
use crate::tree::SolutionTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_mode() -> String {
    SearchMode::default().as_str().to_string()
}

fn default_max_tree_count() -> i64 {
    1
}

/// A search request as sent by a client: `{target, mode, max_tree_count, delay_ms}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeTreeRequest {
    pub target: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_max_tree_count")]
    pub max_tree_count: i64,
    #[serde(default)]
    pub delay_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_tree: Option<SolutionTree>,
}

impl RecipeTreeRequest {
    pub fn new(target: impl Into<String>, mode: SearchMode, max_tree_count: i64) -> Self {
        Self {
            target: target.into(),
            mode: mode.as_str().to_string(),
            max_tree_count,
            delay_ms: 0,
            partial_tree: None,
        }
    }

    pub fn into_search_request(self) -> Result<SearchRequest, SearchError> {
        let request =
            SearchRequest::parse(&self.target, &self.mode, self.max_tree_count, self.delay_ms)?;
        Ok(match self.partial_tree {
            Some(tree) => request.partial(tree),
            None => request,
        })
    }
}

/// The final message of a search: either the trees found or an error description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Trees {
        trees: Vec<SolutionTree>,
        duration_ms: u64,
        nodes_explored: u64,
    },
    Error {
        error: String,
    },
}

impl SearchResponse {
    pub fn error(message: impl Into<String>) -> Self {
        SearchResponse::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SearchResponse::Error { .. })
    }
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        SearchResponse::Trees {
            trees: outcome.trees,
            duration_ms: u64::try_from(outcome.duration.as_millis()).unwrap_or(u64::MAX),
            nodes_explored: outcome.nodes_explored,
        }
    }
}

impl From<Result<SearchOutcome, SearchError>> for SearchResponse {
    fn from(result: Result<SearchOutcome, SearchError>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(err) => SearchResponse::error(err.to_string()),
        }
    }
}

/// Serves search requests against one graph. Every failure becomes an error response;
/// nothing here panics on bad input.
#[derive(Debug, Clone, Copy)]
pub struct Session<'g> {
    solver: Solver<'g>,
}

impl<'g> Session<'g> {
    pub fn new(graph: &'g ElementGraph) -> Self {
        Self {
            solver: Solver::new(graph),
        }
    }

    /// Runs one request. Live updates go to `sink` when the request asks for pacing.
    pub fn handle(
        &self,
        request: RecipeTreeRequest,
        sink: Option<&mut dyn UpdateSink>,
    ) -> SearchResponse {
        let request = match request.into_search_request() {
            Ok(request) => request,
            Err(err) => return SearchResponse::error(err.to_string()),
        };
        self.solver.solve_paced(&request, sink).into()
    }

    /// Parses a JSON request line and runs it.
    pub fn handle_line(&self, line: &str, sink: Option<&mut dyn UpdateSink>) -> SearchResponse {
        match serde_json::from_str::<RecipeTreeRequest>(line) {
            Ok(request) => self.handle(request, sink),
            Err(err) => {
                debug!(error = %err, "rejected malformed request");
                SearchResponse::error(SearchError::InvalidRequest(err.to_string()).to_string())
            }
        }
    }
}
