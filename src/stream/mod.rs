//! Progress reporting for running searches.
//!
//! Searches push candidate snapshots into an [`Observer`]. Observers must be cheap and
//! must never block: a search calls them from every worker thread. The [`Pacer`] is the
//! standard observer for outward delivery. It keeps only the latest update and forwards
//! it to an [`UpdateSink`] once per tick.

use crate::error::StreamError;
use crate::tree::SolutionTree;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

mod pacer;

pub use pacer::Pacer;

/// A live snapshot of a running search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeUpdate {
    pub exploring_tree: SolutionTree,
    pub duration_ms: u64,
    pub nodes_explored: u64,
}

impl TreeUpdate {
    pub fn new(tree: SolutionTree, elapsed: Duration, nodes_explored: u64) -> Self {
        Self {
            exploring_tree: tree,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            nodes_explored,
        }
    }
}

/// Receives candidate trees while a search runs. Called concurrently from search workers.
pub trait Observer: Send + Sync {
    fn observe(&self, update: TreeUpdate) -> Result<(), StreamError>;
}

impl<F> Observer for F
where
    F: Fn(TreeUpdate) -> Result<(), StreamError> + Send + Sync,
{
    fn observe(&self, update: TreeUpdate) -> Result<(), StreamError> {
        self(update)
    }
}

/// The outward end of an update stream, driven by a single delivery thread.
pub trait UpdateSink: Send {
    fn deliver(&mut self, update: &TreeUpdate) -> Result<(), StreamError>;
}

impl<F> UpdateSink for F
where
    F: FnMut(&TreeUpdate) -> Result<(), StreamError> + Send,
{
    fn deliver(&mut self, update: &TreeUpdate) -> Result<(), StreamError> {
        self(update)
    }
}

/// Writes each update as one line of JSON.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> UpdateSink for JsonLinesSink<W> {
    fn deliver(&mut self, update: &TreeUpdate) -> Result<(), StreamError> {
        serde_json::to_writer(&mut self.writer, update)
            .map_err(|e| StreamError::Serialization(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
