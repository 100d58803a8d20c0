//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the tsukuri crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use tsukuri::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config = Config::from_env()?;
//! let catalog = Catalog::from_file(&config.catalog_path)?;
//! let graph = GraphBuilder::from_config(catalog, &config).build()?;
//!
//! let best = Solver::new(&graph).best_tree("Life", SearchMode::Bfs)?;
//! println!("Smallest tree: {}", best.trees[0]);
//! # Ok(())
//! # }
//! ```

// Catalog loading
pub use crate::catalog::{Catalog, ElementDefinition, IntoCatalog};
pub use crate::config::Config;

// Graph construction
pub use crate::graph::{ElementGraph, GraphBuilder, GraphNode, NodeId, Recipe};

// Searching
pub use crate::search::{
    SearchMode, SearchOutcome, SearchRequest, SearchStrategy, Solver, generate_recipe_tree,
};
pub use crate::tree::{CanonicalKey, SolutionTree};

// Streaming and wire messages
pub use crate::protocol::{RecipeTreeRequest, SearchResponse, Session};
pub use crate::stream::{JsonLinesSink, Observer, Pacer, TreeUpdate, UpdateSink};

// Error types
pub use crate::error::{CatalogError, ConfigError, GraphError, SearchError, StreamError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
