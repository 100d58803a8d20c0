//! # Tsukuri - Recipe Tree Solver for Combination Crafting
//!
//! **Tsukuri** finds the ways an element can be crafted in a combination game, where
//! every element is made by combining two others and everything ultimately comes from a
//! handful of base elements. Given a catalog of elements and their recipes, it builds a
//! tiered recipe graph once and then answers concurrent search requests against it.
//!
//! ## Core Workflow
//!
//! 1.  **Load Your Catalog**: Read a JSON catalog with `Catalog::from_file`, or implement
//!     `IntoCatalog` for your own scraped format.
//! 2.  **Build the Graph**: `ElementGraph::builder` links recipes, assigns every element a
//!     tier, drops recipes that would form cycles and derives ancestry.
//! 3.  **Search**: Pick a `SearchMode` (depth-first, breadth-first or bidirectional) and
//!     ask a `Solver` for up to N distinct recipe trees, or for the smallest one.
//! 4.  **Stream** (optional): Pass an `UpdateSink` and a delay to receive paced snapshots
//!     of the trees being explored while the search runs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tsukuri::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let catalog = Catalog::from_elements(vec![
//!         ElementDefinition::primitive("Air"),
//!         ElementDefinition::primitive("Earth"),
//!         ElementDefinition::primitive("Fire"),
//!         ElementDefinition::primitive("Water"),
//!         ElementDefinition::with_recipes("Mud", [("Water", "Earth")]),
//!         ElementDefinition::with_recipes("Lava", [("Fire", "Earth")]),
//!         ElementDefinition::with_recipes("Life", [("Mud", "Lava")]),
//!     ]);
//!
//!     let graph = ElementGraph::builder(catalog).build()?;
//!     let solver = Solver::new(&graph);
//!
//!     let request = SearchRequest::new("Life", SearchMode::Dfs).max_tree_count(5);
//!     let outcome = solver.solve(&request, None)?;
//!     for tree in &outcome.trees {
//!         // Life(Mud(Water,Earth),Lava(Fire,Earth))
//!         println!("{} ({} nodes)", tree, tree.node_count());
//!     }
//!
//!     // Stream progress as JSON lines while searching.
//!     let mut sink = JsonLinesSink::new(std::io::stdout());
//!     let outcome = generate_recipe_tree(&graph, "Life", "bfs", 3, Some(&mut sink), 50)?;
//!     println!("explored {} nodes", outcome.nodes_explored);
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod protocol;
pub mod search;
pub mod stream;
pub mod tree;
