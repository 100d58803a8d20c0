//! Name-based views of the graph for introspection endpoints.

use super::{ElementGraph, GraphNode, NodeId, Recipe};
use serde::{Deserialize, Serialize};

/// A recipe expressed with element names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub element_one: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_two: Option<String>,
    pub target_element_name: String,
}

/// A graph node with its recipes expressed by name. Unresolved tiers serialize as -1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub name: String,
    pub image_path: String,
    pub tier: i64,
    pub recipes_to_make_this_element: Vec<RecipeSummary>,
    pub recipes_to_make_other_element: Vec<RecipeSummary>,
}

impl ElementGraph {
    pub fn summarize_recipe(&self, recipe: &Recipe) -> RecipeSummary {
        RecipeSummary {
            element_one: self.name(recipe.first()).to_string(),
            element_two: recipe.second().map(|id| self.name(id).to_string()),
            target_element_name: self.name(recipe.target()).to_string(),
        }
    }

    pub fn summarize_node(&self, id: NodeId) -> NodeSummary {
        let node: &GraphNode = self.node(id);
        NodeSummary {
            name: node.name.clone(),
            image_path: node.image_path.clone(),
            tier: node.tier.map_or(-1, i64::from),
            recipes_to_make_this_element: node
                .produced_by
                .iter()
                .map(|r| self.summarize_recipe(r))
                .collect(),
            recipes_to_make_other_element: node
                .consumed_by
                .iter()
                .map(|r| self.summarize_recipe(r))
                .collect(),
        }
    }

    /// Every node, sorted by name.
    pub fn summaries(&self) -> Vec<NodeSummary> {
        let mut summaries: Vec<NodeSummary> =
            (0..self.len()).map(|id| self.summarize_node(id)).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}
