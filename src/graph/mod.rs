//! The element graph: one node per catalog element, linked by recipes, with tiers that
//! order every accepted recipe strictly upward.

use crate::catalog::Catalog;
use crate::error::TreeDefect;
use crate::tree::SolutionTree;
use ahash::{AHashMap, AHashSet};
use std::hash::{Hash, Hasher};

mod builder;
pub mod summary;
mod tiering;
pub mod visualizer;

pub use builder::GraphBuilder;
pub use summary::{NodeSummary, RecipeSummary};

/// Index of a node inside its `ElementGraph`.
pub type NodeId = usize;

/// A rule producing `target` from two ingredients.
///
/// A recipe without a second ingredient is a primitive declaration: it states that
/// `first` is available from the start. Equality ignores ingredient order.
#[derive(Debug, Clone, Copy)]
pub struct Recipe {
    first: NodeId,
    second: Option<NodeId>,
    target: NodeId,
}

impl Recipe {
    pub(crate) fn new(first: NodeId, second: NodeId, target: NodeId) -> Self {
        Self {
            first,
            second: Some(second),
            target,
        }
    }

    pub(crate) fn primitive(element: NodeId) -> Self {
        Self {
            first: element,
            second: None,
            target: element,
        }
    }

    pub fn first(&self) -> NodeId {
        self.first
    }

    pub fn second(&self) -> Option<NodeId> {
        self.second
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn is_primitive(&self) -> bool {
        self.second.is_none()
    }

    /// Both ingredients, or `None` for a primitive declaration.
    pub fn ingredients(&self) -> Option<(NodeId, NodeId)> {
        self.second.map(|second| (self.first, second))
    }

    /// Whether `element` is one of this recipe's ingredients.
    pub fn uses(&self, element: NodeId) -> bool {
        self.first == element || self.second == Some(element)
    }

    /// Order-insensitive ingredient pair, used for equality and hashing.
    fn unordered(&self) -> (NodeId, Option<NodeId>) {
        match self.second {
            Some(second) if second < self.first => (second, Some(self.first)),
            other => (self.first, other),
        }
    }
}

impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target && self.unordered() == other.unordered()
    }
}

impl Eq for Recipe {}

impl Hash for Recipe {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
        self.unordered().hash(state);
    }
}

/// A single element in the graph. Read-only once the graph is built.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub(crate) name: String,
    pub(crate) image_path: String,
    pub(crate) tier: Option<u32>,
    pub(crate) produced_by: Vec<Recipe>,
    pub(crate) consumed_by: Vec<Recipe>,
    pub(crate) made_from: AHashSet<NodeId>,
    pub(crate) visited: bool,
}

impl GraphNode {
    pub(crate) fn new(name: String, image_path: String) -> Self {
        Self {
            name,
            image_path,
            tier: None,
            produced_by: Vec::new(),
            consumed_by: Vec::new(),
            made_from: AHashSet::new(),
            visited: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    /// The node's tier, or `None` if tiering could not resolve it.
    pub fn tier(&self) -> Option<u32> {
        self.tier
    }

    /// Accepted recipes that produce this element.
    pub fn recipes(&self) -> &[Recipe] {
        &self.produced_by
    }

    /// Accepted recipes that consume this element as an ingredient.
    pub fn uses(&self) -> &[Recipe] {
        &self.consumed_by
    }

    /// Every element this one is transitively made from.
    pub fn made_from(&self) -> &AHashSet<NodeId> {
        &self.made_from
    }

    pub fn is_resolved(&self) -> bool {
        self.tier.is_some()
    }

    pub fn is_base(&self) -> bool {
        self.tier == Some(0)
    }

    /// Whether the ancestry pass reached this node during construction.
    pub fn was_visited(&self) -> bool {
        self.visited
    }
}

/// The immutable recipe graph shared by every search.
#[derive(Debug, Clone)]
pub struct ElementGraph {
    nodes: Vec<GraphNode>,
    index: AHashMap<String, NodeId>,
    base: Vec<NodeId>,
    unresolved: Vec<NodeId>,
    max_tier: u32,
}

impl ElementGraph {
    /// Starts building a graph from a catalog.
    pub fn builder(catalog: Catalog) -> GraphBuilder {
        GraphBuilder::new(catalog)
    }

    pub(crate) fn from_nodes(nodes: Vec<GraphNode>, index: AHashMap<String, NodeId>) -> Self {
        let mut base: Vec<NodeId> = (0..nodes.len()).filter(|&id| nodes[id].is_base()).collect();
        base.sort_by(|a, b| nodes[*a].name.cmp(&nodes[*b].name));
        let unresolved = (0..nodes.len())
            .filter(|&id| !nodes[id].is_resolved())
            .collect();
        let max_tier = nodes.iter().filter_map(|n| n.tier).max().unwrap_or(0);
        Self {
            nodes,
            index,
            base,
            unresolved,
            max_tier,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph.
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id]
    }

    pub fn get(&self, name: &str) -> Option<&GraphNode> {
        self.index.get(name).map(|&id| &self.nodes[id])
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id].name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_base(&self, id: NodeId) -> bool {
        self.nodes[id].is_base()
    }

    /// Base elements, sorted by name.
    pub fn base_elements(&self) -> &[NodeId] {
        &self.base
    }

    /// Elements that tiering could not place. Searches for them end in `NoSolution`.
    pub fn unresolved(&self) -> &[NodeId] {
        &self.unresolved
    }

    pub fn max_tier(&self) -> u32 {
        self.max_tier
    }

    /// One primitive declaration per base element.
    pub fn primitive_declarations(&self) -> Vec<Recipe> {
        self.base.iter().map(|&id| Recipe::primitive(id)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.nodes.iter().enumerate()
    }

    /// Whether `element` appears anywhere in the derivation of `node`.
    pub fn is_made_from(&self, node: &str, element: &str) -> bool {
        match (self.id_of(node), self.id_of(element)) {
            (Some(node), Some(element)) => self.nodes[node].made_from.contains(&element),
            _ => false,
        }
    }

    /// Base elements that `target` is transitively made from, sorted by name.
    pub fn base_ancestors(&self, target: NodeId) -> Vec<NodeId> {
        let made_from = &self.nodes[target].made_from;
        self.base
            .iter()
            .copied()
            .filter(|id| made_from.contains(id))
            .collect()
    }

    /// Finds the accepted recipe making `target` from the two named ingredients.
    pub fn find_recipe(&self, target: NodeId, first: &str, second: &str) -> Option<&Recipe> {
        let first = self.id_of(first)?;
        let second = self.id_of(second)?;
        let probe = Recipe::new(first, second, target);
        self.nodes[target].produced_by.iter().find(|r| **r == probe)
    }

    /// Checks that `tree` is a valid derivation in this graph: every leaf is a base
    /// element and every internal node is an accepted recipe whose ingredients sit on a
    /// strictly lower tier.
    pub fn verify_tree(&self, tree: &SolutionTree) -> Result<(), TreeDefect> {
        let id = self
            .id_of(tree.name())
            .ok_or_else(|| TreeDefect::UnknownElement(tree.name().to_string()))?;

        let Some((first, second)) = tree.children() else {
            return if self.is_base(id) {
                Ok(())
            } else {
                Err(TreeDefect::NonBaseLeaf(tree.name().to_string()))
            };
        };

        if self.find_recipe(id, first.name(), second.name()).is_none() {
            return Err(TreeDefect::UnknownRecipe {
                target: tree.name().to_string(),
                first: first.name().to_string(),
                second: second.name().to_string(),
            });
        }

        let target_tier = self.nodes[id].tier;
        for child in [first, second] {
            let child_tier = self.get(child.name()).and_then(GraphNode::tier);
            let ordered = matches!((child_tier, target_tier), (Some(c), Some(t)) if c < t);
            if !ordered {
                return Err(TreeDefect::TierOrder {
                    target: tree.name().to_string(),
                    target_tier,
                    ingredient: child.name().to_string(),
                    ingredient_tier: child_tier,
                });
            }
        }

        self.verify_tree(first)?;
        self.verify_tree(second)
    }
}
