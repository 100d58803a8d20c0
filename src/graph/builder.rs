use super::tiering::{self, TierReport};
use super::{ElementGraph, GraphNode, NodeId, Recipe};
use crate::catalog::Catalog;
use crate::config::{self, Config, DEFAULT_PRIMITIVES};
use crate::error::GraphError;
use ahash::{AHashMap, AHashSet};
use tracing::{debug, info, warn};

/// Builds an `ElementGraph` from a catalog: links recipes, assigns tiers, drops cyclic
/// recipes and derives ancestry.
pub struct GraphBuilder {
    catalog: Catalog,
    primitives: Vec<String>,
    image_base_url: Option<String>,
    strict: bool,
}

impl GraphBuilder {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            primitives: DEFAULT_PRIMITIVES.iter().map(|s| s.to_string()).collect(),
            image_base_url: None,
            strict: false,
        }
    }

    /// Creates a builder with primitives, image host and strictness taken from `config`.
    pub fn from_config(catalog: Catalog, config: &Config) -> Self {
        Self::new(catalog)
            .primitives(config.primitives.iter().cloned())
            .image_base_url(config.image_base_url.clone())
            .strict(config.strict)
    }

    /// Replaces the canonical primitives that are seeded at tier 0.
    pub fn primitives<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primitives = names.into_iter().map(Into::into).collect();
        self
    }

    /// Resolves every image path against `url` while building.
    pub fn image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = Some(url.into());
        self
    }

    /// When set, elements left unresolved by tiering fail the build.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn build(self) -> Result<ElementGraph, GraphError> {
        if self.catalog.is_empty() {
            return Err(GraphError::EmptyCatalog);
        }

        let (mut nodes, index) = self.create_nodes();
        let linked = self.link_recipes(&mut nodes, &index);

        let primitive_ids: Vec<NodeId> = self
            .primitives
            .iter()
            .filter_map(|name| {
                let id = index.get(name.as_str()).copied();
                if id.is_none() {
                    debug!(element = %name, "canonical primitive is not in the catalog");
                }
                id
            })
            .collect();

        let report = tiering::assign_tiers(&mut nodes, &primitive_ids);
        self.check_unresolved(&nodes, &report)?;

        let dropped = tiering::filter_cyclic_recipes(&mut nodes);
        compute_ancestry(&mut nodes);

        let graph = ElementGraph::from_nodes(nodes, index);
        info!(
            elements = graph.len(),
            recipes = linked,
            dropped_recipes = dropped,
            base_elements = graph.base_elements().len(),
            max_tier = graph.max_tier(),
            tier_passes = report.passes,
            "element graph ready"
        );
        Ok(graph)
    }

    /// Step (a): one node per element name.
    fn create_nodes(&self) -> (Vec<GraphNode>, AHashMap<String, NodeId>) {
        let mut nodes = Vec::with_capacity(self.catalog.len());
        let mut index = AHashMap::with_capacity(self.catalog.len());

        for element in self.catalog.iter() {
            if index.contains_key(&element.name) {
                debug!(element = %element.name, "duplicate element definition, merging recipes");
                continue;
            }
            let image_path = match &self.image_base_url {
                Some(base) => config::resolve_image_path(base, &element.image_path),
                None => element.image_path.clone(),
            };
            index.insert(element.name.clone(), nodes.len());
            nodes.push(GraphNode::new(element.name.clone(), image_path));
        }
        (nodes, index)
    }

    /// Step (b): resolve ingredient names and register each recipe on its target and
    /// both ingredients. Returns the number of distinct recipes linked.
    fn link_recipes(&self, nodes: &mut [GraphNode], index: &AHashMap<String, NodeId>) -> usize {
        let mut linked = 0;
        for element in self.catalog.iter() {
            let target = index[&element.name];
            for ingredients in &element.recipes {
                let [first, second] = ingredients.as_slice() else {
                    warn!(
                        element = %element.name,
                        ingredients = ?ingredients,
                        "skipping recipe that does not have exactly two ingredients"
                    );
                    continue;
                };
                let (Some(&first_id), Some(&second_id)) =
                    (index.get(first.as_str()), index.get(second.as_str()))
                else {
                    warn!(
                        element = %element.name,
                        first = %first,
                        second = %second,
                        "skipping recipe with unknown ingredient"
                    );
                    continue;
                };

                let recipe = Recipe::new(first_id, second_id, target);
                if nodes[target].produced_by.contains(&recipe) {
                    continue;
                }
                nodes[target].produced_by.push(recipe);
                nodes[first_id].consumed_by.push(recipe);
                if second_id != first_id {
                    nodes[second_id].consumed_by.push(recipe);
                }
                linked += 1;
            }
        }
        linked
    }

    fn check_unresolved(&self, nodes: &[GraphNode], report: &TierReport) -> Result<(), GraphError> {
        if report.unresolved.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = report
            .unresolved
            .iter()
            .map(|&id| nodes[id].name.clone())
            .collect();
        if self.strict {
            return Err(GraphError::ConstructionDefect { unresolved: names });
        }
        warn!(
            count = names.len(),
            elements = %names.join(", "),
            "tiering left elements unresolved; searches for them will find no solution"
        );
        Ok(())
    }
}

/// Step (f): every node's made-from set is the union of its ingredients and their own
/// made-from sets. Nodes are processed by ascending tier so ingredients are always done.
fn compute_ancestry(nodes: &mut [GraphNode]) {
    let mut order: Vec<NodeId> = (0..nodes.len()).filter(|&id| nodes[id].tier.is_some()).collect();
    order.sort_by_key(|&id| nodes[id].tier);

    for id in order {
        let mut made_from = AHashSet::new();
        for recipe in &nodes[id].produced_by {
            let Some((first, second)) = recipe.ingredients() else {
                continue;
            };
            for ingredient in [first, second] {
                debug_assert!(nodes[ingredient].visited, "ingredient processed out of order");
                made_from.insert(ingredient);
                made_from.extend(nodes[ingredient].made_from.iter().copied());
            }
        }
        let node = &mut nodes[id];
        node.made_from = made_from;
        node.visited = true;
    }
}
