use super::{ElementGraph, NodeId};
use ahash::AHashSet;
use std::fmt;

/// Human-readable dump of an element's neighborhood, for debugging catalogs.
///
/// Starting at `root`, each element prints its tier and the recipes that make it, then
/// recurses into the elements it helps make, up to `max_depth` levels. A negative depth
/// means unlimited. Each element is printed once.
pub struct ElementDump<'a> {
    graph: &'a ElementGraph,
    roots: Vec<NodeId>,
    max_depth: i32,
}

impl<'a> ElementDump<'a> {
    /// Dumps a single element. Returns `None` if the name is unknown.
    pub fn element(graph: &'a ElementGraph, name: &str, max_depth: i32) -> Option<Self> {
        let root = graph.id_of(name)?;
        Some(Self {
            graph,
            roots: vec![root],
            max_depth,
        })
    }

    /// Dumps the graph starting from every base element.
    pub fn from_base(graph: &'a ElementGraph, max_depth: i32) -> Self {
        Self {
            graph,
            roots: graph.base_elements().to_vec(),
            max_depth,
        }
    }

    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        depth: i32,
        visited: &mut AHashSet<NodeId>,
    ) -> fmt::Result {
        if (self.max_depth >= 0 && depth > self.max_depth) || !visited.insert(id) {
            return Ok(());
        }
        let node = self.graph.node(id);
        let indent = "  ".repeat(depth as usize);
        writeln!(f, "{}- ({}) {}", indent, format_tier(node.tier), node.name)?;

        if !node.produced_by.is_empty() {
            writeln!(f, "{}  made by ({}):", indent, node.produced_by.len())?;
            for recipe in &node.produced_by {
                if let Some((first, second)) = recipe.ingredients() {
                    writeln!(
                        f,
                        "{}    {}({}) + {}({}) => {}",
                        indent,
                        self.graph.name(first),
                        format_tier(self.graph.node(first).tier),
                        self.graph.name(second),
                        format_tier(self.graph.node(second).tier),
                        node.name
                    )?;
                }
            }
        }

        for recipe in &node.consumed_by {
            if recipe.target() != id {
                self.write_node(f, recipe.target(), depth + 1, visited)?;
            }
        }
        Ok(())
    }
}

fn format_tier(tier: Option<u32>) -> String {
    tier.map_or_else(|| "?".to_string(), |t| t.to_string())
}

impl fmt::Display for ElementDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "======== ELEMENT GRAPH ========")?;
        writeln!(f, "--- BASE ELEMENTS ---")?;
        for declaration in self.graph.primitive_declarations() {
            let node = self.graph.node(declaration.first());
            writeln!(f, "- {} ({})", node.name, node.image_path)?;
        }
        writeln!(f, "\n--- ELEMENTS ---")?;
        let mut visited = AHashSet::new();
        for &root in &self.roots {
            self.write_node(f, root, 0, &mut visited)?;
        }
        writeln!(f, "\n================ END OF GRAPH ================")
    }
}
