//! Common test utilities for building catalogs and graphs.
use tsukuri::prelude::*;

/// The four classic primitives plus a three-element chain.
///
/// `Mud = Water + Earth`, `Lava = Fire + Earth`, `Life = Mud + Lava`
#[allow(dead_code)]
pub fn classic_catalog() -> Catalog {
    Catalog::from_elements(vec![
        ElementDefinition::primitive("Air"),
        ElementDefinition::primitive("Earth"),
        ElementDefinition::primitive("Fire"),
        ElementDefinition::primitive("Water"),
        ElementDefinition::with_recipes("Mud", [("Water", "Earth")]),
        ElementDefinition::with_recipes("Lava", [("Fire", "Earth")]),
        ElementDefinition::with_recipes("Life", [("Mud", "Lava")]),
    ])
}

/// A catalog with alternative recipes, a backward recipe and a self-referential element.
///
/// Tiers: Steam, Dust, Energy, Mud, Lava = 1; Stone, Life = 2; Golem = 3.
/// `Mud = Dust + Water` and `Lava = Energy + Earth` use same-tier ingredients and
/// `Water = Steam + Air` points backwards; all three are dropped during construction.
/// Stone has 3 trees, Life 2 and Golem 9 (3 x 2 + 3 x 1).
#[allow(dead_code)]
pub fn rich_catalog() -> Catalog {
    Catalog::from_elements(vec![
        ElementDefinition::primitive("Air"),
        ElementDefinition::primitive("Earth"),
        ElementDefinition::primitive("Fire"),
        ElementDefinition::with_recipes("Water", [("Steam", "Air")]),
        ElementDefinition::with_recipes("Steam", [("Water", "Fire")]),
        ElementDefinition::with_recipes("Dust", [("Air", "Earth")]),
        ElementDefinition::with_recipes("Energy", [("Fire", "Air")]),
        ElementDefinition::with_recipes("Mud", [("Water", "Earth"), ("Dust", "Water")]),
        ElementDefinition::with_recipes("Lava", [("Fire", "Earth"), ("Energy", "Earth")]),
        ElementDefinition::with_recipes(
            "Stone",
            [("Lava", "Air"), ("Mud", "Fire"), ("Lava", "Water")],
        ),
        ElementDefinition::with_recipes("Life", [("Mud", "Lava"), ("Steam", "Mud")]),
        ElementDefinition::with_recipes("Golem", [("Stone", "Life"), ("Stone", "Mud")]),
        ElementDefinition::with_recipes("Ouroboros", [("Ouroboros", "Fire")]),
    ])
}

/// The classic catalog plus two elements that can only be made from each other.
#[allow(dead_code)]
pub fn unresolvable_catalog() -> Catalog {
    let mut catalog = classic_catalog();
    catalog.elements.push(ElementDefinition::with_recipes("Ghost", [("Phantom", "Air")]));
    catalog.elements.push(ElementDefinition::with_recipes("Phantom", [("Ghost", "Air")]));
    catalog
}

#[allow(dead_code)]
pub fn build(catalog: Catalog) -> ElementGraph {
    ElementGraph::builder(catalog)
        .build()
        .expect("Failed to build element graph")
}

#[allow(dead_code)]
pub fn classic_graph() -> ElementGraph {
    build(classic_catalog())
}

#[allow(dead_code)]
pub fn rich_graph() -> ElementGraph {
    build(rich_catalog())
}

#[allow(dead_code)]
pub fn leaf(name: &str) -> SolutionTree {
    SolutionTree::leaf(name, "")
}

#[allow(dead_code)]
pub fn node(name: &str, first: SolutionTree, second: SolutionTree) -> SolutionTree {
    SolutionTree::combine(name, "", first, second)
}

/// `Life(Mud(Water,Earth),Lava(Fire,Earth))`
#[allow(dead_code)]
pub fn classic_life() -> SolutionTree {
    node(
        "Life",
        node("Mud", leaf("Water"), leaf("Earth")),
        node("Lava", leaf("Fire"), leaf("Earth")),
    )
}

/// Asserts that every tree is a valid derivation in `graph` and that no two are identical.
#[allow(dead_code)]
pub fn assert_valid_and_distinct(graph: &ElementGraph, trees: &[SolutionTree]) {
    for tree in trees {
        if let Err(defect) = graph.verify_tree(tree) {
            panic!("invalid tree {}: {}", tree, defect);
        }
    }
    let keys: std::collections::HashSet<_> = trees.iter().map(|t| t.canonical_key()).collect();
    assert_eq!(keys.len(), trees.len(), "duplicate trees in {:?}", trees);
}
