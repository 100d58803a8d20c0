//! Search tests covering every strategy and the shared request handling.
mod common;
use common::*;
use pretty_assertions::assert_eq;
use std::thread;
use tsukuri::prelude::*;
use tsukuri::search::{BreadthFirst, REQUEUE_PENALTY, SearchContext};

fn solve(graph: &ElementGraph, target: &str, mode: SearchMode, cap: usize) -> Vec<SolutionTree> {
    let request = SearchRequest::new(target, mode).max_tree_count(cap);
    Solver::new(graph)
        .solve(&request, None)
        .unwrap_or_else(|e| panic!("{} search for {} failed: {}", mode, target, e))
        .trees
}

/// `E1 = Air + Fire` and `E{n} = E{n-1} + Air`, with `E2` also makeable from `E1 + Fire`,
/// so every element past `E1` has exactly two trees.
fn chain_catalog(depth: usize) -> Catalog {
    let mut elements = vec![
        ElementDefinition::primitive("Air"),
        ElementDefinition::primitive("Fire"),
        ElementDefinition::with_recipes("E1", [("Air", "Fire")]),
        ElementDefinition::with_recipes("E2", [("E1", "Air"), ("E1", "Fire")]),
    ];
    for n in 3..=depth {
        let previous = format!("E{}", n - 1);
        elements.push(ElementDefinition::with_recipes(
            format!("E{}", n),
            [(previous.as_str(), "Air")],
        ));
    }
    Catalog::from_elements(elements)
}

#[cfg(test)]
mod strategy_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_target_yields_single_leaf_in_every_mode() {
        let graph = rich_graph();
        for mode in SearchMode::ALL {
            for base in ["Air", "Water", "Ouroboros"] {
                let trees = solve(&graph, base, mode, 5);
                assert_eq!(trees.len(), 1, "{} on {}", mode, base);
                assert_eq!(trees[0], leaf(base));
                assert_eq!(trees[0].node_count(), 1);
            }
        }
    }

    #[test]
    fn test_classic_life_in_every_mode() {
        let graph = classic_graph();
        for mode in SearchMode::ALL {
            let trees = solve(&graph, "Life", mode, 5);
            assert_eq!(trees, vec![classic_life()], "mode {}", mode);
            assert_eq!(trees[0].node_count(), 5);
        }
    }

    #[test]
    fn test_all_trees_found_when_cap_allows() {
        let graph = rich_graph();
        for mode in SearchMode::ALL {
            let stone = solve(&graph, "Stone", mode, 10);
            assert_eq!(stone.len(), 3, "Stone via {}", mode);
            assert_valid_and_distinct(&graph, &stone);

            let golem = solve(&graph, "Golem", mode, 20);
            assert_eq!(golem.len(), 9, "Golem via {}", mode);
            assert_valid_and_distinct(&graph, &golem);
            assert!(golem.iter().all(|t| t.name() == "Golem"));
        }
    }

    #[test]
    fn test_results_never_exceed_cap() {
        let graph = rich_graph();
        for mode in SearchMode::ALL {
            for cap in 1..=9 {
                let trees = solve(&graph, "Golem", mode, cap);
                assert!(trees.len() <= cap, "{} returned {} with cap {}", mode, trees.len(), cap);
                assert!(!trees.is_empty());
                assert_valid_and_distinct(&graph, &trees);
            }
        }
    }

    #[test]
    fn test_cap_of_one_under_concurrent_runs() {
        let graph = rich_graph();
        thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| solve(&graph, "Golem", SearchMode::Dfs, 1).len()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 1);
            }
        });
    }

    #[test]
    fn test_unbounded_cap_returns_every_tree() {
        let graph = rich_graph();
        for mode in SearchMode::ALL {
            let trees = solve(&graph, "Golem", mode, usize::MAX);
            assert_eq!(trees.len(), 9, "Golem via {}", mode);
            assert_valid_and_distinct(&graph, &trees);

            let outcome =
                generate_recipe_tree(&graph, "Golem", &mode.to_string(), i64::MAX, None, 0).unwrap();
            assert_eq!(outcome.trees.len(), 9, "Golem via {}", mode);
        }
        assert_eq!(solve(&graph, "Stone", SearchMode::Bfs, 1 << 40).len(), 3);
    }

    #[test]
    fn test_bfs_requeues_behind_pending_ingredients() {
        let graph = build(chain_catalog(25));
        let request = SearchRequest::new("E25", SearchMode::Bfs).max_tree_count(10);
        let outcome = Solver::new(&graph).solve(&request, None).unwrap();

        assert_eq!(outcome.trees.len(), 2);
        assert_valid_and_distinct(&graph, &outcome.trees);
        let keys = |trees: &[SolutionTree]| {
            let mut keys: Vec<CanonicalKey> = trees.iter().map(SolutionTree::canonical_key).collect();
            keys.sort();
            keys
        };
        assert_eq!(keys(&outcome.trees), keys(&solve(&graph, "E25", SearchMode::Dfs, 10)));
        // Each element is deferred once, then resolved once its ingredient is.
        assert!(
            outcome.nodes_explored <= 3 * graph.len() as u64,
            "explored {} nodes",
            outcome.nodes_explored
        );
        assert!(REQUEUE_PENALTY as usize > graph.len());
    }

    #[test]
    fn test_nodes_explored_is_counted() {
        let graph = classic_graph();
        let request = SearchRequest::new("Life", SearchMode::Bfs).max_tree_count(3);
        let outcome = Solver::new(&graph).solve(&request, None).unwrap();

        assert!(outcome.nodes_explored >= 3);
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_target_is_not_found() {
        let graph = classic_graph();
        for mode in SearchMode::ALL {
            let request = SearchRequest::new("Dragon", mode).max_tree_count(3);
            let err = Solver::new(&graph).solve(&request, None).unwrap_err();
            assert_eq!(err, SearchError::NotFound("Dragon".to_string()));
        }
    }

    #[test]
    fn test_unresolved_target_has_no_solution() {
        let graph = build(unresolvable_catalog());
        for mode in SearchMode::ALL {
            let request = SearchRequest::new("Ghost", mode).max_tree_count(3);
            let err = Solver::new(&graph).solve(&request, None).unwrap_err();
            assert_eq!(err, SearchError::NoSolution("Ghost".to_string()), "mode {}", mode);
        }
        // The rest of the graph still works.
        assert_eq!(solve(&graph, "Life", SearchMode::Dfs, 1), vec![classic_life()]);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let graph = classic_graph();

        let zero = SearchRequest::new("Life", SearchMode::Dfs).max_tree_count(0);
        assert!(matches!(
            Solver::new(&graph).solve(&zero, None),
            Err(SearchError::InvalidRequest(_))
        ));

        assert!(matches!(
            generate_recipe_tree(&graph, "Life", "astar", 1, None, 0),
            Err(SearchError::InvalidRequest(_))
        ));
        assert!(matches!(
            generate_recipe_tree(&graph, "Life", "dfs", 0, None, 0),
            Err(SearchError::InvalidRequest(_))
        ));
        assert!(matches!(
            generate_recipe_tree(&graph, "Life", "dfs", -3, None, 0),
            Err(SearchError::InvalidRequest(_))
        ));
        assert!(matches!(
            generate_recipe_tree(&graph, "Life", "dfs", 1, None, -1),
            Err(SearchError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_invalid_request_is_checked_before_lookup() {
        let graph = classic_graph();
        let err = generate_recipe_tree(&graph, "Dragon", "sideways", 1, None, 0).unwrap_err();
        assert!(matches!(err, SearchError::InvalidRequest(_)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SearchError::NotFound("Dragon".to_string()).to_string(),
            "Element not found: Dragon"
        );
        assert_eq!(
            SearchError::NoSolution("Ghost".to_string()).to_string(),
            "No valid recipe tree found for Ghost"
        );
        assert_eq!(
            SearchError::InvalidRequest("bad mode".to_string()).to_string(),
            "Invalid request: bad mode"
        );
        assert_eq!(
            SearchError::CycleDetected("Ouroboros".to_string()).to_string(),
            "Cycle detected at element: Ouroboros"
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("DFS".parse::<SearchMode>().unwrap(), SearchMode::Dfs);
        assert_eq!(" bfs ".parse::<SearchMode>().unwrap(), SearchMode::Bfs);
        assert_eq!(
            "Bidirectional".parse::<SearchMode>().unwrap(),
            SearchMode::Bidirectional
        );
        assert!("dijkstra".parse::<SearchMode>().is_err());
        assert_eq!(SearchMode::Bidirectional.to_string(), "bidirectional");
    }

    #[test]
    fn test_generate_recipe_tree_entry_point() {
        let graph = classic_graph();
        let outcome = generate_recipe_tree(&graph, "Life", "bidirectional", 4, None, 0).unwrap();

        assert_eq!(outcome.trees, vec![classic_life()]);
    }
}

#[cfg(test)]
mod best_tree_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_best_tree_agrees_across_strategies() {
        let graph = rich_graph();
        let solver = Solver::new(&graph);

        for target in ["Mud", "Stone", "Life", "Golem"] {
            let counts: Vec<usize> = SearchMode::ALL
                .iter()
                .map(|&mode| {
                    let outcome = solver.best_tree(target, mode).unwrap();
                    assert_eq!(outcome.trees.len(), 1);
                    graph.verify_tree(&outcome.trees[0]).unwrap();
                    outcome.trees[0].node_count()
                })
                .collect();
            assert!(counts.windows(2).all(|w| w[0] == w[1]), "{}: {:?}", target, counts);
        }
    }

    #[test]
    fn test_best_tree_prefers_smaller_recipe_then_first() {
        let graph = rich_graph();
        let expected = node(
            "Golem",
            node("Stone", node("Lava", leaf("Fire"), leaf("Earth")), leaf("Air")),
            node("Mud", leaf("Water"), leaf("Earth")),
        );

        for mode in SearchMode::ALL {
            let outcome = Solver::new(&graph).best_tree("Golem", mode).unwrap();
            assert_eq!(outcome.trees[0], expected, "mode {}", mode);
            assert_eq!(outcome.trees[0].node_count(), 9);
        }
    }

    #[test]
    fn test_best_tree_of_unresolved_element() {
        let graph = build(unresolvable_catalog());
        for mode in SearchMode::ALL {
            assert_eq!(
                Solver::new(&graph).best_tree("Phantom", mode).unwrap_err(),
                SearchError::NoSolution("Phantom".to_string())
            );
        }
    }
}

#[cfg(test)]
mod first_tree_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_tree_follows_first_recipes() {
        let graph = rich_graph();
        let tree = Solver::new(&graph).first_tree("Golem").unwrap();

        assert_eq!(
            tree.to_string(),
            "Golem(Stone(Lava(Fire,Earth),Air),Life(Mud(Water,Earth),Lava(Fire,Earth)))"
        );
        graph.verify_tree(&tree).unwrap();
    }

    #[test]
    fn test_first_tree_reuses_repeated_elements() {
        let graph = rich_graph();
        let tree = Solver::new(&graph).first_tree("Golem").unwrap();

        let lavas: Vec<&SolutionTree> = tree.iter().filter(|t| t.name() == "Lava").collect();
        assert_eq!(lavas.len(), 2);
        assert_eq!(lavas[0], lavas[1]);
    }

    #[test]
    fn test_first_tree_counts_each_element_once() {
        let graph = rich_graph();
        let ctx = SearchContext::new(&graph, None);
        let golem = graph.id_of("Golem").unwrap();

        BreadthFirst.first_tree(&ctx, golem).unwrap();
        // Golem, Stone, Lava, Fire, Earth, Air, Life, Mud, Water
        assert_eq!(ctx.nodes_explored(), 9);
    }
}

#[cfg(test)]
mod partial_tree_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_tree_is_completed() {
        let graph = rich_graph();
        // Golem from Stone and Mud, with Stone left open.
        let partial = node("Golem", leaf("Stone"), node("Mud", leaf("Water"), leaf("Earth")));
        let request = SearchRequest::new("Golem", SearchMode::Bidirectional)
            .max_tree_count(10)
            .partial(partial);

        let trees = Solver::new(&graph).solve(&request, None).unwrap().trees;
        assert_eq!(trees.len(), 3);
        assert_valid_and_distinct(&graph, &trees);
        for tree in &trees {
            let (_, mud) = tree.children().unwrap();
            assert_eq!(mud.to_string(), "Mud(Water,Earth)");
        }
    }

    #[test]
    fn test_partial_tree_must_match_target_and_recipes() {
        let graph = rich_graph();
        let solver = Solver::new(&graph);

        let wrong_root = SearchRequest::new("Golem", SearchMode::Bidirectional)
            .max_tree_count(3)
            .partial(leaf("Stone"));
        assert!(matches!(
            solver.solve(&wrong_root, None),
            Err(SearchError::InvalidRequest(_))
        ));

        let bad_recipe = SearchRequest::new("Golem", SearchMode::Bidirectional)
            .max_tree_count(3)
            .partial(node("Golem", leaf("Fire"), leaf("Water")));
        assert!(matches!(
            solver.solve(&bad_recipe, None),
            Err(SearchError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_partial_tree_requires_bidirectional_mode() {
        let graph = classic_graph();
        let request = SearchRequest::new("Life", SearchMode::Dfs)
            .max_tree_count(1)
            .partial(leaf("Life"));

        assert!(matches!(
            Solver::new(&graph).solve(&request, None),
            Err(SearchError::InvalidRequest(_))
        ));
    }
}
