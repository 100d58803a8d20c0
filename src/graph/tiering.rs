use super::{GraphNode, NodeId, Recipe};
use tracing::{debug, trace};

/// Outcome of tier assignment.
#[derive(Debug, Default)]
pub(super) struct TierReport {
    pub passes: usize,
    pub unresolved: Vec<NodeId>,
}

/// Steps (c) and (d): seed tier 0, then raise tiers to a fixpoint.
///
/// Each pass computes every assignment from the previous pass's tiers, so a node's tier
/// is the length of its shortest derivation and does not depend on catalog order.
pub(super) fn assign_tiers(nodes: &mut [GraphNode], primitives: &[NodeId]) -> TierReport {
    for &id in primitives {
        nodes[id].tier = Some(0);
    }
    for id in 0..nodes.len() {
        let node = &nodes[id];
        if node.tier.is_some() {
            continue;
        }
        if node.produced_by.is_empty() {
            nodes[id].tier = Some(0);
        } else if node.produced_by.iter().all(|r| r.uses(id)) {
            // Every recipe needs the element itself.
            debug!(element = %node.name, "self-referential element treated as base");
            nodes[id].tier = Some(0);
        }
    }

    let mut report = TierReport::default();
    loop {
        let assignments: Vec<(NodeId, u32)> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.tier.is_none())
            .filter_map(|(id, node)| {
                node.produced_by
                    .iter()
                    .filter_map(|recipe| candidate_tier(nodes, recipe))
                    .min()
                    .map(|tier| (id, tier))
            })
            .collect();

        if assignments.is_empty() {
            break;
        }
        report.passes += 1;
        trace!(pass = report.passes, assigned = assignments.len(), "tier pass");
        for (id, tier) in assignments {
            nodes[id].tier = Some(tier);
        }
    }

    report.unresolved = (0..nodes.len()).filter(|&id| nodes[id].tier.is_none()).collect();
    report
}

fn candidate_tier(nodes: &[GraphNode], recipe: &Recipe) -> Option<u32> {
    let (first, second) = recipe.ingredients()?;
    let first = nodes[first].tier?;
    let second = nodes[second].tier?;
    Some(1 + first.max(second))
}

/// Step (e): keep only recipes whose ingredients sit strictly below their target.
/// Returns the number of recipes dropped from produced-by lists.
pub(super) fn filter_cyclic_recipes(nodes: &mut [GraphNode]) -> usize {
    let tiers: Vec<Option<u32>> = nodes.iter().map(|n| n.tier).collect();
    let accepted = |recipe: &Recipe| {
        let Some((first, second)) = recipe.ingredients() else {
            return false;
        };
        match (tiers[recipe.target()], tiers[first], tiers[second]) {
            (Some(target), Some(a), Some(b)) => a < target && b < target,
            _ => false,
        }
    };

    let mut dropped = 0;
    for node in nodes.iter_mut() {
        let before = node.produced_by.len();
        node.produced_by.retain(|r| accepted(r));
        dropped += before - node.produced_by.len();
        node.consumed_by.retain(|r| accepted(r));
        if before != node.produced_by.len() {
            trace!(
                element = %node.name,
                dropped = before - node.produced_by.len(),
                "dropped cyclic recipes"
            );
        }
    }
    dropped
}
