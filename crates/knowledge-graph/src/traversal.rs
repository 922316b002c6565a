#![forbid(unsafe_code)]

use std::collections::{BTreeSet, HashSet};

use crate::error::{GraphError, GraphResult};
use crate::store::GraphStore;
use crate::types::Neighbor;

pub const DEFAULT_DEPTH: i64 = 1;

/// Entities within `depth` hops of `start`, ignoring edge direction.
///
/// Each round expands the whole frontier at once. Relations touching the
/// frontier are visited in log order, so the output is in discovery order and
/// stable across calls. The walk stops at the first round that finds no new
/// entity, so the work is bounded by the graph size rather than by `depth`.
/// The start entity is never part of the result.
pub fn neighbors(store: &GraphStore, start: &str, depth: i64) -> GraphResult<Vec<Neighbor>> {
    if !store.contains_entity(start) {
        return Err(GraphError::EntityNotFound(start.to_string()));
    }
    if depth < 0 {
        return Err(GraphError::InvalidArgument(format!(
            "depth must be a non-negative integer, got {depth}"
        )));
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut discovered: Vec<&str> = Vec::new();
    let mut frontier: HashSet<&str> = HashSet::from([start]);

    for _ in 0..depth {
        let slots: BTreeSet<usize> = frontier
            .iter()
            .flat_map(|id| store.incident_relations(id).iter().copied())
            .collect();

        let seen_before = visited.len();
        let mut next_frontier: HashSet<&str> = HashSet::new();
        for relation in slots.into_iter().filter_map(|slot| store.relation(slot)) {
            let mut reached = Vec::with_capacity(2);
            if frontier.contains(relation.from.as_str()) {
                reached.push(relation.to.as_str());
            }
            if frontier.contains(relation.to.as_str()) {
                reached.push(relation.from.as_str());
            }
            for id in reached {
                next_frontier.insert(id);
                if visited.insert(id) {
                    discovered.push(id);
                }
            }
        }
        // Once a round reaches nothing new, every later round is a
        // walk back into the visited set.
        if visited.len() == seen_before {
            break;
        }
        frontier = next_frontier;
    }

    let result: Vec<Neighbor> = discovered
        .into_iter()
        .filter(|id| *id != start)
        .filter_map(|id| store.get_entity(id))
        .map(|entity| Neighbor {
            id: entity.id.clone(),
            entity_type: entity.entity_type.clone(),
        })
        .collect();

    tracing::debug!(start, depth, found = result.len(), "neighbors");
    Ok(result)
}
