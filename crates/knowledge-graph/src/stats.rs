#![forbid(unsafe_code)]

use crate::store::GraphStore;
use crate::types::GraphStats;

/// Counts and histograms, recomputed from a full scan on every call.
pub fn stats(store: &GraphStore) -> GraphStats {
    let mut stats = GraphStats {
        entity_count: store.entity_count(),
        relation_count: store.relation_count(),
        ..GraphStats::default()
    };

    for entity in store.entities() {
        *stats
            .entity_type_histogram
            .entry(entity.entity_type.clone())
            .or_insert(0) += 1;
    }
    for relation in store.relations() {
        *stats
            .relation_label_histogram
            .entry(relation.label.clone())
            .or_insert(0) += 1;
    }

    stats
}
