#![forbid(unsafe_code)]

//! Keyword search over entities and relations.

use crate::store::GraphStore;
use crate::types::{QueryKind, QueryMatch};

pub const DEFAULT_QUERY_LIMIT: i64 = 10;

/// Case-insensitive substring search.
///
/// Entities match on id or type, relations on their label. Results follow
/// insertion order and are capped at `limit`; a non-positive limit returns
/// nothing. `QueryKind::Path` has no search semantics and always returns an
/// empty result.
pub fn query(store: &GraphStore, text: &str, kind: QueryKind, limit: i64) -> Vec<QueryMatch> {
    let Ok(limit) = usize::try_from(limit) else {
        return Vec::new();
    };
    if limit == 0 {
        return Vec::new();
    }

    let needle = text.to_lowercase();
    let results: Vec<QueryMatch> = match kind {
        QueryKind::Entity => store
            .entities()
            .iter()
            .filter(|entity| {
                entity.id.to_lowercase().contains(&needle)
                    || entity.entity_type.to_lowercase().contains(&needle)
            })
            .take(limit)
            .map(|entity| QueryMatch::Entity {
                id: entity.id.clone(),
                entity_type: entity.entity_type.clone(),
                properties: entity.properties.clone(),
            })
            .collect(),
        QueryKind::Relation => store
            .relations()
            .iter()
            .filter(|relation| relation.label.to_lowercase().contains(&needle))
            .take(limit)
            .map(|relation| QueryMatch::Relation {
                from: relation.from.clone(),
                relation: relation.label.clone(),
                to: relation.to.clone(),
            })
            .collect(),
        QueryKind::Path => Vec::new(),
    };

    tracing::debug!(kind = kind.as_str(), matches = results.len(), "query");
    results
}
