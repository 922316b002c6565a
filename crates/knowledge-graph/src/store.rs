#![forbid(unsafe_code)]

//! Entity and relation storage.
//!
//! `GraphStore` is the only component that mutates graph state. Entities are
//! kept in insertion order with a by-id index; relations form an append-only
//! log with an adjacency index so traversal does not need to rescan the log.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::error::{GraphError, GraphResult};
use crate::types::{Entity, Properties, Relation};

/// Graph handle shared between tools. Writers take the write lock, everything
/// else reads.
pub type SharedGraph = Arc<RwLock<GraphStore>>;

#[derive(Debug, Default)]
pub struct GraphStore {
    entities: Vec<Entity>,
    entity_index: HashMap<String, usize>,
    relations: Vec<Relation>,
    adjacency: HashMap<String, Vec<usize>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedGraph {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Insert or replace an entity. Replacement is wholesale: the previous
    /// properties are discarded, the slot in insertion order is kept.
    pub fn add_entity(
        &mut self,
        id: impl Into<String>,
        entity_type: impl Into<String>,
        properties: Properties,
    ) -> Entity {
        let entity = Entity {
            id: id.into(),
            entity_type: entity_type.into(),
            properties,
            created_at: Utc::now(),
        };

        match self.entity_index.get(&entity.id) {
            Some(&slot) => {
                tracing::debug!(id = %entity.id, "replacing entity");
                self.entities[slot] = entity.clone();
            }
            None => {
                self.entity_index
                    .insert(entity.id.clone(), self.entities.len());
                self.entities.push(entity.clone());
            }
        }

        entity
    }

    /// Append a relation. Both endpoints must already exist; the `from`
    /// endpoint is checked first.
    pub fn add_relation(
        &mut self,
        from: impl Into<String>,
        label: impl Into<String>,
        to: impl Into<String>,
        properties: Properties,
    ) -> GraphResult<Relation> {
        let from = from.into();
        let to = to.into();

        for endpoint in [&from, &to] {
            if !self.contains_entity(endpoint) {
                return Err(GraphError::EntityNotFound(endpoint.clone()));
            }
        }

        let relation = Relation {
            from,
            label: label.into(),
            to,
            properties,
            created_at: Utc::now(),
        };

        let slot = self.relations.len();
        self.adjacency
            .entry(relation.from.clone())
            .or_default()
            .push(slot);
        if relation.to != relation.from {
            self.adjacency
                .entry(relation.to.clone())
                .or_default()
                .push(slot);
        }
        self.relations.push(relation.clone());

        Ok(relation)
    }

    pub fn get_entity(&self, id: &str) -> Option<&Entity> {
        self.entity_index.get(id).map(|&slot| &self.entities[slot])
    }

    pub fn contains_entity(&self, id: &str) -> bool {
        self.entity_index.contains_key(id)
    }

    /// Entities in first-insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Relations in log order.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relation(&self, slot: usize) -> Option<&Relation> {
        self.relations.get(slot)
    }

    /// Log positions of every relation touching `id`, ascending.
    pub fn incident_relations(&self, id: &str) -> &[usize] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }
}
