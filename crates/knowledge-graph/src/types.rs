#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property bag attached to entities and relations. Keys keep insertion order.
pub type Properties = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub properties: Properties,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    #[serde(rename = "relation")]
    pub label: String,
    pub to: String,
    #[serde(default)]
    pub properties: Properties,
    pub created_at: DateTime<Utc>,
}

impl Relation {
    /// Returns the endpoint opposite to `id`, treating the edge as undirected.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.from == id {
            Some(&self.to)
        } else if self.to == id {
            Some(&self.from)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryKind {
    #[default]
    Entity,
    Relation,
    Path,
}

impl QueryKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "entity" => Some(Self::Entity),
            "relation" => Some(Self::Relation),
            "path" => Some(Self::Path),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Relation => "relation",
            Self::Path => "path",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryMatch {
    Entity {
        id: String,
        #[serde(rename = "type")]
        entity_type: String,
        properties: Properties,
    },
    Relation {
        from: String,
        relation: String,
        to: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Neighbor {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GraphStats {
    pub entity_count: usize,
    pub relation_count: usize,
    pub entity_type_histogram: BTreeMap<String, usize>,
    pub relation_label_histogram: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_kind_parse() {
        assert_eq!(QueryKind::parse("entity"), Some(QueryKind::Entity));
        assert_eq!(QueryKind::parse("relation"), Some(QueryKind::Relation));
        assert_eq!(QueryKind::parse("path"), Some(QueryKind::Path));
        assert_eq!(QueryKind::parse("Entity"), None);
        assert_eq!(QueryKind::default().as_str(), "entity");
    }

    #[test]
    fn test_relation_other_end() {
        let relation = Relation {
            from: "A".to_string(),
            label: "knows".to_string(),
            to: "B".to_string(),
            properties: Properties::new(),
            created_at: Utc::now(),
        };
        assert_eq!(relation.other_end("A"), Some("B"));
        assert_eq!(relation.other_end("B"), Some("A"));
        assert_eq!(relation.other_end("C"), None);
    }

    #[test]
    fn test_entity_serializes_type_key() {
        let entity = Entity {
            id: "A".to_string(),
            entity_type: "person".to_string(),
            properties: Properties::new(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["type"], "person");
        assert!(value.get("entity_type").is_none());
    }
}
