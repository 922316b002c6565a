#![forbid(unsafe_code)]

//! Graph tools: entity/relation insertion, search, traversal and stats.

use serde_json::{Value, json};

use crate::error::GraphError;
use crate::query;
use crate::stats;
use crate::store::SharedGraph;
use crate::traversal;
use crate::types::{Properties, QueryKind};

use super::{Tool, ToolError, ToolResult};

fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::invalid_params(format!("Missing or invalid '{key}' parameter")))
}

fn optional_properties(params: &Value) -> Result<Properties, ToolError> {
    match params.get("properties") {
        None | Some(Value::Null) => Ok(Properties::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ToolError::invalid_params("'properties' must be an object")),
    }
}

/// Integer argument. Whole floats such as `2.0` are accepted; fractional or
/// out-of-range numbers are rejected.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn optional_integer(params: &Value, key: &str, default: i64) -> Result<i64, ToolError> {
    let invalid = || ToolError::invalid_params(format!("'{key}' must be an integer"));
    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(invalid()),
            }
        }
        Some(_) => Err(invalid()),
    }
}

/// Tool for adding or replacing an entity
pub struct AddEntityTool {
    graph: SharedGraph,
}

impl AddEntityTool {
    pub const fn new(graph: SharedGraph) -> Self {
        Self { graph }
    }
}

impl Tool for AddEntityTool {
    fn name(&self) -> &'static str {
        "kg_add_entity"
    }

    fn description(&self) -> &'static str {
        "Add entity to knowledge graph. Re-adding an existing entity replaces it."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "entity": {
                    "type": "string",
                    "description": "Entity name/ID"
                },
                "type": {
                    "type": "string",
                    "description": "Entity type (person, concept, event, etc.)"
                },
                "properties": {
                    "type": "object",
                    "description": "Additional properties"
                }
            },
            "required": ["entity", "type"]
        })
    }

    fn execute(&self, params: Value) -> ToolResult {
        let id = required_str(&params, "entity")?;
        let entity_type = required_str(&params, "type")?;
        let properties = optional_properties(&params)?;

        let entity = self.graph.write().add_entity(id, entity_type, properties);
        tracing::info!(id = %entity.id, entity_type = %entity.entity_type, "entity added");

        Ok(Value::String(format!(
            "Added entity '{}' of type '{}'",
            entity.id, entity.entity_type
        )))
    }
}

/// Tool for linking two existing entities
pub struct AddRelationTool {
    graph: SharedGraph,
}

impl AddRelationTool {
    pub const fn new(graph: SharedGraph) -> Self {
        Self { graph }
    }
}

impl Tool for AddRelationTool {
    fn name(&self) -> &'static str {
        "kg_add_relation"
    }

    fn description(&self) -> &'static str {
        "Add relation between entities in the graph. Both entities must exist. Relations are not deduplicated: calling this twice creates two relations."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "from_entity": {
                    "type": "string",
                    "description": "Source entity"
                },
                "relation": {
                    "type": "string",
                    "description": "Relation type (knows, related_to, causes, etc.)"
                },
                "to_entity": {
                    "type": "string",
                    "description": "Target entity"
                },
                "properties": {
                    "type": "object",
                    "description": "Relation metadata"
                }
            },
            "required": ["from_entity", "relation", "to_entity"]
        })
    }

    fn execute(&self, params: Value) -> ToolResult {
        let from = required_str(&params, "from_entity")?;
        let label = required_str(&params, "relation")?;
        let to = required_str(&params, "to_entity")?;
        let properties = optional_properties(&params)?;

        let relation = self
            .graph
            .write()
            .add_relation(from, label, to, properties)
            .map_err(|err| match err {
                GraphError::EntityNotFound(id) => {
                    tracing::warn!(entity = %id, "relation rejected: unknown endpoint");
                    ToolError::not_found(format!(
                        "Entity '{id}' not found. Add it first with kg_add_entity."
                    ))
                }
                other => other.into(),
            })?;
        tracing::info!(from = %relation.from, relation = %relation.label, to = %relation.to, "relation added");

        Ok(Value::String(format!(
            "Added relation: {} --[{}]--> {}",
            relation.from, relation.label, relation.to
        )))
    }
}

/// Tool for keyword search over entities or relations
pub struct QueryTool {
    graph: SharedGraph,
    default_limit: i64,
}

impl QueryTool {
    pub const fn new(graph: SharedGraph, default_limit: i64) -> Self {
        Self {
            graph,
            default_limit,
        }
    }
}

impl Tool for QueryTool {
    fn name(&self) -> &'static str {
        "kg_query"
    }

    fn description(&self) -> &'static str {
        "Query knowledge graph for entities and relations (case-insensitive substring match)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Query string (entity name or pattern)"
                },
                "query_type": {
                    "type": "string",
                    "enum": ["entity", "relation", "path"],
                    "default": "entity",
                    "description": "Type of query. 'path' is accepted but always returns no results."
                },
                "limit": {
                    "type": "number",
                    "default": self.default_limit,
                    "description": "Max results"
                }
            },
            "required": ["query"]
        })
    }

    fn execute(&self, params: Value) -> ToolResult {
        let text = required_str(&params, "query")?;
        let kind = match params.get("query_type") {
            None | Some(Value::Null) => QueryKind::default(),
            Some(Value::String(raw)) => QueryKind::parse(raw).ok_or_else(|| {
                ToolError::invalid_params(format!(
                    "Invalid query_type '{raw}': expected entity, relation or path"
                ))
            })?,
            Some(_) => return Err(ToolError::invalid_params("'query_type' must be a string")),
        };
        let limit = optional_integer(&params, "limit", self.default_limit)?;

        let results = query::query(&self.graph.read(), text, kind, limit);

        Ok(json!({
            "query": text,
            "results": results,
        }))
    }
}

/// Tool for multi-hop neighbor discovery
pub struct NeighborsTool {
    graph: SharedGraph,
    default_depth: i64,
}

impl NeighborsTool {
    pub const fn new(graph: SharedGraph, default_depth: i64) -> Self {
        Self {
            graph,
            default_depth,
        }
    }
}

impl Tool for NeighborsTool {
    fn name(&self) -> &'static str {
        "kg_get_neighbors"
    }

    fn description(&self) -> &'static str {
        "Get neighboring entities (connected by relations in either direction)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "entity": {
                    "type": "string",
                    "description": "Entity to find neighbors for"
                },
                "depth": {
                    "type": "number",
                    "default": self.default_depth,
                    "description": "Search depth (hops)"
                }
            },
            "required": ["entity"]
        })
    }

    fn execute(&self, params: Value) -> ToolResult {
        let entity = required_str(&params, "entity")?;
        let depth = optional_integer(&params, "depth", self.default_depth)?;

        let neighbors = traversal::neighbors(&self.graph.read(), entity, depth).map_err(|err| {
            tracing::warn!(entity, depth, error = %err, "neighbor lookup rejected");
            ToolError::from(err)
        })?;

        Ok(json!({
            "entity": entity,
            "depth": depth,
            "neighbors": neighbors,
        }))
    }
}

/// Tool for aggregate graph statistics
pub struct StatsTool {
    graph: SharedGraph,
}

impl StatsTool {
    pub const fn new(graph: SharedGraph) -> Self {
        Self { graph }
    }
}

impl Tool for StatsTool {
    fn name(&self) -> &'static str {
        "kg_stats"
    }

    fn description(&self) -> &'static str {
        "Get knowledge graph statistics"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    fn execute(&self, _params: Value) -> ToolResult {
        let stats = stats::stats(&self.graph.read());
        serde_json::to_value(stats)
            .map_err(|e| ToolError::internal_error(format!("Failed to serialize stats: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GraphStore;

    fn seeded_graph() -> SharedGraph {
        let graph = GraphStore::shared();
        let add_entity = AddEntityTool::new(graph.clone());
        let add_relation = AddRelationTool::new(graph.clone());

        for (id, ty) in [("A", "person"), ("B", "person"), ("C", "concept")] {
            add_entity.execute(json!({"entity": id, "type": ty})).unwrap();
        }
        add_relation
            .execute(json!({"from_entity": "A", "relation": "knows", "to_entity": "B"}))
            .unwrap();
        add_relation
            .execute(json!({"from_entity": "B", "relation": "related_to", "to_entity": "C"}))
            .unwrap();
        graph
    }

    #[test]
    fn test_add_entity_message() {
        let tool = AddEntityTool::new(GraphStore::shared());
        let result = tool
            .execute(json!({"entity": "Ada", "type": "person", "properties": {"born": 1815}}))
            .unwrap();
        assert_eq!(result, json!("Added entity 'Ada' of type 'person'"));
    }

    #[test]
    fn test_add_entity_requires_type() {
        let tool = AddEntityTool::new(GraphStore::shared());
        let err = tool.execute(json!({"entity": "Ada"})).unwrap_err();
        assert_eq!(err.code, "invalid_params");
        assert!(err.message.contains("'type'"));
    }

    #[test]
    fn test_add_entity_rejects_non_object_properties() {
        let graph = GraphStore::shared();
        let tool = AddEntityTool::new(graph.clone());
        let err = tool
            .execute(json!({"entity": "Ada", "type": "person", "properties": [1, 2]}))
            .unwrap_err();
        assert_eq!(err.code, "invalid_params");
        assert_eq!(graph.read().entity_count(), 0);
    }

    #[test]
    fn test_add_relation_message() {
        let graph = seeded_graph();
        let tool = AddRelationTool::new(graph);
        let result = tool
            .execute(json!({"from_entity": "C", "relation": "inspires", "to_entity": "A"}))
            .unwrap();
        assert_eq!(result, json!("Added relation: C --[inspires]--> A"));
    }

    #[test]
    fn test_add_relation_unknown_endpoint() {
        let graph = seeded_graph();
        let tool = AddRelationTool::new(graph.clone());
        let err = tool
            .execute(json!({"from_entity": "A", "relation": "knows", "to_entity": "Z"}))
            .unwrap_err();
        assert_eq!(err.code, "not_found");
        assert_eq!(
            err.message,
            "Entity 'Z' not found. Add it first with kg_add_entity."
        );
        assert_eq!(graph.read().relation_count(), 2);
    }

    #[test]
    fn test_query_tool_defaults_to_entities() {
        let tool = QueryTool::new(seeded_graph(), 10);
        let result = tool.execute(json!({"query": "PERSON"})).unwrap();
        assert_eq!(result["query"], "PERSON");
        let results = result["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], "A");
        assert_eq!(results[0]["type"], "person");
        assert!(results[0]["properties"].is_object());
    }

    #[test]
    fn test_query_tool_relations_and_limit() {
        let tool = QueryTool::new(seeded_graph(), 10);
        let result = tool
            .execute(json!({"query": "", "query_type": "relation", "limit": 1}))
            .unwrap();
        assert_eq!(
            result["results"],
            json!([{"from": "A", "relation": "knows", "to": "B"}])
        );
    }

    #[test]
    fn test_query_tool_rejects_unknown_type() {
        let tool = QueryTool::new(seeded_graph(), 10);
        let err = tool
            .execute(json!({"query": "A", "query_type": "fuzzy"}))
            .unwrap_err();
        assert_eq!(err.code, "invalid_params");
    }

    #[test]
    fn test_query_tool_path_is_empty() {
        let tool = QueryTool::new(seeded_graph(), 10);
        let result = tool
            .execute(json!({"query": "A", "query_type": "path"}))
            .unwrap();
        assert_eq!(result["results"], json!([]));
    }

    #[test]
    fn test_neighbors_tool() {
        let tool = NeighborsTool::new(seeded_graph(), 1);
        let result = tool.execute(json!({"entity": "A"})).unwrap();
        assert_eq!(result["depth"], 1);
        assert_eq!(result["neighbors"], json!([{"id": "B", "type": "person"}]));

        let result = tool.execute(json!({"entity": "A", "depth": 2.0})).unwrap();
        assert_eq!(result["neighbors"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_neighbors_tool_errors() {
        let tool = NeighborsTool::new(seeded_graph(), 1);

        let err = tool.execute(json!({"entity": "Z"})).unwrap_err();
        assert_eq!(err.code, "not_found");
        assert_eq!(err.message, "Entity 'Z' not found");

        let err = tool.execute(json!({"entity": "A", "depth": -1})).unwrap_err();
        assert_eq!(err.code, "invalid_params");

        let err = tool.execute(json!({"entity": "A", "depth": "2"})).unwrap_err();
        assert_eq!(err.code, "invalid_params");
    }

    #[test]
    fn test_neighbors_tool_rejects_fractional_depth() {
        let tool = NeighborsTool::new(seeded_graph(), 1);

        for depth in [json!(-0.5), json!(1.5), json!(1e300)] {
            let err = tool
                .execute(json!({"entity": "A", "depth": depth}))
                .unwrap_err();
            assert_eq!(err.code, "invalid_params");
            assert_eq!(err.message, "'depth' must be an integer");
        }
    }

    #[test]
    fn test_neighbors_tool_huge_whole_depth_returns() {
        let tool = NeighborsTool::new(seeded_graph(), 1);
        let result = tool
            .execute(json!({"entity": "A", "depth": 1e12}))
            .unwrap();
        assert_eq!(result["neighbors"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_query_tool_rejects_fractional_limit() {
        let tool = QueryTool::new(seeded_graph(), 10);
        let err = tool
            .execute(json!({"query": "", "limit": 2.5}))
            .unwrap_err();
        assert_eq!(err.code, "invalid_params");

        let result = tool.execute(json!({"query": "", "limit": 2.0})).unwrap();
        assert_eq!(result["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_stats_tool() {
        let tool = StatsTool::new(seeded_graph());
        let result = tool.execute(json!({})).unwrap();
        assert_eq!(
            result,
            json!({
                "entity_count": 3,
                "relation_count": 2,
                "entity_type_histogram": {"concept": 1, "person": 2},
                "relation_label_histogram": {"knows": 1, "related_to": 1}
            })
        );
    }
}
