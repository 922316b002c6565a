#![forbid(unsafe_code)]

//! Tool abstraction layer for the knowledge graph MCP server.
//!
//! Tools wrap the graph operations behind a name, a description and a JSON
//! input schema. They can be executed directly (tests, CLI) or through the
//! MCP protocol layer.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::KnowledgeGraphConfig;
use crate::error::GraphError;
use crate::store::SharedGraph;

pub mod graph_tools;

/// Result type for tool execution
pub type ToolResult = Result<Value, ToolError>;

/// Error type for tool execution failures
#[derive(Debug, Clone)]
pub struct ToolError {
    pub code: String,
    pub message: String,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new("invalid_params", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn unknown_operation(name: &str) -> Self {
        Self::new("unknown_operation", format!("Unknown tool: {name}"))
    }
}

impl From<GraphError> for ToolError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::EntityNotFound(_) => Self::not_found(err.to_string()),
            GraphError::InvalidArgument(_) => Self::invalid_params(err.to_string()),
        }
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ToolError {}

/// Trait for MCP tools
pub trait Tool: Send + Sync {
    /// Tool name (used in MCP protocol)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool with given parameters
    fn execute(&self, params: Value) -> ToolResult;
}

/// Registry for managing available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// List all registered tool names
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Get tool metadata for MCP tools/list
    pub fn get_tool_metadata(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema(),
                })
            })
            .collect()
    }

    /// Execute a tool by name
    pub fn execute(&self, name: &str, params: Value) -> ToolResult {
        match self.get(name) {
            Some(tool) => tool.execute(params),
            None => Err(ToolError::unknown_operation(name)),
        }
    }
}

/// Create a registry with every knowledge graph tool bound to `graph`.
pub fn create_default_registry(graph: &SharedGraph, config: &KnowledgeGraphConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Box::new(graph_tools::AddEntityTool::new(graph.clone())));
    registry.register(Box::new(graph_tools::AddRelationTool::new(graph.clone())));
    registry.register(Box::new(graph_tools::QueryTool::new(
        graph.clone(),
        config.query.default_limit,
    )));
    registry.register(Box::new(graph_tools::NeighborsTool::new(
        graph.clone(),
        config.traversal.default_depth,
    )));
    registry.register(Box::new(graph_tools::StatsTool::new(graph.clone())));

    registry
}
