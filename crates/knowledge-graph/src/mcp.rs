#![forbid(unsafe_code)]

//! MCP (Model Context Protocol) server for the knowledge graph.
//!
//! Newline-delimited JSON-RPC 2.0 over stdio. Every request is handled to
//! completion before the next line is read; a failing request never stops the
//! loop.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::KnowledgeGraphConfig;
use crate::store::{GraphStore, SharedGraph};
use crate::tools::{ToolRegistry, create_default_registry};

const PROTOCOL_VERSION: &str = "2024-11-05";

pub struct McpServer {
    name: String,
    graph: SharedGraph,
    tool_registry: ToolRegistry,
}

#[derive(Debug, Serialize)]
struct ServerInfo<'a> {
    name: &'a str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolResult {
    content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ToolContent {
    r#type: &'static str,
    text: String,
}

impl ToolResult {
    fn text(text: String, is_error: bool) -> Self {
        Self {
            content: vec![ToolContent {
                r#type: "text",
                text,
            }],
            is_error: is_error.then_some(true),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum JsonRpcId {
    String(String),
    Number(i64),
}

fn json_rpc_id_from_value(value: &Value) -> Option<JsonRpcId> {
    match value {
        Value::String(s) => Some(JsonRpcId::String(s.clone())),
        Value::Number(n) => n.as_i64().map(JsonRpcId::Number),
        _ => None,
    }
}

impl McpServer {
    /// Build a server around a fresh, empty graph.
    pub fn new(config: &KnowledgeGraphConfig) -> Self {
        Self::with_graph(GraphStore::shared(), config)
    }

    pub fn with_graph(graph: SharedGraph, config: &KnowledgeGraphConfig) -> Self {
        let tool_registry = create_default_registry(&graph, config);
        Self {
            name: config.server.name.clone(),
            graph,
            tool_registry,
        }
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    pub fn start(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve requests from `reader` until EOF, writing one response line per
    /// request to `writer`.
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> io::Result<()> {
        tracing::info!(server = %self.name, "MCP server listening on stdio");
        let mut line = String::new();

        loop {
            line.clear();
            let bytes = reader.read_line(&mut line)?;
            if bytes == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Value>(trimmed) {
                Ok(message) => self.handle_message(&message),
                Err(err) => {
                    tracing::warn!(error = %err, "discarding unparseable message");
                    Some(error_response(None, -32700, "Parse error: invalid JSON"))
                }
            };

            if let Some(response) = response {
                writeln!(writer, "{response}")?;
                writer.flush()?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle one decoded message. Notifications (no `id`) get no response;
    /// an `id` that is not a string or integer is an invalid request.
    pub fn handle_message(&self, message: &Value) -> Option<Value> {
        let method = message.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let raw_id = message.get("id")?;
        let Some(id) = json_rpc_id_from_value(raw_id) else {
            tracing::warn!(id = %raw_id, method, "rejecting request with invalid id");
            return Some(error_response(
                None,
                -32600,
                "Invalid Request: id must be a string or integer",
            ));
        };

        let response = match method {
            "initialize" => result_response(id, self.initialize_result()),
            "tools/list" => result_response(
                id,
                serde_json::json!({ "tools": self.tool_registry.get_tool_metadata() }),
            ),
            "tools/call" => self.handle_tools_call(id, message.get("params")),
            "ping" => result_response(id, serde_json::json!({})),
            _ => error_response(Some(id), -32601, &format!("Method not found: {method}")),
        };

        Some(response)
    }

    fn initialize_result(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": ServerInfo {
                name: &self.name,
                version: env!("CARGO_PKG_VERSION"),
            }
        })
    }

    fn handle_tools_call(&self, id: JsonRpcId, params: Option<&Value>) -> Value {
        let Some(params) = params else {
            return error_response(Some(id), -32602, "Missing tool params");
        };

        let Ok(parsed) = serde_json::from_value::<ToolCallParams>(params.clone()) else {
            return error_response(Some(id), -32602, "Invalid tool params");
        };

        let args = Value::Object(parsed.arguments.unwrap_or_default());
        tracing::debug!(tool = %parsed.name, "tools/call");

        let tool_result = match self.tool_registry.execute(&parsed.name, args) {
            Ok(Value::String(text)) => ToolResult::text(text, false),
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => ToolResult::text(text, false),
                Err(err) => ToolResult::text(format!("Error: {err}"), true),
            },
            Err(err) => {
                tracing::warn!(tool = %parsed.name, code = %err.code, "tool call failed");
                ToolResult::text(format!("Error: {}", err.message), true)
            }
        };

        match serde_json::to_value(tool_result) {
            Ok(result) => result_response(id, result),
            Err(err) => error_response(Some(id), -32603, &format!("Internal error: {err}")),
        }
    }
}

fn result_response(id: JsonRpcId, result: Value) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn error_response(id: Option<JsonRpcId>, code: i64, message: &str) -> Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}
