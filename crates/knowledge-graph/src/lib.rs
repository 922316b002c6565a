#![forbid(unsafe_code)]

//! In-memory knowledge graph served as MCP tools.

pub mod config;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod query;
pub mod stats;
pub mod store;
pub mod tools;
pub mod traversal;
pub mod types;

pub use error::{GraphError, GraphResult};
pub use store::{GraphStore, SharedGraph};
