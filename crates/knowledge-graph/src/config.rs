#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::query::DEFAULT_QUERY_LIMIT;
use crate::traversal::DEFAULT_DEPTH;

pub const CONFIG_FILENAME: &str = "knowledge-graph.toml";
pub const CONFIG_ENV: &str = "KG_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeGraphConfig {
    pub server: ServerConfig,
    pub query: QueryConfig,
    pub traversal: TraversalConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "knowledge-graph".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_limit: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub default_depth: i64,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            default_depth: DEFAULT_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Resolve which config file to read: explicit path, then `KG_CONFIG`, then
/// `knowledge-graph.toml` in the working directory if it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(CONFIG_FILENAME);
    local.is_file().then_some(local)
}

pub fn load_config(path: &Path) -> std::io::Result<KnowledgeGraphConfig> {
    let raw = fs::read_to_string(path)?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> std::io::Result<KnowledgeGraphConfig> {
    toml::from_str(raw).map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

/// Load the resolved config file, or defaults when there is none.
pub fn load_or_default(explicit: Option<&Path>) -> std::io::Result<KnowledgeGraphConfig> {
    match resolve_config_path(explicit) {
        Some(path) => load_config(&path),
        None => Ok(KnowledgeGraphConfig::default()),
    }
}

pub fn to_toml(config: &KnowledgeGraphConfig) -> std::io::Result<String> {
    toml::to_string_pretty(config)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = KnowledgeGraphConfig::default();
        assert_eq!(config.server.name, "knowledge-graph");
        assert_eq!(config.query.default_limit, 10);
        assert_eq!(config.traversal.default_depth, 1);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = parse_config(
            r#"
[query]
default_limit = 25

[logging]
file = "/tmp/kg.log"
"#,
        )
        .unwrap();
        assert_eq!(config.query.default_limit, 25);
        assert_eq!(config.traversal.default_depth, 1);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/kg.log")));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let err = parse_config("[query]\ndefault_limit = \"many\"").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "[traversal]\ndefault_depth = 3\n").unwrap();

        let config = load_or_default(Some(path.as_path())).unwrap();
        assert_eq!(config.traversal.default_depth, 3);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = KnowledgeGraphConfig::default();
        let raw = to_toml(&config).unwrap();
        assert_eq!(parse_config(&raw).unwrap(), config);
    }
}
