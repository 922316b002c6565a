use std::path::PathBuf;

use knowledge_graph::config::{self, KnowledgeGraphConfig};
use knowledge_graph::logging;
use knowledge_graph::mcp::McpServer;
use knowledge_graph::store::GraphStore;
use knowledge_graph::tools::create_default_registry;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "knowledge-graph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "In-memory knowledge graph exposed as MCP tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the MCP server on stdio
    Serve(ConfigArgs),
    /// Print the tool list as JSON
    Tools(ConfigArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args, Default)]
struct ConfigArgs {
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(ConfigArgs::default())) {
        Command::Serve(args) => run_serve(&args),
        Command::Tools(args) => run_tools(&args),
        Command::Config(args) => run_config(&args),
    }
}

fn run_serve(args: &ConfigArgs) {
    let cfg = load_config(args);

    let _guard = match logging::init_logging(&cfg.logging) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Failed to initialize logging: {err}");
            std::process::exit(1);
        }
    };

    let server = McpServer::new(&cfg);
    if let Err(err) = server.start() {
        tracing::error!(error = %err, "MCP server stopped");
        eprintln!("Failed to run MCP server: {err}");
        std::process::exit(1);
    }
}

fn run_tools(args: &ConfigArgs) {
    let cfg = load_config(args);
    let registry = create_default_registry(&GraphStore::shared(), &cfg);

    match serde_json::to_string_pretty(&registry.get_tool_metadata()) {
        Ok(raw) => println!("{raw}"),
        Err(err) => {
            eprintln!("Failed to serialize tools: {err}");
            std::process::exit(1);
        }
    }
}

fn run_config(args: &ConfigArgs) {
    let cfg = load_config(args);
    match config::to_toml(&cfg) {
        Ok(raw) => print!("{raw}"),
        Err(err) => {
            eprintln!("Failed to render config: {err}");
            std::process::exit(1);
        }
    }
}

fn load_config(args: &ConfigArgs) -> KnowledgeGraphConfig {
    match config::load_or_default(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Failed to load config: {err}");
            std::process::exit(1);
        }
    }
}
