//! Backlog API Server binary

use std::path::PathBuf;

use backlog_check::api::{run_api_server, ApiConfig};
use backlog_check::config::ReconcileConfig;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "backlog-server")]
#[command(version)]
#[command(about = "Backlog API Server - HTTP REST API for the weekly backlog check")]
#[command(long_about = r#"
Backlog API Server - HTTP REST API

Endpoints:
  - POST /api/v1/reconcile - Compare two backlog workbooks and write the report
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON response format with request IDs

Example usage:
  backlog-server                           # Start on localhost:8080
  backlog-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/reconcile \
    -H "Content-Type: application/json" \
    -d '{"previous_path": "prev.xlsx", "current_path": "curr.xlsx",
         "roster_path": "eng_mgr.xlsx", "teco_path": "teco.xlsx"}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "BACKLOG_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "BACKLOG_PORT")]
    port: u16,

    /// YAML configuration overriding column and sheet names
    #[arg(long, env = "BACKLOG_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        reconcile: ReconcileConfig::load_or_default(args.config.as_deref())?,
    };

    run_api_server(config).await
}
