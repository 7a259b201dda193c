//! Clinical Trials MCP Server - Entry Point
//!
//! Provides both stdio and HTTP transports.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use clinical_trials_mcp::{RegistryClient, config::Config, server::McpServer};

#[derive(Parser, Debug)]
#[command(name = "clinical-trials-mcp")]
#[command(about = "MCP server for ClinicalTrials.gov and PubMed")]
#[command(version)]
struct Cli {
    /// Transport mode: stdio or http
    #[arg(long, default_value = "stdio", env = "MCP_TRANSPORT")]
    transport: Transport,

    /// HTTP bind address (only used with --transport http)
    #[arg(long, default_value = "127.0.0.1", env = "HOST")]
    host: String,

    /// HTTP server port (only used with --transport http)
    #[arg(long, default_value = "8000", env = "PORT")]
    port: u16,

    /// JSON-RPC endpoint path (only used with --transport http)
    #[arg(long, default_value = "/mcp", env = "MCP_PATH")]
    path: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Response cache TTL in seconds
    #[arg(long, env = "CLINICAL_TRIALS_CACHE_TTL_SECS")]
    cache_ttl_secs: Option<u64>,

    /// Bypass the response cache and request coalescing
    #[arg(long)]
    cache_disabled: bool,

    /// Upstream request timeout in milliseconds
    #[arg(long, env = "CLINICAL_TRIALS_TIMEOUT_MS")]
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Transport {
    /// Standard input/output
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
}

/// Logs always go to stderr so stdout stays a clean JSON-RPC channel.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        transport = ?cli.transport,
        "Starting clinical trials MCP server"
    );

    let mut config = Config::from_env()?;
    if let Some(secs) = cli.cache_ttl_secs {
        config.cache_ttl = Duration::from_secs(secs);
    }
    if cli.cache_disabled {
        config.cache_disabled = true;
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }

    tracing::info!(
        ctgov = %config.ctgov_api_url,
        pubmed = %config.pubmed_api_url,
        timeout_ms = config.request_timeout.as_millis(),
        cache_ttl_secs = config.cache_ttl.as_secs(),
        cache_disabled = config.cache_disabled,
        "Configuration loaded"
    );

    let client = RegistryClient::new(&config)?;
    let server = McpServer::new(client, config.limits);

    match cli.transport {
        Transport::Stdio => {
            server.run_stdio().await?;
        }
        Transport::Http => {
            tracing::info!(host = %cli.host, port = cli.port, path = %cli.path, "Running in HTTP mode");
            server.run_http(&cli.host, cli.port, &cli.path).await?;
        }
    }

    Ok(())
}
