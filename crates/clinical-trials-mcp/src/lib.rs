//! Clinical Trials MCP Server
//!
//! A Model Context Protocol (MCP) server exposing ClinicalTrials.gov and
//! PubMed as a small set of tools with stable output shapes.
//!
//! # Features
//!
//! - **7 MCP Tools**: trial search, lookup, comparison, aggregation, literature search
//! - **Normalized records**: closed vocabularies, deduplicated lists, resolved country codes
//! - **Cached**: 5-minute TTL cache with request coalescing
//! - **Bounded**: query ceilings and a hard aggregation cap
//!
//! # Example
//!
//! ```no_run
//! use clinical_trials_mcp::{RegistryClient, config::Config, server::McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = RegistryClient::new(&config)?;
//!     McpServer::new(client, config.limits).run_stdio().await
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod normalize;
pub mod query;
pub mod server;
pub mod tools;

pub use client::RegistryClient;
pub use config::Config;
pub use error::{ErrorCode, ToolError, ToolResult};
