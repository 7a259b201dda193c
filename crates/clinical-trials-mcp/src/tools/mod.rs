//! MCP tool implementations.
//!
//! Each tool:
//! 1. Deserializes its typed input (failures become `INVALID_ARGUMENT`)
//! 2. Builds upstream queries and fetches through the cached client
//! 3. Returns a normalized JSON payload for the `data` member of the envelope

mod aggregate;
mod compare;
mod pubmed;
mod schemas;
mod trials;

pub use aggregate::{AggregateTrialsTool, Group, collect_trials, group_trials};
pub use compare::{CompareTrialsTool, compare_value};
pub use pubmed::SearchPubmedTool;
pub use trials::{
    GetTrialDetailsTool, GetTrialEndpointsTool, GetTrialTool, SearchTrialsTool, TrialsPage,
    fetch_full_record, search_page,
};

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::RegistryClient;
use crate::config::Limits;
use crate::error::{ToolError, ToolResult};
use crate::formatters;

/// Tool execution context.
pub struct ToolContext {
    /// Upstream client.
    pub client: Arc<RegistryClient>,

    /// Policy limits.
    pub limits: Limits,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(client: Arc<RegistryClient>, limits: Limits) -> Self {
        Self { client, limits }
    }
}

impl std::fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolContext").field("limits", &self.limits).finish_non_exhaustive()
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "search_trials").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> Value;

    /// Execute the tool with given input, returning the `data` payload.
    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<Value>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Registry search and lookup (4)
        Box::new(trials::SearchTrialsTool),
        Box::new(trials::GetTrialTool),
        Box::new(trials::GetTrialDetailsTool),
        Box::new(trials::GetTrialEndpointsTool),

        // Multi-record analysis (2)
        Box::new(compare::CompareTrialsTool),
        Box::new(aggregate::AggregateTrialsTool),

        // Literature (1)
        Box::new(pubmed::SearchPubmedTool),
    ]
}

/// Deserialize tool arguments.
///
/// # Errors
///
/// `INVALID_ARGUMENT` carrying the deserializer message.
pub fn parse_input<T: DeserializeOwned>(input: Value) -> ToolResult<T> {
    let input = if input.is_null() { Value::Object(serde_json::Map::new()) } else { input };
    serde_json::from_value(input).map_err(|err| ToolError::invalid_argument(err.to_string()))
}

/// Run a tool and wrap the outcome in the result envelope.
///
/// Never fails: panics inside the tool become `INTERNAL_ERROR`. Emits one
/// log line per call.
pub async fn call_tool(tool: &dyn McpTool, ctx: &ToolContext, args: Value) -> Value {
    let started = Instant::now();
    let args_summary = formatters::log::summarize_args(&args);

    let result = match AssertUnwindSafe(tool.execute(ctx, args)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(ToolError::internal(panic_message(panic.as_ref()))),
    };

    let envelope = formatters::json::envelope(&result);
    let bytes = serde_json::to_string(&envelope).map(|s| s.len()).unwrap_or_default();
    let elapsed_ms = started.elapsed().as_millis();
    let summary = formatters::log::summarize_result(&result);

    match &result {
        Ok(_) => tracing::info!(
            tool = tool.name(),
            elapsed_ms,
            bytes,
            args = %args_summary,
            result = %summary,
            "tool call"
        ),
        Err(_) => tracing::warn!(
            tool = tool.name(),
            elapsed_ms,
            bytes,
            args = %args_summary,
            result = %summary,
            "tool call"
        ),
    }

    envelope
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "tool panicked".to_string()
    }
}
