//! Stdio transport for MCP protocol.
//!
//! Handles JSON-RPC 2.0 over stdin/stdout, one message per line.

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::rpc::{JsonRpcRequest, JsonRpcResponse, handle_request};
use crate::tools::{McpTool, ToolContext};

/// Handle MCP protocol over stdio.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn run_stdio(tools: Vec<Box<dyn McpTool>>, ctx: ToolContext) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    serve_lines(reader, tokio::io::stdout(), &tools, &ctx).await
}

/// Serve JSON-RPC lines from `reader` until EOF, writing responses to `writer`.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn serve_lines<R, W>(
    reader: R,
    mut writer: W,
    tools: &[Box<dyn McpTool>],
    ctx: &ToolContext,
) -> anyhow::Result<()>
where
    R: AsyncBufReadExt + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    tracing::info!("MCP stdio server ready, waiting for requests...");

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => handle_request(&request, tools, ctx).await,
            Err(e) => Some(JsonRpcResponse::error(
                None,
                JsonRpcResponse::PARSE_ERROR,
                format!("Parse error: {e}"),
            )),
        };

        if let Some(response) = response {
            let response_json = serde_json::to_string(&response)?;
            writer.write_all(response_json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    tracing::info!("Stdin closed, shutting down");
    Ok(())
}
