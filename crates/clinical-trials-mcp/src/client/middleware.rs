//! Request logging middleware for the outbound HTTP client.

use std::time::Instant;

use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Logs method, URL, status and latency of every outbound request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMiddleware;

#[async_trait::async_trait]
impl Middleware for TracingMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();
        let started = Instant::now();

        tracing::debug!(%method, %url, "upstream request");
        let result = next.run(req, extensions).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    tracing::debug!(%method, %url, status, elapsed_ms, "upstream response");
                } else {
                    tracing::warn!(%method, %url, status, elapsed_ms, "upstream error status");
                }
            }
            Err(err) => {
                tracing::warn!(%method, %url, elapsed_ms, error = %err, "upstream request failed");
            }
        }

        result
    }
}
