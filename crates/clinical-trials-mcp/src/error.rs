//! Error types for the clinical trials MCP server.
//!
//! Every failure the core can produce is a [`ToolError`] carrying one code from
//! the closed [`ErrorCode`] taxonomy. Retryability is derived from the code and
//! never chosen by the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of characters of an upstream body kept in error context.
pub const BODY_EXCERPT_CHARS: usize = 2_000;

/// Closed error taxonomy returned in the `error.code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed, oversized or contradictory input.
    InvalidArgument,
    /// Upstream answered 404.
    NotFound,
    /// Upstream 5xx, malformed body, or an empty normalization result.
    UpstreamError,
    /// Upstream answered 429.
    RateLimited,
    /// Local deadline exceeded.
    Timeout,
    /// Unexpected local failure.
    InternalError,
}

impl ErrorCode {
    /// Returns true if a caller may retry the same request.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::UpstreamError | Self::Timeout)
    }

    /// Wire representation of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::RateLimited => "RATE_LIMITED",
            Self::Timeout => "TIMEOUT",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream services this server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpstreamService {
    /// ClinicalTrials.gov v2 API.
    ClinicaltrialsGov,
    /// NCBI E-utilities (PubMed).
    Pubmed,
}

impl UpstreamService {
    /// Wire representation of the service tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClinicaltrialsGov => "CLINICALTRIALS_GOV",
            Self::Pubmed => "PUBMED",
        }
    }
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which upstream endpoint produced an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upstream {
    /// Service tag.
    pub service: UpstreamService,
    /// Full request URL.
    pub endpoint: String,
}

/// A failed tool call.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{code}{}", self.describe())]
pub struct ToolError {
    /// Error code.
    pub code: ErrorCode,
    /// HTTP status from upstream, when one was received.
    pub http_status: Option<u16>,
    /// Upstream endpoint that failed.
    pub upstream: Option<Upstream>,
    /// Diagnostic context (offending identifier, body excerpt, reason).
    pub context: Map<String, Value>,
}

impl ToolError {
    /// Create an error with the given code and no context.
    #[must_use]
    pub fn new(code: ErrorCode) -> Self {
        Self { code, http_status: None, upstream: None, context: Map::new() }
    }

    /// Create an invalid argument error with a reason.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument).with_context("reason", reason.into())
    }

    /// Create an internal error with a message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError).with_context("error", message.into())
    }

    /// Create an upstream error attributed to an endpoint.
    #[must_use]
    pub fn upstream(code: ErrorCode, service: UpstreamService, endpoint: impl Into<String>) -> Self {
        Self::new(code).with_upstream(service, endpoint)
    }

    /// Attach the upstream endpoint.
    #[must_use]
    pub fn with_upstream(mut self, service: UpstreamService, endpoint: impl Into<String>) -> Self {
        self.upstream = Some(Upstream { service, endpoint: endpoint.into() });
        self
    }

    /// Attach the upstream HTTP status.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    /// Add a context entry, overwriting any previous value for the key.
    #[must_use]
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    /// Retryability follows from the code.
    #[must_use]
    pub const fn retryable(&self) -> bool {
        self.code.is_retryable()
    }

    /// JSON shape of the `error` member of a failed envelope.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("code".into(), Value::from(self.code.as_str()));
        obj.insert("retryable".into(), Value::Bool(self.retryable()));
        if let Some(status) = self.http_status {
            obj.insert("http_status".into(), Value::from(status));
        }
        if let Some(upstream) = &self.upstream {
            obj.insert(
                "upstream".into(),
                serde_json::json!({
                    "service": upstream.service.as_str(),
                    "endpoint": upstream.endpoint,
                }),
            );
        }
        if !self.context.is_empty() {
            obj.insert("context".into(), Value::Object(self.context.clone()));
        }
        Value::Object(obj)
    }

    fn describe(&self) -> String {
        let mut out = String::new();
        if let Some(status) = self.http_status {
            out.push_str(&format!(" (HTTP {status})"));
        }
        if let Some(upstream) = &self.upstream {
            out.push_str(&format!(" from {}", upstream.service));
        }
        if let Some(reason) = self.context.get("reason").and_then(Value::as_str) {
            out.push_str(&format!(": {reason}"));
        }
        out
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err.to_string())
    }
}

/// Truncate an upstream body to [`BODY_EXCERPT_CHARS`] characters.
#[must_use]
pub fn body_excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
