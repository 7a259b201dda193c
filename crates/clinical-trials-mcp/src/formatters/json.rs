//! The `{ ok, data | error }` result envelope.

use serde_json::{Value, json};

use crate::error::ToolResult;

/// Wrap a tool outcome in the result envelope.
#[must_use]
pub fn envelope(result: &ToolResult<Value>) -> Value {
    match result {
        Ok(data) => json!({ "ok": true, "data": data }),
        Err(err) => json!({ "ok": false, "error": err.to_json() }),
    }
}
