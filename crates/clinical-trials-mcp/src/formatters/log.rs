//! Bounded summaries of tool arguments and results for log lines.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ToolResult;

const MAX_STRING_CHARS: usize = 120;
const MAX_ARRAY_ITEMS: usize = 10;
const MAX_OBJECT_KEYS: usize = 30;
const MAX_DEPTH: usize = 4;
const MAX_SUMMARY_CHARS: usize = 900;

static SECRET_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(^|_)(api_?key|token|secret|password|auth|authorization|cookie|session)(_|$)")
        .expect("valid secret key pattern")
});

/// Compact JSON rendering of tool arguments.
///
/// Long strings become `<string len=N>`, deep structures collapse to their
/// size, secret-looking keys are redacted.
#[must_use]
pub fn summarize_args(args: &Value) -> String {
    let text = summarize_value(args, 0).to_string();
    if text.chars().count() <= MAX_SUMMARY_CHARS {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_SUMMARY_CHARS).collect();
    cut.push('…');
    cut
}

fn summarize_value(value: &Value, depth: usize) -> Value {
    match value {
        Value::String(s) => {
            let collapsed = s.split_whitespace().collect::<Vec<_>>().join(" ");
            let len = collapsed.chars().count();
            if len <= MAX_STRING_CHARS {
                Value::String(collapsed)
            } else {
                Value::String(format!("<string len={len}>"))
            }
        }
        Value::Array(items) => {
            if depth >= MAX_DEPTH {
                return Value::String(format!("<array len={}>", items.len()));
            }
            let mut head: Vec<Value> =
                items.iter().take(MAX_ARRAY_ITEMS).map(|v| summarize_value(v, depth + 1)).collect();
            if items.len() > MAX_ARRAY_ITEMS {
                head.push(Value::String(format!("<… +{} items>", items.len() - MAX_ARRAY_ITEMS)));
            }
            Value::Array(head)
        }
        Value::Object(obj) => {
            if depth >= MAX_DEPTH {
                return Value::String(format!("<object keys={}>", obj.len()));
            }
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();

            let mut out = Map::new();
            for key in keys.iter().take(MAX_OBJECT_KEYS) {
                let summary = if SECRET_KEY_RE.is_match(key) {
                    Value::String("<redacted>".into())
                } else {
                    summarize_value(&obj[key.as_str()], depth + 1)
                };
                out.insert((*key).clone(), summary);
            }
            if keys.len() > MAX_OBJECT_KEYS {
                out.insert("<…>".into(), Value::String(format!("+{} keys", keys.len() - MAX_OBJECT_KEYS)));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// One-phrase description of a tool outcome, e.g. `ok trials=3` or
/// `error code=NOT_FOUND http=404 upstream=CLINICALTRIALS_GOV`.
#[must_use]
pub fn summarize_result(result: &ToolResult<Value>) -> String {
    match result {
        Ok(Value::Object(data)) => {
            let count = |key: &str| data.get(key).and_then(Value::as_array).map(Vec::len);
            if let Some(n) = count("trials") {
                format!("ok trials={n}")
            } else if data.get("trial").is_some_and(Value::is_object) {
                "ok trial=1".to_string()
            } else if let Some(n) = count("citations") {
                format!("ok citations={n}")
            } else if let Some(n) = count("groups") {
                format!("ok groups={n}")
            } else if let Some(n) = count("comparisons") {
                format!("ok comparisons={n}")
            } else if let Some(n) = count("outcomes") {
                format!("ok outcomes={n}")
            } else {
                format!("ok keys={}", data.len())
            }
        }
        Ok(_) => "ok".to_string(),
        Err(err) => {
            let mut parts = vec![format!("error code={}", err.code)];
            if let Some(status) = err.http_status {
                parts.push(format!("http={status}"));
            }
            if let Some(upstream) = &err.upstream {
                parts.push(format!("upstream={}", upstream.service));
            }
            parts.join(" ")
        }
    }
}
