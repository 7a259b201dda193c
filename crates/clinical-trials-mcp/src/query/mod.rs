//! Query builders for both upstreams.

mod pubmed;
mod trials;

use serde_json::Value;

pub use pubmed::{PubmedSearch, build_pubmed_search};
pub use trials::{TrialQuery, build_trial_query, field_paths, filter_clauses, resolve_countries};

/// Integer view of a JSON number. Floats count only when they have no
/// fractional part.
#[must_use]
pub fn integer_value(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
        }),
        _ => None,
    }
}

/// Clamp an integer into `[min, max]`, using `default` for anything else.
#[must_use]
pub fn clamp_integer(value: Option<&Value>, min: i64, max: i64, default: i64) -> i64 {
    integer_value(value).unwrap_or(default).clamp(min, max)
}
