//! Normalization of upstream JSON into canonical records.
//!
//! Every accessor tolerates missing or mistyped structure: a missing object
//! reads as `null`, a missing array as empty. Normalizers never panic.

mod citation;
pub mod countries;
mod trial;

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

pub use citation::{citation, esearch_ids, esummary_citations};
pub use countries::{CountryTable, country_table, normalize_country_name};
pub use trial::{REGISTRY_TAG, full_trial_record, trial_summary};

static NCT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^NCT\d{8}$").expect("valid NCT id pattern"));

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid ISO date pattern"));

static NULL: Value = Value::Null;

/// True for registry identifiers: `NCT` followed by eight digits.
#[must_use]
pub fn is_valid_nct_id(id: &str) -> bool {
    NCT_ID_RE.is_match(id)
}

/// True for `YYYY-MM-DD` strings.
#[must_use]
pub fn is_iso_date(value: &str) -> bool {
    ISO_DATE_RE.is_match(value)
}

pub(crate) fn field<'a>(value: &'a Value, key: &str) -> &'a Value {
    value.get(key).unwrap_or(&NULL)
}

pub(crate) fn array(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// A string with non-whitespace content, returned untrimmed.
pub(crate) fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

/// Non-empty strings in first-seen order, exact duplicates removed.
pub(crate) fn unique_strings<'a>(values: impl IntoIterator<Item = &'a Value>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if let Some(s) = non_empty_str(value)
            && !out.iter().any(|seen| seen == s)
        {
            out.push(s.to_string());
        }
    }
    out
}
