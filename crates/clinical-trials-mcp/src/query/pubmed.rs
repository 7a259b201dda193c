//! Literature search term construction.

use serde::Serialize;

use super::integer_value;
use crate::config::Limits;
use crate::error::{ToolError, ToolResult};
use crate::models::{PubmedSort, SearchPubmedInput};
use crate::normalize::is_valid_nct_id;

/// An esearch request, also echoed back as `query_used`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PubmedSearch {
    pub term: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retmax: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<PubmedSort>,
}

impl PubmedSearch {
    /// Query-string pairs for `esearch.fcgi`.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", self.term.clone()),
            ("retmode", "json".to_string()),
        ];
        if let Some(retmax) = self.retmax {
            params.push(("retmax", retmax.to_string()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort", sort.as_upstream().to_string()));
        }
        params
    }
}

/// Build the esearch request for a tool call.
///
/// # Errors
///
/// `INVALID_ARGUMENT` when neither a trial id nor a query is given, or the
/// trial id is malformed.
pub fn build_pubmed_search(input: &SearchPubmedInput, limits: &Limits) -> ToolResult<PubmedSearch> {
    let nct_id = input.nct_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let query = input.query.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let term = match (nct_id, query) {
        (Some(id), _) if !is_valid_nct_id(id) => {
            return Err(ToolError::invalid_argument("nct_id must match NCT followed by 8 digits")
                .with_context("nct_id", id));
        }
        (Some(id), _) => format!("{id}[All Fields]"),
        (None, Some(query)) => query.to_string(),
        (None, None) => return Err(ToolError::invalid_argument("nct_id or query is required")),
    };

    let retmax = integer_value(input.retmax.as_ref())
        .map(|n| n.clamp(1, i64::from(limits.max_pubmed_retmax)))
        .and_then(|n| u32::try_from(n).ok());

    Ok(PubmedSearch { term, retmax, sort: input.sort })
}
