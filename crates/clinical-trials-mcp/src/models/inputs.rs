//! Input models for MCP tool parameters.
//!
//! Numeric knobs (`page_size`, `limit`, `retmax`) are kept as raw JSON so a
//! non-integer value falls back to the default instead of failing the call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    AggregateMetric, CompareAttribute, GroupByKey, OverallStatus, Phase, PubmedSort,
    SortDirection, StudyType, TrialIncludeField, TrialsSortField,
};

/// Structured trial filters shared by search and aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrialFilters {
    /// Condition or disease, sent as the condition query.
    #[serde(default)]
    pub indication: Option<String>,

    /// Free-text term, supports the registry's essie syntax.
    #[serde(default)]
    pub query_term: Option<String>,

    #[serde(default)]
    pub phases: Vec<Phase>,

    #[serde(default)]
    pub overall_statuses: Vec<OverallStatus>,

    #[serde(default)]
    pub study_type: Option<StudyType>,

    /// Matched against lead sponsor and collaborator names.
    #[serde(default)]
    pub sponsor_or_collaborator: Option<String>,

    /// ISO alpha-2 codes or country names.
    #[serde(default)]
    pub countries: Vec<String>,

    #[serde(default)]
    pub last_update_posted_from: Option<String>,
    #[serde(default)]
    pub last_update_posted_to: Option<String>,

    #[serde(default)]
    pub first_posted_from: Option<String>,
    #[serde(default)]
    pub first_posted_to: Option<String>,

    #[serde(default)]
    pub start_date_from: Option<String>,
    #[serde(default)]
    pub start_date_to: Option<String>,

    #[serde(default)]
    pub primary_completion_date_from: Option<String>,
    #[serde(default)]
    pub primary_completion_date_to: Option<String>,

    #[serde(default)]
    pub completion_date_from: Option<String>,
    #[serde(default)]
    pub completion_date_to: Option<String>,
}

/// Sort selection for trial search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrialsSort {
    #[serde(default)]
    pub field: TrialsSortField,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Input for `search_trials`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchTrialsInput {
    #[serde(default)]
    pub filters: TrialFilters,

    /// Integer in `[1, 100]`, default 25.
    #[serde(default)]
    pub page_size: Option<Value>,

    /// Continuation token from a previous page.
    #[serde(default)]
    pub page_token: Option<String>,

    #[serde(default)]
    pub sort: Option<TrialsSort>,

    /// Field groups to fetch. Absent means every summary group.
    #[serde(default)]
    pub include_fields: Option<Vec<TrialIncludeField>>,
}

/// Input for the single-record tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrialIdInput {
    pub nct_id: String,
}

/// Input for `compare_trials`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareTrialsInput {
    pub nct_ids: Vec<String>,
    pub attributes: Vec<CompareAttribute>,
}

/// Sort selection for aggregation groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateSort {
    pub metric: AggregateMetric,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Input for `aggregate_trials`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateTrialsInput {
    #[serde(default)]
    pub filters: TrialFilters,

    /// Exactly one dimension.
    pub group_by: Vec<GroupByKey>,

    pub metrics: Vec<AggregateMetric>,

    /// Integer in `[1, 500]`, default 50.
    #[serde(default)]
    pub limit: Option<Value>,

    #[serde(default)]
    pub sort: Option<AggregateSort>,
}

/// Input for `search_pubmed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchPubmedInput {
    /// Trial identifier to find linked literature for.
    #[serde(default)]
    pub nct_id: Option<String>,

    /// Free-text Entrez query, used when `nct_id` is absent.
    #[serde(default)]
    pub query: Option<String>,

    /// Integer in `[1, 200]`. Omitted when not an integer.
    #[serde(default)]
    pub retmax: Option<Value>,

    #[serde(default)]
    pub sort: Option<PubmedSort>,
}
