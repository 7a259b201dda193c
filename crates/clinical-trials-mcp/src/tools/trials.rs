//! Registry tools: search_trials, get_trial, get_trial_details, get_trial_endpoints.

use serde_json::{Value, json};

use super::{McpTool, ToolContext, parse_input, schemas};
use crate::error::{ErrorCode, ToolError, ToolResult, UpstreamService};
use crate::models::{FullTrialRecord, SearchTrialsInput, TrialIdInput, TrialSummary};
use crate::normalize::{full_trial_record, is_valid_nct_id, trial_summary};
use crate::query::build_trial_query;

/// One normalized page of registry search results.
#[derive(Debug, Clone)]
pub struct TrialsPage {
    pub trials: Vec<TrialSummary>,
    /// Page size actually requested.
    pub page_size: u32,
    /// Continuation token, present only when non-blank.
    pub next_page_token: Option<String>,
}

/// Run one registry search page and normalize it.
///
/// # Errors
///
/// Query construction failures and upstream failures.
pub async fn search_page(ctx: &ToolContext, input: &SearchTrialsInput) -> ToolResult<TrialsPage> {
    let query = build_trial_query(input, &ctx.limits)?;
    let response = ctx.client.search_studies(&query).await?;

    let studies = response.get("studies").and_then(Value::as_array);
    let trials = studies.into_iter().flatten().filter_map(trial_summary).collect();
    let next_page_token = response
        .get("nextPageToken")
        .and_then(Value::as_str)
        .filter(|token| !token.trim().is_empty())
        .map(str::to_string);

    Ok(TrialsPage { trials, page_size: query.page_size, next_page_token })
}

/// Fetch and normalize one full record.
///
/// # Errors
///
/// `INVALID_ARGUMENT` for a malformed identifier, upstream failures, and
/// `UPSTREAM_ERROR` when the record does not normalize.
pub async fn fetch_full_record(ctx: &ToolContext, nct_id: &str) -> ToolResult<FullTrialRecord> {
    let nct_id = nct_id.trim();
    if !is_valid_nct_id(nct_id) {
        return Err(ToolError::invalid_argument("nct_id must match NCT followed by 8 digits")
            .with_context("nct_id", nct_id));
    }

    let raw = ctx.client.get_study(nct_id).await.map_err(|err| err.with_context("nct_id", nct_id))?;

    full_trial_record(&raw).ok_or_else(|| {
        ToolError::upstream(
            ErrorCode::UpstreamError,
            UpstreamService::ClinicaltrialsGov,
            ctx.client.study_endpoint(nct_id),
        )
        .with_context("reason", "Normalization returned empty record")
        .with_context("nct_id", nct_id)
    })
}

async fn record_from_input(ctx: &ToolContext, input: Value) -> ToolResult<FullTrialRecord> {
    let params: TrialIdInput = parse_input(input)?;
    fetch_full_record(ctx, &params.nct_id).await
}

/// Trial search tool.
pub struct SearchTrialsTool;

#[async_trait::async_trait]
impl McpTool for SearchTrialsTool {
    fn name(&self) -> &'static str {
        "search_trials"
    }

    fn description(&self) -> &'static str {
        "Search ClinicalTrials.gov with structured filters (condition, phases, statuses, \
         sponsor, countries, date ranges). Returns normalized trial summaries and a \
         continuation token."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filters": schemas::trial_filters(),
                "page_size": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 100,
                    "default": 25
                },
                "page_token": {
                    "type": "string",
                    "description": "next_page_token from a previous call"
                },
                "sort": {
                    "type": "object",
                    "properties": {
                        "field": {
                            "type": "string",
                            "enum": [
                                "RELEVANCE",
                                "LAST_UPDATE_POSTED",
                                "FIRST_POSTED",
                                "START_DATE",
                                "PRIMARY_COMPLETION_DATE",
                                "COMPLETION_DATE"
                            ]
                        },
                        "direction": {"type": "string", "enum": ["ASC", "DESC"], "default": "DESC"}
                    },
                    "additionalProperties": false
                },
                "include_fields": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "enum": [
                            "NCT_ID",
                            "TITLES",
                            "OVERALL_STATUS",
                            "PHASES",
                            "STUDY_TYPE",
                            "ENROLLMENT",
                            "SPONSORS",
                            "CONDITIONS",
                            "INTERVENTIONS",
                            "COUNTRIES",
                            "FIRST_POSTED",
                            "LAST_UPDATE_POSTED",
                            "START_DATE",
                            "PRIMARY_COMPLETION_DATE",
                            "COMPLETION_DATE"
                        ]
                    }
                }
            },
            "required": ["filters"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<Value> {
        let params: SearchTrialsInput = parse_input(input)?;
        let page = search_page(ctx, &params).await?;

        let mut page_info = serde_json::Map::new();
        page_info.insert("page_size".into(), Value::from(page.page_size));
        if let Some(token) = page.next_page_token {
            page_info.insert("next_page_token".into(), Value::from(token));
        }

        Ok(json!({
            "trials": page.trials,
            "page": page_info,
        }))
    }
}

/// Full record lookup tool.
pub struct GetTrialTool;

#[async_trait::async_trait]
impl McpTool for GetTrialTool {
    fn name(&self) -> &'static str {
        "get_trial"
    }

    fn description(&self) -> &'static str {
        "Fetch one trial by NCT identifier as a full normalized record: design, arms, \
         eligibility and outcome measures."
    }

    fn input_schema(&self) -> Value {
        schemas::nct_id_input()
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<Value> {
        let record = record_from_input(ctx, input).await?;
        Ok(json!({ "trial": record }))
    }
}

/// Full record without outcome measures.
pub struct GetTrialDetailsTool;

#[async_trait::async_trait]
impl McpTool for GetTrialDetailsTool {
    fn name(&self) -> &'static str {
        "get_trial_details"
    }

    fn description(&self) -> &'static str {
        "Fetch one trial's normalized record without its outcome measures."
    }

    fn input_schema(&self) -> Value {
        schemas::nct_id_input()
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<Value> {
        let record = record_from_input(ctx, input).await?;
        let mut trial = serde_json::to_value(record)?;
        if let Some(obj) = trial.as_object_mut() {
            obj.remove("outcomes");
        }
        Ok(json!({ "trial": trial }))
    }
}

/// Outcome measures only.
pub struct GetTrialEndpointsTool;

#[async_trait::async_trait]
impl McpTool for GetTrialEndpointsTool {
    fn name(&self) -> &'static str {
        "get_trial_endpoints"
    }

    fn description(&self) -> &'static str {
        "List a trial's classified outcome measures (primary, then secondary, then other)."
    }

    fn input_schema(&self) -> Value {
        schemas::nct_id_input()
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<Value> {
        let record = record_from_input(ctx, input).await?;
        Ok(json!({
            "nct_id": record.summary.nct_id,
            "outcomes": record.outcomes,
        }))
    }
}
