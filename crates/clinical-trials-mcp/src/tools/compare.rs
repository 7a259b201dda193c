//! Side-by-side comparison of several trials.

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::{Value, json};

use super::{McpTool, ToolContext, fetch_full_record, parse_input};
use crate::error::{ToolError, ToolResult};
use crate::models::{CompareAttribute, CompareTrialsInput, FullTrialRecord, OutcomeType};
use crate::normalize::is_valid_nct_id;

/// Trial comparison tool.
pub struct CompareTrialsTool;

#[async_trait::async_trait]
impl McpTool for CompareTrialsTool {
    fn name(&self) -> &'static str {
        "compare_trials"
    }

    fn description(&self) -> &'static str {
        "Compare two or more trials attribute by attribute. Fetches each record \
         concurrently; any failed lookup fails the whole comparison."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "nct_ids": {
                    "type": "array",
                    "items": {"type": "string", "pattern": "^NCT\\d{8}$"},
                    "minItems": 2
                },
                "attributes": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "enum": [
                            "PHASES",
                            "OVERALL_STATUS",
                            "ENROLLMENT",
                            "LEAD_SPONSOR",
                            "COLLABORATORS",
                            "CONDITIONS",
                            "INTERVENTIONS",
                            "ARMS",
                            "ELIGIBILITY",
                            "OUTCOMES_PRIMARY",
                            "OUTCOMES_SECONDARY",
                            "START_DATE",
                            "PRIMARY_COMPLETION_DATE",
                            "COMPLETION_DATE",
                            "COUNTRIES"
                        ]
                    },
                    "minItems": 1
                }
            },
            "required": ["nct_ids", "attributes"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<Value> {
        let params: CompareTrialsInput = parse_input(input)?;
        let nct_ids = distinct_ids(&params.nct_ids)?;

        if nct_ids.len() < 2 {
            return Err(ToolError::invalid_argument("at least two distinct nct_ids are required"));
        }
        if params.attributes.is_empty() {
            return Err(ToolError::invalid_argument("at least one attribute is required"));
        }

        let records = try_join_all(nct_ids.iter().map(|id| fetch_full_record(ctx, id))).await?;

        let mut comparisons = Vec::with_capacity(params.attributes.len());
        for &attribute in &params.attributes {
            let mut values = Vec::with_capacity(records.len());
            for record in &records {
                values.push(json!({
                    "nct_id": record.summary.nct_id,
                    "value": compare_value(record, attribute)?,
                }));
            }
            comparisons.push(json!({ "attribute": attribute, "values": values }));
        }

        Ok(json!({
            "nct_ids": nct_ids,
            "comparisons": comparisons,
        }))
    }
}

/// Trimmed, validated, order-preserving distinct identifiers.
fn distinct_ids(raw: &[String]) -> ToolResult<Vec<String>> {
    let mut ids: Vec<String> = Vec::with_capacity(raw.len());
    for id in raw.iter().map(|id| id.trim()).filter(|id| !id.is_empty()) {
        if !is_valid_nct_id(id) {
            return Err(ToolError::invalid_argument("nct_id must match NCT followed by 8 digits")
                .with_context("nct_id", id));
        }
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Value of one attribute for one record. Absent attributes are `null`,
/// outcome attributes are always arrays.
///
/// # Errors
///
/// Only if serialization fails.
pub fn compare_value(record: &FullTrialRecord, attribute: CompareAttribute) -> ToolResult<Value> {
    let summary = &record.summary;
    let value = match attribute {
        CompareAttribute::Phases => list(&summary.phases)?,
        CompareAttribute::OverallStatus => optional(summary.overall_status.as_ref())?,
        CompareAttribute::Enrollment => optional(summary.enrollment.as_ref())?,
        CompareAttribute::LeadSponsor => optional(summary.lead_sponsor.as_ref())?,
        CompareAttribute::Collaborators => list(&summary.collaborators)?,
        CompareAttribute::Conditions => list(&summary.conditions)?,
        CompareAttribute::Interventions => list(&summary.interventions)?,
        CompareAttribute::Arms => list(&record.arms)?,
        CompareAttribute::Eligibility => optional(record.eligibility.as_ref())?,
        CompareAttribute::OutcomesPrimary => outcomes(record, OutcomeType::Primary)?,
        CompareAttribute::OutcomesSecondary => outcomes(record, OutcomeType::Secondary)?,
        CompareAttribute::StartDate => optional(summary.start_date.as_ref())?,
        CompareAttribute::PrimaryCompletionDate => {
            optional(summary.primary_completion_date.as_ref())?
        }
        CompareAttribute::CompletionDate => optional(summary.completion_date.as_ref())?,
        CompareAttribute::Countries => list(&summary.countries)?,
    };
    Ok(value)
}

fn optional<T: Serialize>(value: Option<&T>) -> ToolResult<Value> {
    Ok(value.map(serde_json::to_value).transpose()?.unwrap_or(Value::Null))
}

fn list<T: Serialize>(items: &[T]) -> ToolResult<Value> {
    if items.is_empty() { Ok(Value::Null) } else { Ok(serde_json::to_value(items)?) }
}

fn outcomes(record: &FullTrialRecord, kind: OutcomeType) -> ToolResult<Value> {
    let matching: Vec<_> = record.outcomes.iter().filter(|o| o.kind == kind).collect();
    Ok(serde_json::to_value(matching)?)
}
