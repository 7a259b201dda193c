//! Bounded aggregation over paginated registry searches.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde_json::{Value, json};

use super::{McpTool, ToolContext, parse_input, schemas, search_page};
use crate::error::{ToolError, ToolResult};
use crate::models::{
    AggregateTrialsInput, GroupByKey, SearchTrialsInput, SortDirection, TrialFilters,
    TrialIncludeField, TrialSummary,
};
use crate::query::clamp_integer;

/// One aggregation bucket. `value == None` is the unassigned bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub value: Option<String>,
    pub count: usize,
}

/// Trial aggregation tool.
pub struct AggregateTrialsTool;

#[async_trait::async_trait]
impl McpTool for AggregateTrialsTool {
    fn name(&self) -> &'static str {
        "aggregate_trials"
    }

    fn description(&self) -> &'static str {
        "Count trials matching filters, grouped by phase, status, lead sponsor, country, \
         or posting month. Scans at most 500 trials."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "filters": schemas::trial_filters(),
                "group_by": {
                    "type": "array",
                    "items": {
                        "type": "string",
                        "enum": [
                            "PHASE",
                            "OVERALL_STATUS",
                            "LEAD_SPONSOR",
                            "COUNTRY",
                            "FIRST_POSTED_MONTH",
                            "LAST_UPDATE_POSTED_MONTH"
                        ]
                    },
                    "minItems": 1,
                    "maxItems": 1
                },
                "metrics": {
                    "type": "array",
                    "items": {"type": "string", "enum": ["COUNT_TRIALS"]},
                    "minItems": 1
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "maximum": 500,
                    "default": 50
                },
                "sort": {
                    "type": "object",
                    "properties": {
                        "metric": {"type": "string", "enum": ["COUNT_TRIALS"]},
                        "direction": {"type": "string", "enum": ["ASC", "DESC"], "default": "DESC"}
                    },
                    "required": ["metric"],
                    "additionalProperties": false
                }
            },
            "required": ["filters", "group_by", "metrics"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: Value) -> ToolResult<Value> {
        let params: AggregateTrialsInput = parse_input(input)?;

        let key = match params.group_by.as_slice() {
            [key] => *key,
            _ => return Err(ToolError::invalid_argument("group_by must contain exactly one key")),
        };
        if params.metrics.is_empty() {
            return Err(ToolError::invalid_argument("metrics must not be empty"));
        }

        let limits = &ctx.limits;
        let limit = clamp_integer(
            params.limit.as_ref(),
            1,
            i64::try_from(limits.max_aggregate_limit).unwrap_or(i64::MAX),
            i64::try_from(limits.default_aggregate_limit).unwrap_or(1),
        );
        let limit = usize::try_from(limit).unwrap_or(limits.default_aggregate_limit);
        let direction = params.sort.map(|s| s.direction).unwrap_or_default();

        let trials = collect_trials(ctx, &params.filters, key).await?;
        let groups = group_trials(&trials, key, direction, limit);

        let groups: Vec<Value> = groups
            .into_iter()
            .map(|group| {
                json!({
                    "group": { "key": key, "value": group.value },
                    "metrics": { "count_trials": group.count },
                })
            })
            .collect();

        Ok(json!({
            "group_by": params.group_by,
            "metrics": params.metrics,
            "groups": groups,
            "total_trials": trials.len(),
        }))
    }
}

const fn include_groups(key: GroupByKey) -> &'static [TrialIncludeField] {
    match key {
        GroupByKey::Phase => &[TrialIncludeField::NctId, TrialIncludeField::Phases],
        GroupByKey::OverallStatus => &[TrialIncludeField::NctId, TrialIncludeField::OverallStatus],
        GroupByKey::LeadSponsor => &[TrialIncludeField::NctId, TrialIncludeField::Sponsors],
        GroupByKey::Country => &[TrialIncludeField::NctId, TrialIncludeField::Countries],
        GroupByKey::FirstPostedMonth => &[TrialIncludeField::NctId, TrialIncludeField::FirstPosted],
        GroupByKey::LastUpdatePostedMonth => {
            &[TrialIncludeField::NctId, TrialIncludeField::LastUpdatePosted]
        }
    }
}

/// Page through a search until the record cap, the page budget, a page
/// with no normalizable trials, or an exhausted or repeated continuation
/// token.
///
/// # Errors
///
/// The first page failure aborts collection.
pub async fn collect_trials(
    ctx: &ToolContext,
    filters: &TrialFilters,
    key: GroupByKey,
) -> ToolResult<Vec<TrialSummary>> {
    let cap = ctx.limits.max_aggregate_trials;
    let budget = ctx.limits.aggregate_page_budget();
    let mut collected: Vec<TrialSummary> = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0_usize;

    while collected.len() < cap && pages < budget {
        let input = SearchTrialsInput {
            filters: filters.clone(),
            page_size: Some(Value::from(ctx.limits.aggregate_page_size)),
            page_token: token.clone(),
            sort: None,
            include_fields: Some(include_groups(key).to_vec()),
        };
        let page = search_page(ctx, &input).await?;
        pages += 1;

        if page.trials.is_empty() {
            break;
        }
        collected.extend(page.trials);

        match page.next_page_token {
            Some(next) if token.as_deref() != Some(next.as_str()) => token = Some(next),
            _ => break,
        }
    }

    collected.truncate(cap);
    tracing::debug!(pages, trials = collected.len(), "aggregation scan complete");
    Ok(collected)
}

/// Distinct values a trial contributes to for one dimension.
fn group_values(trial: &TrialSummary, key: GroupByKey) -> Vec<String> {
    let mut values: Vec<String> = match key {
        GroupByKey::Phase => trial.phases.iter().map(|p| p.as_str().to_string()).collect(),
        GroupByKey::OverallStatus => {
            trial.overall_status.iter().map(|s| s.as_str().to_string()).collect()
        }
        GroupByKey::LeadSponsor => trial.lead_sponsor.iter().map(|s| s.name.clone()).collect(),
        GroupByKey::Country => trial.countries.iter().map(|c| c.code.clone()).collect(),
        GroupByKey::FirstPostedMonth => month(trial.first_posted.as_deref()).into_iter().collect(),
        GroupByKey::LastUpdatePostedMonth => {
            month(trial.last_update_posted.as_deref()).into_iter().collect()
        }
    };
    let mut seen = HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
    values
}

fn month(date: Option<&str>) -> Option<String> {
    date.and_then(|d| d.get(..7)).map(str::to_string)
}

/// Count trials per group, sort, and keep the first `limit` groups.
///
/// Counts order by `direction`, ties by ascending value. The unassigned
/// group is always last.
#[must_use]
pub fn group_trials(
    trials: &[TrialSummary],
    key: GroupByKey,
    direction: SortDirection,
    limit: usize,
) -> Vec<Group> {
    let mut counts: HashMap<Option<String>, usize> = HashMap::new();
    for trial in trials {
        let values = group_values(trial, key);
        if values.is_empty() {
            *counts.entry(None).or_default() += 1;
        }
        for value in values {
            *counts.entry(Some(value)).or_default() += 1;
        }
    }

    let mut groups: Vec<Group> =
        counts.into_iter().map(|(value, count)| Group { value, count }).collect();
    groups.sort_by(|a, b| compare_groups(a, b, direction));
    groups.truncate(limit);
    groups
}

fn compare_groups(a: &Group, b: &Group, direction: SortDirection) -> Ordering {
    match (&a.value, &b.value) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(av), Some(bv)) => {
            let by_count = match direction {
                SortDirection::Asc => a.count.cmp(&b.count),
                SortDirection::Desc => b.count.cmp(&a.count),
            };
            by_count.then_with(|| av.cmp(bv))
        }
    }
}
