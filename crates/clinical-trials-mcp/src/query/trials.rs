//! Translation of structured trial filters into the registry's query dialect.
//!
//! The condition text goes to `query.cond`. The free-text term and every
//! field-scoped clause go to `query.term`, joined by `AND`. Values within one
//! clause category are joined by `OR`.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::clamp_integer;
use crate::config::{Limits, NCT_ID_FIELD};
use crate::error::{ToolError, ToolResult};
use crate::models::{Phase, SearchTrialsInput, TrialFilters, TrialIncludeField, TrialsSort};
use crate::normalize::{country_table, is_iso_date, normalize_country_name};

/// A registry search ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialQuery {
    pub condition: Option<String>,
    pub term: Option<String>,
    pub page_size: u32,
    pub page_token: Option<String>,
    pub sort: Option<String>,
    /// Sorted, deduplicated upstream field paths.
    pub fields: Vec<&'static str>,
}

impl TrialQuery {
    /// Query-string pairs for `/studies`.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        if let Some(condition) = &self.condition {
            params.push(("query.cond", condition.clone()));
        }
        if let Some(term) = &self.term {
            params.push(("query.term", term.clone()));
        }
        params.push(("pageSize", self.page_size.to_string()));
        if let Some(token) = &self.page_token {
            params.push(("pageToken", token.clone()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.clone()));
        }
        if !self.fields.is_empty() {
            params.push(("fields", self.fields.join(",")));
        }
        params
    }
}

/// Build a registry search from tool input.
///
/// # Errors
///
/// `INVALID_ARGUMENT` when a list filter exceeds its ceiling, a date is
/// malformed or inverted, or nothing at all constrains the search.
pub fn build_trial_query(input: &SearchTrialsInput, limits: &Limits) -> ToolResult<TrialQuery> {
    let condition = trimmed(input.filters.indication.as_deref());

    let mut parts: Vec<String> = Vec::new();
    if let Some(term) = trimmed(input.filters.query_term.as_deref()) {
        parts.push(term);
    }
    parts.extend(filter_clauses(&input.filters, limits)?);

    let term = (!parts.is_empty()).then(|| parts.join(" AND "));
    if condition.is_none() && term.is_none() {
        return Err(ToolError::invalid_argument(
            "at least one of indication, query_term or a field filter is required",
        ));
    }

    let page_size = clamp_integer(
        input.page_size.as_ref(),
        1,
        i64::from(limits.max_page_size),
        i64::from(limits.default_page_size),
    );

    Ok(TrialQuery {
        condition,
        term,
        page_size: u32::try_from(page_size).unwrap_or(limits.default_page_size),
        page_token: trimmed(input.page_token.as_deref()),
        sort: input.sort.as_ref().and_then(sort_param),
        fields: field_paths(input.include_fields.as_deref()),
    })
}

/// Field-scoped clauses for every filter category present, in a fixed order.
///
/// # Errors
///
/// See [`build_trial_query`].
pub fn filter_clauses(filters: &TrialFilters, limits: &Limits) -> ToolResult<Vec<String>> {
    let mut clauses = Vec::new();

    if filters.phases.len() > limits.max_phases {
        return Err(ToolError::invalid_argument(format!(
            "phases exceeds {} entries",
            limits.max_phases
        ))
        .with_context("count", filters.phases.len()));
    }
    if let Some(clause) = phase_clause(&filters.phases) {
        clauses.push(clause);
    }

    if filters.overall_statuses.len() > limits.max_statuses {
        return Err(ToolError::invalid_argument(format!(
            "overall_statuses exceeds {} entries",
            limits.max_statuses
        ))
        .with_context("count", filters.overall_statuses.len()));
    }
    if !filters.overall_statuses.is_empty() {
        let mut seen = Vec::new();
        for status in &filters.overall_statuses {
            if !seen.contains(&status.as_str()) {
                seen.push(status.as_str());
            }
        }
        clauses.push(or_group(seen.iter().map(|s| format!("AREA[OverallStatus]{s}"))));
    }

    if let Some(study_type) = filters.study_type {
        clauses.push(format!("AREA[StudyType]{}", study_type.as_str()));
    }

    if let Some(sponsor) = trimmed(filters.sponsor_or_collaborator.as_deref()) {
        let quoted = quote(&sponsor);
        clauses.push(format!("(AREA[LeadSponsorName]{quoted} OR AREA[CollaboratorName]{quoted})"));
    }

    let countries = resolve_countries(&filters.countries, limits)?;
    if !countries.is_empty() {
        let table = country_table();
        clauses.push(or_group(countries.iter().filter_map(|code| {
            table.display_name(code).map(|name| format!("AREA[LocationCountry]{}", quote(name)))
        })));
    }

    let ranges = [
        (
            "last_update_posted",
            "LastUpdatePostDate",
            &filters.last_update_posted_from,
            &filters.last_update_posted_to,
        ),
        ("first_posted", "StudyFirstPostDate", &filters.first_posted_from, &filters.first_posted_to),
        ("start_date", "StartDate", &filters.start_date_from, &filters.start_date_to),
        (
            "primary_completion_date",
            "PrimaryCompletionDate",
            &filters.primary_completion_date_from,
            &filters.primary_completion_date_to,
        ),
        ("completion_date", "CompletionDate", &filters.completion_date_from, &filters.completion_date_to),
    ];
    for (name, area, from, to) in ranges {
        if let Some(clause) = date_range_clause(name, area, from.as_deref(), to.as_deref())? {
            clauses.push(clause);
        }
    }

    Ok(clauses)
}

fn phase_clause(phases: &[Phase]) -> Option<String> {
    let mut tokens: Vec<&'static str> = Vec::new();
    for token in phases.iter().flat_map(|p| p.upstream_tokens()) {
        if !tokens.contains(token) {
            tokens.push(token);
        }
    }
    (!tokens.is_empty()).then(|| or_group(tokens.iter().map(|t| format!("AREA[Phase]{t}"))))
}

/// Resolve country filter entries to distinct codes, first-seen order.
///
/// Empty entries are ignored. The ceiling applies to distinct entries after
/// normalization, so spelling variants of one country count once. Entries
/// that resolve to no country are dropped from the result but still count
/// toward the ceiling.
///
/// # Errors
///
/// `INVALID_ARGUMENT` when more than `max_countries` distinct entries remain.
pub fn resolve_countries(entries: &[String], limits: &Limits) -> ToolResult<Vec<&'static str>> {
    let table = country_table();
    let mut distinct: BTreeSet<String> = BTreeSet::new();
    let mut codes: Vec<&'static str> = Vec::new();

    for entry in entries.iter().map(|e| e.trim()).filter(|e| !e.is_empty()) {
        match table.resolve(entry) {
            Some(code) => {
                distinct.insert(code.to_string());
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
            None => {
                distinct.insert(format!("?{}", normalize_country_name(entry)));
            }
        }
    }

    if distinct.len() > limits.max_countries {
        return Err(ToolError::invalid_argument(format!(
            "countries exceeds {} entries",
            limits.max_countries
        ))
        .with_context("count", distinct.len()));
    }

    Ok(codes)
}

fn date_range_clause(
    name: &str,
    area: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> ToolResult<Option<String>> {
    let from = parse_date(&format!("{name}_from"), from)?;
    let to = parse_date(&format!("{name}_to"), to)?;

    let (start, end) = match (from, to) {
        (None, None) => return Ok(None),
        (Some((_, a)), Some((_, b))) if a > b => {
            return Err(ToolError::invalid_argument(format!(
                "{name}_from is after {name}_to"
            )));
        }
        (from, to) => (
            from.map(|(s, _)| s).unwrap_or_default(),
            to.map(|(s, _)| s).unwrap_or_default(),
        ),
    };

    Ok(Some(format!("AREA[{area}]RANGE[{start},{end}]")))
}

fn parse_date(param: &str, value: Option<&str>) -> ToolResult<Option<(String, NaiveDate)>> {
    let Some(raw) = trimmed(value) else { return Ok(None) };

    let invalid = || {
        ToolError::invalid_argument(format!("{param} must be a YYYY-MM-DD date"))
            .with_context("value", raw.as_str())
    };
    if !is_iso_date(&raw) {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| invalid())?;
    Ok(Some((raw, date)))
}

fn sort_param(sort: &TrialsSort) -> Option<String> {
    sort.field
        .upstream_key()
        .map(|key| format!("{key}:{}", sort.direction.as_upstream()))
}

/// Upstream field paths for the selected include groups.
#[must_use]
pub fn field_paths(include: Option<&[TrialIncludeField]>) -> Vec<&'static str> {
    let groups = include.unwrap_or(TrialIncludeField::ALL);
    let mut paths: BTreeSet<&'static str> =
        groups.iter().flat_map(|g| g.upstream_paths().iter().copied()).collect();
    paths.insert(NCT_ID_FIELD);
    paths.into_iter().collect()
}

fn or_group(items: impl Iterator<Item = String>) -> String {
    format!("({})", items.collect::<Vec<_>>().join(" OR "))
}

/// Quote a value for an essie `AREA[...]` expression.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
