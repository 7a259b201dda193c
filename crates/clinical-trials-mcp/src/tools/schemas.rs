//! JSON Schema fragments shared by several tools.

use serde_json::{Value, json};

pub(super) const PHASES: &[&str] = &[
    "EARLY_PHASE_1",
    "PHASE_1",
    "PHASE_1_2",
    "PHASE_2",
    "PHASE_2_3",
    "PHASE_3",
    "PHASE_4",
    "NOT_APPLICABLE",
];

pub(super) const STATUSES: &[&str] = &[
    "NOT_YET_RECRUITING",
    "RECRUITING",
    "ENROLLING_BY_INVITATION",
    "ACTIVE_NOT_RECRUITING",
    "SUSPENDED",
    "TERMINATED",
    "WITHDRAWN",
    "COMPLETED",
    "UNKNOWN_STATUS",
];

const DATE_FIELDS: &[&str] = &[
    "last_update_posted",
    "first_posted",
    "start_date",
    "primary_completion_date",
    "completion_date",
];

fn iso_date() -> Value {
    json!({"type": "string", "pattern": r"^\d{4}-\d{2}-\d{2}$"})
}

/// Schema of the `filters` object.
pub(super) fn trial_filters() -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "indication".into(),
        json!({"type": "string", "description": "Condition or disease (query.cond)"}),
    );
    properties.insert(
        "query_term".into(),
        json!({"type": "string", "description": "Free-text term, essie syntax allowed"}),
    );
    properties.insert(
        "phases".into(),
        json!({"type": "array", "items": {"type": "string", "enum": PHASES}, "maxItems": 20}),
    );
    properties.insert(
        "overall_statuses".into(),
        json!({"type": "array", "items": {"type": "string", "enum": STATUSES}, "maxItems": 20}),
    );
    properties.insert(
        "study_type".into(),
        json!({"type": "string", "enum": ["INTERVENTIONAL", "OBSERVATIONAL", "EXPANDED_ACCESS"]}),
    );
    properties.insert(
        "sponsor_or_collaborator".into(),
        json!({"type": "string", "description": "Lead sponsor or collaborator name"}),
    );
    properties.insert(
        "countries".into(),
        json!({
            "type": "array",
            "items": {"type": "string"},
            "maxItems": 50,
            "description": "ISO alpha-2 codes or country names"
        }),
    );
    for field in DATE_FIELDS {
        properties.insert(format!("{field}_from"), iso_date());
        properties.insert(format!("{field}_to"), iso_date());
    }

    json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false
    })
}

/// Object with a single required `nct_id`.
pub(super) fn nct_id_input() -> Value {
    json!({
        "type": "object",
        "properties": {
            "nct_id": {
                "type": "string",
                "pattern": "^NCT\\d{8}$",
                "description": "Registry identifier, e.g. NCT01234567"
            }
        },
        "required": ["nct_id"],
        "additionalProperties": false
    })
}
