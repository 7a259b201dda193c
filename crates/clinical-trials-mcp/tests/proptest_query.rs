//! Property-based tests for the query builder and the normalizers.

use proptest::prelude::*;
use serde_json::{Value, json};

use clinical_trials_mcp::config::Limits;
use clinical_trials_mcp::error::ErrorCode;
use clinical_trials_mcp::models::{Phase, SearchTrialsInput, TrialFilters};
use clinical_trials_mcp::normalize::{citation, full_trial_record, trial_summary};
use clinical_trials_mcp::query::{build_trial_query, resolve_countries};

fn arb_phase() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::EarlyPhase1),
        Just(Phase::Phase1),
        Just(Phase::Phase1And2),
        Just(Phase::Phase2),
        Just(Phase::Phase2And3),
        Just(Phase::Phase3),
        Just(Phase::Phase4),
        Just(Phase::NotApplicable),
    ]
}

/// Arbitrary JSON, a few levels deep.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(|f| json!(f)),
        ".{0,12}".prop_map(Value::from),
        Just(Value::from("NCT01234567")),
        Just(Value::from("PHASE2")),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::from),
            prop::collection::hash_map(
                prop_oneof![
                    Just("protocolSection".to_string()),
                    Just("identificationModule".to_string()),
                    Just("nctId".to_string()),
                    Just("designModule".to_string()),
                    Just("phases".to_string()),
                    Just("title".to_string()),
                    "[a-z]{1,8}",
                ],
                inner,
                0..6
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Phase lists above the ceiling are always rejected, at or below never for that reason.
    #[test]
    fn phase_ceiling(phases in prop::collection::vec(arb_phase(), 0..40)) {
        let input = SearchTrialsInput {
            filters: TrialFilters {
                indication: Some("AML".into()),
                phases: phases.clone(),
                ..TrialFilters::default()
            },
            ..SearchTrialsInput::default()
        };
        let result = build_trial_query(&input, &Limits::default());
        if phases.len() > 20 {
            prop_assert_eq!(result.unwrap_err().code, ErrorCode::InvalidArgument);
        } else {
            let query = result.unwrap();
            let term = query.term.unwrap_or_default();
            prop_assert!(term.matches(" OR ").count() < 20);
        }
    }

    /// Case and whitespace variants of one country count once.
    #[test]
    fn country_variants_collapse(variants in prop::collection::vec(
        prop_oneof![
            Just("US"), Just("us "), Just(" Us"), Just("United States"),
            Just("united   states"), Just("USA"), Just("U.S.A"),
        ],
        1..80,
    )) {
        let entries: Vec<String> = variants.iter().map(|s| (*s).to_string()).collect();
        let codes = resolve_countries(&entries, &Limits::default()).unwrap();
        prop_assert_eq!(codes, vec!["US"]);
    }

    /// Page size always lands in [1, 100].
    #[test]
    fn page_size_clamped(size in any::<i64>()) {
        let input = SearchTrialsInput {
            filters: TrialFilters { query_term: Some("x".into()), ..TrialFilters::default() },
            page_size: Some(json!(size)),
            ..SearchTrialsInput::default()
        };
        let query = build_trial_query(&input, &Limits::default()).unwrap();
        prop_assert!((1..=100).contains(&query.page_size));
    }

    /// Normalizers are total over arbitrary JSON.
    #[test]
    fn normalizers_never_panic(value in arb_json()) {
        if let Some(summary) = trial_summary(&value) {
            prop_assert!(!summary.brief_title.is_empty());
            let json = serde_json::to_value(&summary).unwrap();
            prop_assert!(json.as_object().unwrap().values().all(|v| !v.is_null()));
        }
        let _ = full_trial_record(&value);
        let _ = citation("123", &value);
    }
}
