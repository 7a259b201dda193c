//! Mock-based tool tests using wiremock.
//!
//! These tests verify tool behavior end to end against mocked registry and
//! literature endpoints.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use clinical_trials_mcp::client::RegistryClient;
use clinical_trials_mcp::config::Config;
use clinical_trials_mcp::error::ErrorCode;
use clinical_trials_mcp::tools::{
    AggregateTrialsTool, CompareTrialsTool, GetTrialDetailsTool, GetTrialEndpointsTool,
    GetTrialTool, McpTool, SearchPubmedTool, SearchTrialsTool, ToolContext, call_tool,
};

/// Create a test context with a mock server.
fn setup_test_context(mock_server: &MockServer) -> ToolContext {
    let config = Config::for_testing(&mock_server.uri());
    let client = RegistryClient::new(&config).unwrap();
    ToolContext::new(Arc::new(client), config.limits)
}

fn nct(n: usize) -> String {
    format!("NCT{n:08}")
}

/// Sample registry study.
fn sample_study(id: &str, phases: &[&str], sponsor: &str) -> Value {
    json!({
        "protocolSection": {
            "identificationModule": {"nctId": id, "briefTitle": format!("Study {id}")},
            "statusModule": {
                "overallStatus": "RECRUITING",
                "studyFirstPostDateStruct": {"date": "2023-05-01"}
            },
            "designModule": {"phases": phases, "studyType": "INTERVENTIONAL"},
            "sponsorCollaboratorsModule": {"leadSponsor": {"name": sponsor, "class": "INDUSTRY"}},
            "contactsLocationsModule": {"locations": [{"country": "United States"}]}
        }
    })
}

/// Sample full study with design, arms, eligibility and outcomes.
fn full_study(id: &str) -> Value {
    json!({
        "protocolSection": {
            "identificationModule": {
                "nctId": id,
                "briefTitle": "Venetoclax plus azacitidine",
                "officialTitle": "A Phase 3 Study of Venetoclax",
                "acronym": "VIALE-A"
            },
            "statusModule": {
                "overallStatus": "COMPLETED",
                "startDateStruct": {"date": "2017-02-02"},
                "completionDateStruct": {"date": "2020-01"}
            },
            "designModule": {
                "phases": ["PHASE3"],
                "studyType": "INTERVENTIONAL",
                "enrollmentInfo": {"count": 433, "type": "ACTUAL"},
                "designInfo": {
                    "allocation": "RANDOMIZED",
                    "interventionModel": "PARALLEL",
                    "maskingInfo": {"masking": "DOUBLE"},
                    "primaryPurpose": "TREATMENT"
                }
            },
            "sponsorCollaboratorsModule": {
                "leadSponsor": {"name": "AbbVie", "class": "INDUSTRY"},
                "collaborators": [{"name": "Genentech", "class": "INDUSTRY"}]
            },
            "conditionsModule": {"conditions": ["Acute Myeloid Leukemia"]},
            "armsInterventionsModule": {
                "armGroups": [{
                    "label": "Venetoclax + Azacitidine",
                    "type": "EXPERIMENTAL",
                    "interventionNames": ["Drug: Venetoclax", "Drug: Azacitidine"]
                }],
                "interventions": [{"name": "Venetoclax"}]
            },
            "eligibilityModule": {"sex": "ALL", "minimumAge": "18 Years", "stdAges": ["ADULT"]},
            "outcomesModule": {
                "secondaryOutcomes": [{"measure": "Composite complete remission"}],
                "primaryOutcomes": [{"measure": "Overall survival", "timeFrame": "Up to 3 years"}],
                "otherOutcomes": [{"measure": " "}]
            },
            "contactsLocationsModule": {"locations": [{"country": "Korea, Republic of"}]}
        },
        "derivedSection": {"miscInfoModule": {"versionHolder": "2024-06-01"}}
    })
}

fn studies_page(studies: Vec<Value>, token: Option<&str>) -> Value {
    let mut page = json!({ "studies": studies });
    if let Some(token) = token {
        page["nextPageToken"] = json!(token);
    }
    page
}

// =============================================================================
// search_trials
// =============================================================================

#[tokio::test]
async fn test_search_condition_and_term_sent_separately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .and(query_param("query.cond", "AML / ALL"))
        .and(query_param("query.term", "BCL2 inhibitor"))
        .and(query_param("pageSize", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"studies": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let envelope = call_tool(
        &SearchTrialsTool,
        &ctx,
        json!({"filters": {"indication": "AML / ALL", "query_term": "BCL2 inhibitor"}}),
    )
    .await;

    assert_eq!(envelope, json!({"ok": true, "data": {"trials": [], "page": {"page_size": 25}}}));
    assert!(envelope["data"]["page"].get("next_page_token").is_none());
}

#[tokio::test]
async fn test_search_returns_normalized_trials_and_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(studies_page(
            vec![
                sample_study(&nct(1), &["PHASE2"], "Acme"),
                json!({"protocolSection": {"identificationModule": {"nctId": "bogus"}}}),
            ],
            Some("NEXT123"),
        )))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = SearchTrialsTool
        .execute(&ctx, json!({"filters": {"indication": "AML"}, "page_size": 10}))
        .await
        .unwrap();

    let trials = data["trials"].as_array().unwrap();
    assert_eq!(trials.len(), 1);
    assert_eq!(trials[0]["nct_id"], nct(1));
    assert_eq!(trials[0]["phases"], json!(["PHASE_2"]));
    assert_eq!(trials[0]["countries"], json!([{"code": "US", "name": "United States"}]));
    assert_eq!(data["page"], json!({"page_size": 10, "next_page_token": "NEXT123"}));
}

#[tokio::test]
async fn test_unrecognized_sort_field_sends_no_sort() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .and(query_param("query.cond", "AML"))
        .and(query_param_is_missing("sort"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"studies": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let envelope = call_tool(
        &SearchTrialsTool,
        &ctx,
        json!({"filters": {"indication": "AML"}, "sort": {"field": "ENROLLMENT", "direction": "ASC"}}),
    )
    .await;

    assert_eq!(envelope["ok"], true);
    assert_eq!(envelope["data"]["trials"], json!([]));
}

#[tokio::test]
async fn test_known_sort_field_sends_sort() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .and(query_param("sort", "StartDate:asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"studies": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let envelope = call_tool(
        &SearchTrialsTool,
        &ctx,
        json!({"filters": {"indication": "AML"}, "sort": {"field": "START_DATE", "direction": "ASC"}}),
    )
    .await;
    assert_eq!(envelope["ok"], true);
}

#[tokio::test]
async fn test_blank_next_token_is_omitted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(studies_page(vec![], Some("   "))),
        )
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data =
        SearchTrialsTool.execute(&ctx, json!({"filters": {"query_term": "x"}})).await.unwrap();
    assert!(data["page"].get("next_page_token").is_none());
}

#[tokio::test]
async fn test_sixty_phases_rejected_without_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"studies": []})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let phases: Vec<&str> = std::iter::repeat_n("PHASE_2", 60).collect();
    let envelope = call_tool(
        &SearchTrialsTool,
        &ctx,
        json!({"filters": {"indication": "AML", "phases": phases}}),
    )
    .await;

    assert_eq!(envelope["ok"], false);
    assert_eq!(envelope["error"]["code"], "INVALID_ARGUMENT");
    assert_eq!(envelope["error"]["retryable"], false);
}

#[tokio::test]
async fn test_unknown_filter_key_is_invalid_argument() {
    let mock_server = MockServer::start().await;
    let ctx = setup_test_context(&mock_server);

    let err = SearchTrialsTool
        .execute(&ctx, json!({"filters": {"diagnosis": "AML"}}))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);
    assert!(err.context["reason"].as_str().unwrap().contains("diagnosis"));
}

#[tokio::test]
async fn test_upstream_rate_limit_surfaces_in_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let envelope =
        call_tool(&SearchTrialsTool, &ctx, json!({"filters": {"indication": "AML"}})).await;

    let error = &envelope["error"];
    assert_eq!(error["code"], "RATE_LIMITED");
    assert_eq!(error["retryable"], true);
    assert_eq!(error["http_status"], 429);
    assert_eq!(error["upstream"]["service"], "CLINICALTRIALS_GOV");
    assert_eq!(error["context"]["retry_after_seconds"], 12);
}

// =============================================================================
// get_trial / get_trial_details / get_trial_endpoints
// =============================================================================

async fn mount_full_study(mock_server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/studies/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_study(id)))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_get_trial_full_record() {
    let mock_server = MockServer::start().await;
    mount_full_study(&mock_server, "NCT02993523").await;

    let ctx = setup_test_context(&mock_server);
    let data = GetTrialTool.execute(&ctx, json!({"nct_id": " NCT02993523 "})).await.unwrap();
    let trial = &data["trial"];

    assert_eq!(trial["nct_id"], "NCT02993523");
    assert_eq!(trial["acronym"], "VIALE-A");
    assert_eq!(trial["enrollment"], json!({"count": 433, "type": "ACTUAL"}));
    assert_eq!(trial["interventions"], json!(["Venetoclax", "Azacitidine"]));
    assert_eq!(trial["countries"], json!([{"code": "KR", "name": "Korea, Republic of"}]));
    assert!(trial.get("completion_date").is_none());
    assert_eq!(trial["study_design"]["masking"], "DOUBLE");
    assert_eq!(trial["arms"][0]["interventions"], json!(["Venetoclax", "Azacitidine"]));
    assert_eq!(trial["eligibility"]["standard_age"], json!(["ADULT"]));
    assert_eq!(trial["source"], json!({"registry": "CLINICALTRIALS_GOV", "api_version": "2024-06-01"}));

    let outcomes = trial["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["type"], "PRIMARY");
    assert_eq!(outcomes[1]["type"], "SECONDARY");
}

#[tokio::test]
async fn test_get_trial_details_drops_outcomes() {
    let mock_server = MockServer::start().await;
    mount_full_study(&mock_server, "NCT02993523").await;

    let ctx = setup_test_context(&mock_server);
    let data =
        GetTrialDetailsTool.execute(&ctx, json!({"nct_id": "NCT02993523"})).await.unwrap();
    assert!(data["trial"].get("outcomes").is_none());
    assert_eq!(data["trial"]["brief_title"], "Venetoclax plus azacitidine");
}

#[tokio::test]
async fn test_get_trial_endpoints() {
    let mock_server = MockServer::start().await;
    mount_full_study(&mock_server, "NCT02993523").await;

    let ctx = setup_test_context(&mock_server);
    let data =
        GetTrialEndpointsTool.execute(&ctx, json!({"nct_id": "NCT02993523"})).await.unwrap();
    assert_eq!(data["nct_id"], "NCT02993523");
    assert_eq!(data["outcomes"][0]["measure"], "Overall survival");
    assert_eq!(data["outcomes"][0]["time_frame"], "Up to 3 years");
}

#[tokio::test]
async fn test_get_trial_endpoints_empty_outcomes_is_array() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies/NCT00000001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "protocolSection": {"identificationModule": {"nctId": "NCT00000001"}}
        })))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data =
        GetTrialEndpointsTool.execute(&ctx, json!({"nct_id": "NCT00000001"})).await.unwrap();
    assert_eq!(data, json!({"nct_id": "NCT00000001", "outcomes": []}));
}

#[tokio::test]
async fn test_get_trial_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies/NCT99999999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let err = GetTrialTool.execute(&ctx, json!({"nct_id": "NCT99999999"})).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(!err.retryable());
    assert_eq!(err.http_status, Some(404));
    assert_eq!(err.context["nct_id"], "NCT99999999");
    assert_eq!(err.context["body"], "not found");
}

#[tokio::test]
async fn test_unnormalizable_record_is_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies/NCT00000002"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"protocolSection": {}})))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let err = GetTrialTool.execute(&ctx, json!({"nct_id": "NCT00000002"})).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::UpstreamError);
    assert_eq!(err.context["reason"], "Normalization returned empty record");
    let upstream = err.upstream.unwrap();
    assert!(upstream.endpoint.ends_with("/api/v2/studies/NCT00000002"));
}

// =============================================================================
// compare_trials
// =============================================================================

#[tokio::test]
async fn test_compare_trials_side_by_side() {
    let mock_server = MockServer::start().await;
    mount_full_study(&mock_server, "NCT02993523").await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies/NCT00000001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_study(
            "NCT00000001",
            &["PHASE1"],
            "Acme",
        )))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = CompareTrialsTool
        .execute(
            &ctx,
            json!({
                "nct_ids": ["NCT02993523", " NCT00000001", "NCT02993523"],
                "attributes": ["PHASES", "ENROLLMENT", "OUTCOMES_PRIMARY"]
            }),
        )
        .await
        .unwrap();

    assert_eq!(data["nct_ids"], json!(["NCT02993523", "NCT00000001"]));
    let comparisons = data["comparisons"].as_array().unwrap();
    assert_eq!(comparisons.len(), 3);

    assert_eq!(comparisons[0]["attribute"], "PHASES");
    assert_eq!(comparisons[0]["values"][1], json!({"nct_id": "NCT00000001", "value": ["PHASE_1"]}));

    assert_eq!(comparisons[1]["values"][1]["value"], Value::Null);
    assert_eq!(comparisons[2]["values"][0]["value"][0]["measure"], "Overall survival");
    assert_eq!(comparisons[2]["values"][1]["value"], json!([]));
}

#[tokio::test]
async fn test_compare_requires_two_distinct_ids() {
    let mock_server = MockServer::start().await;
    let ctx = setup_test_context(&mock_server);

    let err = CompareTrialsTool
        .execute(&ctx, json!({"nct_ids": ["NCT00000001", "NCT00000001 "], "attributes": ["PHASES"]}))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);

    let err = CompareTrialsTool
        .execute(&ctx, json!({"nct_ids": ["NCT00000001", "NCT00000002"], "attributes": []}))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn test_compare_failure_names_identifier() {
    let mock_server = MockServer::start().await;
    mount_full_study(&mock_server, "NCT02993523").await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies/NCT00000404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let err = CompareTrialsTool
        .execute(
            &ctx,
            json!({"nct_ids": ["NCT02993523", "NCT00000404"], "attributes": ["PHASES"]}),
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.context["nct_id"], "NCT00000404");
}

// =============================================================================
// aggregate_trials
// =============================================================================

#[tokio::test]
async fn test_aggregate_empty_page_with_token_terminates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(studies_page(vec![], Some("STUCK"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = AggregateTrialsTool
        .execute(
            &ctx,
            json!({"filters": {"indication": "AML"}, "group_by": ["PHASE"], "metrics": ["COUNT_TRIALS"]}),
        )
        .await
        .unwrap();

    assert_eq!(data["groups"], json!([]));
    assert_eq!(data["total_trials"], 0);
}

#[tokio::test]
async fn test_aggregate_follows_tokens_and_groups() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .and(query_param_is_missing("pageToken"))
        .and(query_param("pageSize", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(studies_page(
            vec![
                sample_study(&nct(1), &["PHASE1", "PHASE2"], "Acme"),
                sample_study(&nct(2), &["PHASE2"], "Acme"),
            ],
            Some("PAGE2"),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .and(query_param("pageToken", "PAGE2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(studies_page(
            vec![sample_study(&nct(3), &[], "Beta")],
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = AggregateTrialsTool
        .execute(
            &ctx,
            json!({
                "filters": {"indication": "AML"},
                "group_by": ["PHASE"],
                "metrics": ["COUNT_TRIALS"],
                "sort": {"metric": "COUNT_TRIALS", "direction": "DESC"}
            }),
        )
        .await
        .unwrap();

    assert_eq!(data["total_trials"], 3);
    assert_eq!(data["group_by"], json!(["PHASE"]));
    assert_eq!(
        data["groups"],
        json!([
            {"group": {"key": "PHASE", "value": "PHASE_2"}, "metrics": {"count_trials": 2}},
            {"group": {"key": "PHASE", "value": "PHASE_1"}, "metrics": {"count_trials": 1}},
            {"group": {"key": "PHASE", "value": null}, "metrics": {"count_trials": 1}}
        ])
    );
}

#[tokio::test]
async fn test_aggregate_stops_on_repeated_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(studies_page(
            vec![sample_study(&nct(1), &["PHASE3"], "Acme")],
            Some("SAME"),
        )))
        .expect(2)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = AggregateTrialsTool
        .execute(
            &ctx,
            json!({"filters": {"indication": "AML"}, "group_by": ["LEAD_SPONSOR"], "metrics": ["COUNT_TRIALS"]}),
        )
        .await
        .unwrap();

    assert_eq!(data["total_trials"], 2);
    assert_eq!(data["groups"][0]["group"]["value"], "Acme");
    assert_eq!(data["groups"][0]["metrics"]["count_trials"], 2);
}

/// Serves full pages with a fresh token forever.
struct EndlessPages {
    calls: AtomicUsize,
}

impl Respond for EndlessPages {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let studies: Vec<Value> = (0..100)
            .map(|i| sample_study(&nct(call * 100 + i + 1), &["PHASE2"], "Acme"))
            .collect();
        let token = format!("T{call}");
        ResponseTemplate::new(200).set_body_json(studies_page(studies, Some(&token)))
    }
}

#[tokio::test]
async fn test_aggregate_caps_at_five_hundred_trials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .respond_with(EndlessPages { calls: AtomicUsize::new(0) })
        .expect(5)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = AggregateTrialsTool
        .execute(
            &ctx,
            json!({"filters": {"indication": "AML"}, "group_by": ["COUNTRY"], "metrics": ["COUNT_TRIALS"], "limit": 1}),
        )
        .await
        .unwrap();

    assert_eq!(data["total_trials"], 500);
    assert_eq!(
        data["groups"],
        json!([{"group": {"key": "COUNTRY", "value": "US"}, "metrics": {"count_trials": 500}}])
    );
}

/// Fresh token every call, but no study carries a valid identifier.
struct UnnormalizablePages {
    calls: AtomicUsize,
}

impl Respond for UnnormalizablePages {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let studies = vec![json!({"protocolSection": {"identificationModule": {"nctId": "bad"}}})];
        let token = format!("t{call}");
        ResponseTemplate::new(200).set_body_json(studies_page(studies, Some(token.as_str())))
    }
}

#[tokio::test]
async fn test_aggregate_stops_on_page_without_valid_trials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .respond_with(UnnormalizablePages { calls: AtomicUsize::new(0) })
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        AggregateTrialsTool.execute(
            &ctx,
            json!({"filters": {"indication": "AML"}, "group_by": ["PHASE"], "metrics": ["COUNT_TRIALS"]}),
        ),
    )
    .await
    .expect("aggregation terminates")
    .unwrap();

    assert_eq!(data["total_trials"], 0);
    assert_eq!(data["groups"], json!([]));
}

/// Each page holds one valid study and a fresh token.
struct TrickleResponder {
    calls: AtomicUsize,
}

impl Respond for TrickleResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let studies = vec![sample_study(&nct(call + 1), &["PHASE3"], "Acme")];
        let token = format!("t{call}");
        ResponseTemplate::new(200).set_body_json(studies_page(studies, Some(token.as_str())))
    }
}

#[tokio::test]
async fn test_aggregate_respects_page_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/studies"))
        .respond_with(TrickleResponder { calls: AtomicUsize::new(0) })
        .expect(5)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = AggregateTrialsTool
        .execute(
            &ctx,
            json!({"filters": {"indication": "AML"}, "group_by": ["PHASE"], "metrics": ["COUNT_TRIALS"]}),
        )
        .await
        .unwrap();

    assert_eq!(data["total_trials"], 5);
    assert_eq!(
        data["groups"],
        json!([{"group": {"key": "PHASE", "value": "PHASE_3"}, "metrics": {"count_trials": 5}}])
    );
}

#[tokio::test]
async fn test_aggregate_rejects_bad_group_by() {
    let mock_server = MockServer::start().await;
    let ctx = setup_test_context(&mock_server);

    for args in [
        json!({"filters": {"indication": "AML"}, "group_by": [], "metrics": ["COUNT_TRIALS"]}),
        json!({"filters": {"indication": "AML"}, "group_by": ["PHASE", "COUNTRY"], "metrics": ["COUNT_TRIALS"]}),
        json!({"filters": {"indication": "AML"}, "group_by": ["PHASE"], "metrics": []}),
    ] {
        let err = AggregateTrialsTool.execute(&ctx, args).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }
}

// =============================================================================
// search_pubmed
// =============================================================================

#[tokio::test]
async fn test_pubmed_empty_search_skips_summary() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/esearch.fcgi"))
        .and(query_param("term", "NCT02993523[All Fields]"))
        .and(query_param("db", "pubmed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"esearchresult": {"idlist": []}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/esummary.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = SearchPubmedTool
        .execute(&ctx, json!({"nct_id": "NCT02993523", "retmax": 500}))
        .await
        .unwrap();

    assert_eq!(
        data,
        json!({"citations": [], "query_used": {"term": "NCT02993523[All Fields]", "retmax": 200}})
    );
}

#[tokio::test]
async fn test_pubmed_two_step_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/esearch.fcgi"))
        .and(query_param("term", "venetoclax"))
        .and(query_param("sort", "pub_date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": {"idlist": ["222", "111"]}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/entrez/eutils/esummary.fcgi"))
        .and(query_param("id", "222,111"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {
                "uids": ["222", "111"],
                "111": {"title": "Older paper", "pubdate": "2019 Jan", "source": "Blood"},
                "222": {
                    "title": "Newer paper",
                    "pubdate": "2023 Feb 2",
                    "fulljournalname": "The Lancet",
                    "authors": [{"name": "Doe J"}],
                    "articleids": [{"idtype": "doi", "value": "10.1016/x"}]
                }
            }
        })))
        .mount(&mock_server)
        .await;

    let ctx = setup_test_context(&mock_server);
    let data = SearchPubmedTool
        .execute(&ctx, json!({"query": "venetoclax", "sort": "PUB_DATE"}))
        .await
        .unwrap();

    let citations = data["citations"].as_array().unwrap();
    assert_eq!(citations.len(), 2);
    assert_eq!(citations[0]["pmid"], "222");
    assert_eq!(citations[0]["year"], 2023);
    assert_eq!(citations[0]["doi"], "10.1016/x");
    assert_eq!(citations[0]["source"], json!({"db": "PUBMED"}));
    assert_eq!(citations[1]["journal"], "Blood");
    assert_eq!(data["query_used"], json!({"term": "venetoclax", "sort": "PUB_DATE"}));
}

#[tokio::test]
async fn test_pubmed_requires_id_or_query() {
    let mock_server = MockServer::start().await;
    let ctx = setup_test_context(&mock_server);

    let err = SearchPubmedTool.execute(&ctx, json!({})).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);
}
