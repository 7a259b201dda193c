#![no_main]

use clinical_trials_mcp::config::Limits;
use clinical_trials_mcp::models::{SearchPubmedInput, SearchTrialsInput};
use clinical_trials_mcp::query::{build_pubmed_search, build_trial_query};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = Limits::default();
    if let Ok(input) = serde_json::from_slice::<SearchTrialsInput>(data) {
        let _ = build_trial_query(&input, &limits);
    }
    if let Ok(input) = serde_json::from_slice::<SearchPubmedInput>(data) {
        let _ = build_pubmed_search(&input, &limits);
    }
});
