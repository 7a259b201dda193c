#![no_main]

use clinical_trials_mcp::normalize::{esearch_ids, esummary_citations};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(response) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = esearch_ids(&response);
        let _ = esummary_citations(&response);
    }
});
