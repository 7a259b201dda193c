#![no_main]

use clinical_trials_mcp::normalize::{full_trial_record, trial_summary};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(study) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = trial_summary(&study);
        let _ = full_trial_record(&study);
    }
});
