//! Fuzzing support for clinical-trials-mcp.
//!
//! Targets feed arbitrary bytes to the normalizers and query builders,
//! which must return a value or an error and never panic.
//!
//! # Usage
//!
//! ```bash
//! cd crates/trials-fuzz
//! cargo +nightly fuzz run fuzz_study_normalize -- -max_total_time=60
//! ```

pub use clinical_trials_mcp::{models, normalize, query};
