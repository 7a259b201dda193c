//! Output formatting: the result envelope and log-line summaries.

pub mod json;
pub mod log;

pub use self::json::envelope;
pub use self::log::{summarize_args, summarize_result};
