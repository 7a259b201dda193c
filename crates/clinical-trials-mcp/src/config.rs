//! Configuration for the clinical trials MCP server.

use std::time::Duration;

use anyhow::Context;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// ClinicalTrials.gov v2 API base URL.
    pub const CTGOV_API: &str = "https://clinicaltrials.gov/api/v2";

    /// NCBI E-utilities base URL.
    pub const PUBMED_API: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

    /// Per-request deadline.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(15_000);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);
}

/// Registry field path of the trial identifier, always requested.
pub const NCT_ID_FIELD: &str = "protocolSection.identificationModule.nctId";

/// Policy limits applied by the query builders and the aggregation engine.
///
/// The defaults are compatibility values; nothing upstream requires them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum entries in the `phases` filter.
    pub max_phases: usize,
    /// Maximum entries in the `overall_statuses` filter.
    pub max_statuses: usize,
    /// Maximum distinct countries in the `countries` filter.
    pub max_countries: usize,
    /// Page size used when none (or a non-integer) is given.
    pub default_page_size: u32,
    /// Largest page size the registry accepts.
    pub max_page_size: u32,
    /// Records collected before aggregation stops paginating.
    pub max_aggregate_trials: usize,
    /// Page size used while aggregating.
    pub aggregate_page_size: u32,
    /// Group limit used when none (or a non-integer) is given.
    pub default_aggregate_limit: usize,
    /// Largest group limit.
    pub max_aggregate_limit: usize,
    /// Largest `retmax` forwarded to the literature index.
    pub max_pubmed_retmax: u32,
}

impl Limits {
    /// Registry pages an aggregation may request: enough to reach
    /// `max_aggregate_trials` at `aggregate_page_size`, and at least one.
    #[must_use]
    pub fn aggregate_page_budget(&self) -> usize {
        let page = usize::try_from(self.aggregate_page_size).unwrap_or(usize::MAX).max(1);
        self.max_aggregate_trials.div_ceil(page).max(1)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_phases: 20,
            max_statuses: 20,
            max_countries: 50,
            default_page_size: 25,
            max_page_size: 100,
            max_aggregate_trials: 500,
            aggregate_page_size: 100,
            default_aggregate_limit: 50,
            max_aggregate_limit: 500,
            max_pubmed_retmax: 200,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the trials registry (for testing with mock servers).
    pub ctgov_api_url: String,

    /// Base URL for the literature index (for testing with mock servers).
    pub pubmed_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,

    /// Bypass both the response cache and request coalescing.
    pub cache_disabled: bool,

    /// Policy limits.
    pub limits: Limits,
}

impl Config {
    /// Create a configuration pointing at the public upstreams.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ctgov_api_url: api::CTGOV_API.to_string(),
            pubmed_api_url: api::PUBMED_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            cache_disabled: false,
            limits: Limits::default(),
        }
    }

    /// Create a test configuration with custom URLs for mock servers.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            ctgov_api_url: format!("{}/api/v2", base_url),
            pubmed_api_url: format!("{}/entrez/eutils", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            cache_disabled: true, // No caching in tests
            limits: Limits::default(),
        }
    }

    /// Enable caching with the given TTL.
    #[must_use]
    pub const fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self.cache_disabled = false;
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new();

        if let Ok(url) = std::env::var("CTGOV_API_URL") {
            config.ctgov_api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = std::env::var("PUBMED_API_URL") {
            config.pubmed_api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(ms) = std::env::var("CLINICAL_TRIALS_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().context("CLINICAL_TRIALS_TIMEOUT_MS must be an integer")?;
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Ok(secs) = std::env::var("CLINICAL_TRIALS_CACHE_TTL_SECS") {
            let secs: u64 =
                secs.trim().parse().context("CLINICAL_TRIALS_CACHE_TTL_SECS must be an integer")?;
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Ok(flag) = std::env::var("CLINICAL_TRIALS_CACHE_DISABLED") {
            config.cache_disabled = parse_flag(&flag)
                .context("CLINICAL_TRIALS_CACHE_DISABLED must be true/false/1/0")?;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("unrecognized flag value '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.ctgov_api_url, api::CTGOV_API);
        assert_eq!(config.request_timeout, Duration::from_millis(15_000));
        assert!(!config.cache_disabled);
    }

    #[test]
    fn test_limits_keep_compatibility_values() {
        let limits = Limits::default();
        assert_eq!(limits.max_phases, 20);
        assert_eq!(limits.max_statuses, 20);
        assert_eq!(limits.max_countries, 50);
        assert_eq!(limits.max_aggregate_trials, 500);
        assert_eq!(limits.aggregate_page_size, 100);
        assert_eq!(limits.aggregate_page_budget(), 5);
    }

    #[test]
    fn test_aggregate_page_budget_rounds_up() {
        let limits = Limits { max_aggregate_trials: 250, aggregate_page_size: 100, ..Limits::default() };
        assert_eq!(limits.aggregate_page_budget(), 3);

        let limits = Limits { max_aggregate_trials: 0, aggregate_page_size: 0, ..Limits::default() };
        assert_eq!(limits.aggregate_page_budget(), 1);
    }

    #[test]
    fn test_for_testing_disables_cache() {
        let config = Config::for_testing("http://127.0.0.1:9999");
        assert!(config.cache_disabled);
        assert_eq!(config.ctgov_api_url, "http://127.0.0.1:9999/api/v2");

        let config = config.with_cache(Duration::from_secs(1));
        assert!(!config.cache_disabled);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
