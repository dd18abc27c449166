use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://gtmetrix.com/api/0.1/test";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GtmetrixConfig {
    /// Test submission endpoint; poll URLs for known test ids are derived from it
    pub base_url: String,
    /// Timeout applied to every individual HTTP request
    pub timeout: Duration,
    /// Fixed delay between two polls of the same test
    pub poll_interval: Duration,
    /// Polls allowed after the first one before giving up
    pub max_poll_retries: u32,
    /// Directory holding the daily `results-<d>-<m>-<y>` files
    pub results_dir: PathBuf,
}

impl Default for GtmetrixConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(30),
            max_poll_retries: 30,
            results_dir: PathBuf::from("."),
        }
    }
}

impl GtmetrixConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_poll_retries(mut self, max_poll_retries: u32) -> Self {
        self.max_poll_retries = max_poll_retries;
        self
    }

    pub fn with_results_dir(mut self, results_dir: impl Into<PathBuf>) -> Self {
        self.results_dir = results_dir.into();
        self
    }

    /// Poll URL for a test id: the base URL and the id joined by a single `/`.
    pub fn poll_url_for(&self, test_id: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), test_id)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Base URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }

        if self.timeout.is_zero() {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.poll_interval.is_zero() {
            return Err("Poll interval must be greater than 0".to_string());
        }

        Ok(())
    }
}
