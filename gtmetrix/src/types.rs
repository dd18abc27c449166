use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Extra form fields sent with a test submission (`location`, `browser`, ...).
pub type TestOptions = BTreeMap<String, String>;

/// Email and API key sent as HTTP basic auth on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    api_key: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Lifecycle stage of a test as reported by the API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TestState {
    Queued,
    Started,
    Completed,
    Error,
}

impl TestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TestState::Completed | TestState::Error)
    }

    fn rank(self) -> u8 {
        match self {
            TestState::Queued => 0,
            TestState::Started => 1,
            TestState::Completed | TestState::Error => 2,
        }
    }

    /// Next state given what a poll observed.
    ///
    /// Terminal states are sticky and a report that goes backwards keeps
    /// the current state, so the result only ever moves forward.
    pub fn advance(self, observed: TestState) -> TestState {
        if self.is_terminal() || observed.rank() < self.rank() {
            self
        } else {
            observed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestState::Queued => "queued",
            TestState::Started => "started",
            TestState::Completed => "completed",
            TestState::Error => "error",
        }
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single result leaf; the API sends either numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{}", n),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for MetricValue {
    fn from(value: i64) -> Self {
        MetricValue::Number(value.into())
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        MetricValue::Text(value.to_string())
    }
}

/// Scalar metrics extracted from a completed test's `results` object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResults {
    pub pagespeed_score: MetricValue,
    pub yslow_score: MetricValue,
    pub html_bytes: MetricValue,
    pub html_load_time: MetricValue,
    pub page_bytes: MetricValue,
    pub page_load_time: MetricValue,
    pub page_elements: MetricValue,
}
