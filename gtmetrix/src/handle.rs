use crate::config::GtmetrixConfig;
use crate::error::{GtmetrixError, GtmetrixResult};
use crate::http;
use crate::results_log::ResultsLog;
use crate::types::{Credentials, TestResults, TestState};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Poll payload as far as the handle cares about it.
#[derive(Debug, Deserialize)]
struct PollResponse {
    state: TestState,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Option<Value>,
    #[serde(default)]
    resources: Option<Value>,
}

/// One submitted test and everything learned about it so far.
///
/// Created in [`TestState::Queued`]; only [`TestHandle::fetch_results`]
/// changes it afterwards.
#[derive(Debug, Clone)]
pub struct TestHandle {
    test_id: String,
    poll_state_url: String,
    state: TestState,
    results: Option<TestResults>,
    raw_results: Option<Map<String, Value>>,
    resources: Option<Map<String, Value>>,
    http_client: reqwest::Client,
    credentials: Arc<Credentials>,
    config: Arc<GtmetrixConfig>,
}

impl TestHandle {
    pub(crate) fn new(
        test_id: impl Into<String>,
        poll_state_url: Option<String>,
        http_client: reqwest::Client,
        credentials: Arc<Credentials>,
        config: Arc<GtmetrixConfig>,
    ) -> Self {
        let test_id = test_id.into();
        let poll_state_url = poll_state_url.unwrap_or_else(|| config.poll_url_for(&test_id));

        Self {
            test_id,
            poll_state_url,
            state: TestState::Queued,
            results: None,
            raw_results: None,
            resources: None,
            http_client,
            credentials,
            config,
        }
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn poll_state_url(&self) -> &str {
        &self.poll_state_url
    }

    pub fn state(&self) -> TestState {
        self.state
    }

    /// Extracted metrics; `None` until the test has completed.
    pub fn results(&self) -> Option<&TestResults> {
        self.results.as_ref()
    }

    /// The whole `results` object from the completing poll.
    pub fn raw_results(&self) -> Option<&Map<String, Value>> {
        self.raw_results.as_ref()
    }

    /// Report resource links (HAR, PDF, screenshot...) when the API sent any.
    pub fn resources(&self) -> Option<&Map<String, Value>> {
        self.resources.as_ref()
    }

    /// Poll until the test completes, then record its metrics under `key`.
    ///
    /// Issues at most `1 + max_poll_retries` requests and sleeps
    /// `poll_interval` between them. On completion the seven metrics are
    /// extracted, a line is appended to the daily results log and the raw
    /// response body is returned. A remote `error` state, an exhausted poll
    /// budget or any documented HTTP failure status ends the call with the
    /// matching error.
    pub async fn fetch_results(&mut self, key: &str) -> GtmetrixResult<Value> {
        let max_attempts = self.config.max_poll_retries.saturating_add(1);
        let mut attempts = 0u32;

        loop {
            let body = self.poll().await?;
            attempts += 1;

            let response = PollResponse::deserialize(&body).map_err(|e| {
                GtmetrixError::InvalidResponse {
                    message: format!("poll response for test {}: {}", self.test_id, e),
                }
            })?;

            let next = self.state.advance(response.state);
            if next != response.state {
                warn!(
                    "Test {} reported {} while {}, keeping {}",
                    self.test_id, response.state, self.state, next
                );
            }
            self.state = next;

            match (self.state, response.state) {
                (TestState::Error, _) | (_, TestState::Error) => {
                    let message = response
                        .error
                        .filter(|e| !e.is_empty())
                        .unwrap_or_else(|| "test reported error state".to_string());
                    error!("Test {} failed: {}", self.test_id, message);
                    return Err(GtmetrixError::TestFailed {
                        test_id: self.test_id.clone(),
                        message,
                    });
                }
                (TestState::Completed, _) => {
                    let results = self.extract(response)?;
                    let path = ResultsLog::new(&self.config.results_dir)
                        .append(key, &results)
                        .await?;
                    info!(
                        "Test {} completed, results for {} written to {}",
                        self.test_id,
                        key,
                        path.display()
                    );
                    return Ok(body);
                }
                _ => {}
            }

            if attempts >= max_attempts {
                warn!(
                    "Giving up on test {} after {} polls, still {}",
                    self.test_id, attempts, self.state
                );
                return Err(GtmetrixError::PollingExhausted {
                    test_id: self.test_id.clone(),
                    attempts,
                    last_state: self.state,
                });
            }

            debug!(
                "Test {} is {} (poll {}/{}), retrying in {:?}",
                self.test_id, self.state, attempts, max_attempts, self.config.poll_interval
            );
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn poll(&self) -> GtmetrixResult<Value> {
        debug!("Polling {}", self.poll_state_url);

        let response = http::send(
            self.http_client.get(&self.poll_state_url),
            &self.credentials,
        )
        .await?;

        if let Some(err) = response.status_error() {
            return Err(err);
        }

        Ok(response.body)
    }

    fn extract(&mut self, response: PollResponse) -> GtmetrixResult<TestResults> {
        let raw = match response.results {
            Some(Value::Object(raw)) => raw,
            _ => {
                return Err(GtmetrixError::InvalidResponse {
                    message: format!("completed test {} has no results object", self.test_id),
                })
            }
        };

        let results: TestResults =
            serde_json::from_value(Value::Object(raw.clone())).map_err(|e| {
                GtmetrixError::InvalidResponse {
                    message: format!("results for test {}: {}", self.test_id, e),
                }
            })?;

        self.results = Some(results.clone());
        self.raw_results = Some(raw);
        self.resources = match response.resources {
            Some(Value::Object(resources)) => Some(resources),
            _ => None,
        };
        Ok(results)
    }
}
