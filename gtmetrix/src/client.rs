use crate::config::GtmetrixConfig;
use crate::error::{GtmetrixError, GtmetrixResult};
use crate::handle::TestHandle;
use crate::http;
use crate::types::{Credentials, TestOptions};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Submission response; anything beyond these fields is ignored.
#[derive(Debug, Deserialize)]
struct StartTestResponse {
    test_id: String,
    #[serde(default)]
    poll_state_url: Option<String>,
}

pub struct GtmetrixClient {
    http_client: reqwest::Client,
    credentials: Arc<Credentials>,
    config: Arc<GtmetrixConfig>,
}

impl GtmetrixClient {
    pub fn new(
        email: impl Into<String>,
        api_key: impl Into<String>,
        config: GtmetrixConfig,
    ) -> GtmetrixResult<Self> {
        config
            .validate()
            .map_err(|msg| GtmetrixError::InvalidConfig { message: msg })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            credentials: Arc::new(Credentials::new(email, api_key)),
            config: Arc::new(config),
        })
    }

    pub fn with_default_config(
        email: impl Into<String>,
        api_key: impl Into<String>,
    ) -> GtmetrixResult<Self> {
        Self::new(email, api_key, GtmetrixConfig::default())
    }

    pub fn config(&self) -> &GtmetrixConfig {
        &self.config
    }

    /// Submit a test for `url`.
    ///
    /// `options` are forwarded untouched as form fields (`location`,
    /// `browser`, ...); `url` always wins over an option of the same name.
    /// Returns a queued handle for the new test.
    pub async fn start_test(&self, url: &str, options: TestOptions) -> GtmetrixResult<TestHandle> {
        let mut form = options;
        form.insert("url".to_string(), url.to_string());

        debug!("Submitting test for {} with {} fields", url, form.len());

        let response = http::send(
            self.http_client.post(&self.config.base_url).form(&form),
            &self.credentials,
        )
        .await?;

        if let Some(err) = response.status_error() {
            return Err(err);
        }
        if response.status != reqwest::StatusCode::OK {
            return Err(GtmetrixError::InvalidTestRequest {
                message: response.error_message(),
            });
        }

        let started = StartTestResponse::deserialize(&response.body).map_err(|e| {
            GtmetrixError::InvalidResponse {
                message: format!("test submission response: {}", e),
            }
        })?;

        info!("Started test {} for {}", started.test_id, url);

        Ok(TestHandle::new(
            started.test_id,
            started.poll_state_url,
            self.http_client.clone(),
            Arc::clone(&self.credentials),
            Arc::clone(&self.config),
        ))
    }

    /// Handle for a test submitted earlier, polled at `<base_url>/<test_id>`.
    pub fn test_handle(&self, test_id: impl Into<String>) -> TestHandle {
        TestHandle::new(
            test_id,
            None,
            self.http_client.clone(),
            Arc::clone(&self.credentials),
            Arc::clone(&self.config),
        )
    }

    /// Fetch the results of an already submitted test and log them under `key`.
    pub async fn poll_state_request(&self, key: &str, test_id: &str) -> GtmetrixResult<TestHandle> {
        let mut handle = self.test_handle(test_id);
        handle.fetch_results(key).await?;
        Ok(handle)
    }
}
