use crate::error::{GtmetrixError, GtmetrixResult};
use crate::types::Credentials;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

/// Status and decoded JSON body of one API call.
#[derive(Debug)]
pub(crate) struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// The API's own explanation, falling back to the status line when the
    /// body carries no non-empty `error` string.
    pub fn error_message(&self) -> String {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.status.to_string())
    }

    /// Typed failure for the statuses the API documents, if any.
    pub fn status_error(&self) -> Option<GtmetrixError> {
        GtmetrixError::from_status(self.status.as_u16(), self.error_message())
    }
}

pub(crate) async fn send(
    request: RequestBuilder,
    credentials: &Credentials,
) -> GtmetrixResult<ApiResponse> {
    let response = request
        .basic_auth(credentials.email(), Some(credentials.api_key()))
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    match serde_json::from_str(&text) {
        Ok(body) => Ok(ApiResponse { status, body }),
        Err(e) if status.is_success() => Err(GtmetrixError::Serialization(e)),
        Err(_) => Ok(ApiResponse {
            status,
            body: Value::Null,
        }),
    }
}
