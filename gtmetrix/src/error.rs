use crate::types::TestState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GtmetrixError {
    #[error("Invalid test request: {message}")]
    InvalidTestRequest { message: String },

    #[error("Test not found: {message}")]
    TestNotFound { message: String },

    #[error("Maximum number of API calls reached: {message}")]
    MaximumNumberOfApis { message: String },

    #[error("Too many concurrent requests: {message}")]
    ManyConcurrentRequests { message: String },

    #[error("Test {test_id} failed: {message}")]
    TestFailed { test_id: String, message: String },

    #[error("Test {test_id} still {last_state} after {attempts} polls")]
    PollingExhausted {
        test_id: String,
        attempts: u32,
        last_state: TestState,
    },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Results log error: {0}")]
    Io(#[from] std::io::Error),
}

impl GtmetrixError {
    /// Map an HTTP status reported by the API to its typed failure.
    ///
    /// Only 404, 400, 402 and 429 have a dedicated kind; any other status
    /// yields `None` and the caller decides what it means.
    pub fn from_status(status: u16, message: impl Into<String>) -> Option<Self> {
        let message = message.into();
        match status {
            404 => Some(Self::TestNotFound { message }),
            400 => Some(Self::InvalidTestRequest { message }),
            402 => Some(Self::MaximumNumberOfApis { message }),
            429 => Some(Self::ManyConcurrentRequests { message }),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::TestNotFound { .. } => Some(404),
            Self::InvalidTestRequest { .. } => Some(400),
            Self::MaximumNumberOfApis { .. } => Some(402),
            Self::ManyConcurrentRequests { .. } => Some(429),
            _ => None,
        }
    }
}

pub type GtmetrixResult<T> = Result<T, GtmetrixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            GtmetrixError::from_status(404, "gone"),
            Some(GtmetrixError::TestNotFound { message }) if message == "gone"
        ));
        assert!(matches!(
            GtmetrixError::from_status(400, "bad"),
            Some(GtmetrixError::InvalidTestRequest { .. })
        ));
        assert!(matches!(
            GtmetrixError::from_status(402, "quota"),
            Some(GtmetrixError::MaximumNumberOfApis { .. })
        ));
        assert!(matches!(
            GtmetrixError::from_status(429, "slow down"),
            Some(GtmetrixError::ManyConcurrentRequests { .. })
        ));
        assert!(GtmetrixError::from_status(200, "").is_none());
        assert!(GtmetrixError::from_status(500, "").is_none());
    }

    #[test]
    fn test_status_code_round_trip() {
        for status in [404, 400, 402, 429] {
            let err = GtmetrixError::from_status(status, "x").unwrap();
            assert_eq!(err.status_code(), Some(status));
        }

        let err = GtmetrixError::InvalidResponse {
            message: "missing state".to_string(),
        };
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = GtmetrixError::PollingExhausted {
            test_id: "abc".to_string(),
            attempts: 31,
            last_state: TestState::Started,
        };
        assert_eq!(err.to_string(), "Test abc still started after 31 polls");

        let err = GtmetrixError::from_status(402, "Maximum number of API calls reached.").unwrap();
        assert_eq!(
            err.to_string(),
            "Maximum number of API calls reached: Maximum number of API calls reached."
        );
    }
}
