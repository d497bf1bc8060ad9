//! Errors from the search service boundary.

use thiserror::Error;

/// Errors that can occur while talking to the search service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client is not configured well enough to send a request.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request could not be sent or no response arrived.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// The response body was not the JSON we expect.
    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ClientError {
    /// Returns `true` when the failure happened before the service produced
    /// an answer, so sending the same request again may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            Self::Status { status, .. } => matches!(status, 502..=504),
            Self::Config(_) | Self::Decode { .. } => false,
        }
    }
}

/// Convenience alias for client results.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_errors_are_transient() {
        let err = ClientError::Status {
            status: 503,
            url: "http://localhost:5000/api/search".to_string(),
            message: "Service Unavailable".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        let err = ClientError::Status {
            status: 400,
            url: "http://localhost:5000/api/search".to_string(),
            message: "Bad Request".to_string(),
        };
        assert!(!err.is_transient());
        assert!(!ClientError::Config("empty base url".to_string()).is_transient());
        assert!(!ClientError::Decode {
            url: "u".to_string(),
            message: "missing field `results`".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_status_display() {
        let err = ClientError::Status {
            status: 500,
            url: "http://h/api/search".to_string(),
            message: "Internal Server Error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 500 from http://h/api/search: Internal Server Error"
        );
    }
}
