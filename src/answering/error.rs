//! Typed errors for answering-service calls
//!
//! The session controller treats every variant as a connectivity failure;
//! the split exists for logging and for the suggestion paths.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnsweringError {
    /// Connection refused, DNS failure, timeout
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response whose body does not have the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AnsweringError {
    /// HTTP status when the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            AnsweringError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The service could not be reached at all
    pub fn is_connectivity(&self) -> bool {
        matches!(self, AnsweringError::Network(_))
    }

    /// Worth another attempt later: unreachable, or a 5xx/429 answer
    pub fn is_retryable(&self) -> bool {
        match self {
            AnsweringError::Network(_) => true,
            AnsweringError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AnsweringError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() {
            AnsweringError::Network(e.to_string())
        } else if e.is_decode() || e.is_body() {
            AnsweringError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            AnsweringError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            AnsweringError::Other(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifiers() {
        let down = AnsweringError::Network("connection refused".into());
        assert!(down.is_connectivity());
        assert!(down.is_retryable());

        let busy = AnsweringError::Status {
            status: 503,
            body: String::new(),
        };
        assert_eq!(busy.status(), Some(503));
        assert!(busy.is_retryable());
        assert!(!busy.is_connectivity());

        let denied = AnsweringError::Status {
            status: 403,
            body: "forbidden".into(),
        };
        assert!(!denied.is_retryable());
        assert!(!AnsweringError::Decode("x".into()).is_retryable());
    }
}
