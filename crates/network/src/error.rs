// crates/network/src/error.rs
//! Error types for network operations

use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur during network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error from a body or sink stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A stream argument lacks a capability the exchange needs
    #[error("Unsupported stream: {0}")]
    Unsupported(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl NetworkError {
    /// Returns true if retrying the same exchange might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            NetworkError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
            ),
            NetworkError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns true if the error is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        match self {
            NetworkError::Status { status, .. } => (400..500).contains(status),
            NetworkError::Http(e) => e.status().is_some_and(|s| s.is_client_error()),
            _ => false,
        }
    }

    /// Returns true if the error is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        match self {
            NetworkError::Status { status, .. } => (500..600).contains(status),
            NetworkError::Http(e) => e.status().is_some_and(|s| s.is_server_error()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetworkError::InvalidUrl("test".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_status_error() {
        let err = NetworkError::Status {
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_errors() {
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(NetworkError::Io(reset).is_retryable());
        assert!(NetworkError::Status {
            status: 503,
            reason: "Service Unavailable".to_string()
        }
        .is_retryable());
        assert!(!NetworkError::InvalidUrl("test".to_string()).is_retryable());
        assert!(!NetworkError::Unsupported("body".to_string()).is_retryable());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: NetworkError = io.into();
        assert!(err.to_string().starts_with("IO error"));
    }
}
