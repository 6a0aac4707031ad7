/// Error types for the api module
use thiserror::Error;

/// Errors returned by the nutrition query service
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller passed an unusable query (empty code or search text)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The request could not be sent or the connection dropped
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the request timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The remote service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not valid JSON
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for every failure that happened on the wire, as opposed to a
    /// rejected query.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(ApiError::Network("refused".into()).is_transport());
        assert!(ApiError::Timeout(20).is_transport());
        assert!(ApiError::Status { status: 503, body: String::new() }.is_transport());
        assert!(ApiError::Decode("eof".into()).is_transport());
        assert!(!ApiError::InvalidInput("empty".into()).is_transport());
    }

    #[test]
    fn test_status_message() {
        let err = ApiError::Status { status: 404, body: "not found".into() };
        assert_eq!(err.to_string(), "HTTP 404: not found");
    }
}
