//! Error types for the estate search transport.

/// Errors that can occur when talking to the estate search site.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unreadable body).
    #[error("Request failed")]
    RequestFailed,
    /// The site returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// A URL could not be built from the configured base.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// Whether a retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidUrl(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        let err = Error::HttpStatus {
            status: 503,
            body: String::new(),
        };
        assert!(err.is_retryable());
        assert!(Error::RequestFailed.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = Error::HttpStatus {
            status: 404,
            body: "not found".into(),
        };
        assert!(!err.is_retryable());
        assert!(!Error::InvalidUrl("x".into()).is_retryable());
    }
}
