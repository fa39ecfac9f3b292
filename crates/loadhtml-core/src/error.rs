use thiserror::Error;

/// Application-wide error types for loadhtml.
#[derive(Error, Debug)]
pub enum AppError {
    /// The browser engine could not be configured or launched.
    #[error("Browser error: {0}")]
    Browser(String),

    /// Navigation completed with a non-success outcome (DNS failure,
    /// connection refused, TLS failure, engine-level load error).
    #[error("Load error: {0}")]
    Load(String),

    /// Navigation did not complete within the deadline.
    #[error("Navigation timed out after {0} seconds")]
    Timeout(u64),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error occurred before any navigation was
    /// attempted (engine setup rather than page load).
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, AppError::Browser(_))
    }

    /// Returns true if this error is the navigation deadline expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(AppError::Browser("no chrome binary".into()).is_launch_failure());
        assert!(!AppError::Load("net::ERR_NAME_NOT_RESOLVED".into()).is_launch_failure());
        assert!(AppError::Timeout(30).is_timeout());
        assert!(!AppError::Generic("oops".into()).is_timeout());
    }

    #[test]
    fn test_timeout_display_includes_seconds() {
        let err = AppError::Timeout(30);
        assert_eq!(err.to_string(), "Navigation timed out after 30 seconds");
    }
}
