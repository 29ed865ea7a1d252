//! Unified Error Model
use thiserror::Error;

/// Failures of a single verdict cycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerdictError {
    #[error("VALIDATION/{0}")]
    Validation(String),

    #[error("NETWORK/{0}")]
    Network(String),

    #[error("TIMEOUT/no response after {0}ms")]
    Timeout(u64),

    #[error("MALFORMED/{0}")]
    MalformedResponse(String),

    #[error("BUSY/a verdict request is already in flight")]
    Busy,

    #[error("PROMPT/{0}")]
    Prompt(String),
}

impl VerdictError {
    /// Whether the user may simply submit the same case again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::MalformedResponse(_)
        )
    }
}

/// Failures of the usage-state storage collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("STORAGE/{0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            VerdictError::Validation("empty".into()).to_string(),
            "VALIDATION/empty"
        );
        assert_eq!(
            VerdictError::Timeout(30_000).to_string(),
            "TIMEOUT/no response after 30000ms"
        );
        assert_eq!(
            StorageError::Unavailable("disk".into()).to_string(),
            "STORAGE/disk"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(VerdictError::Network("down".into()).is_retryable());
        assert!(VerdictError::MalformedResponse("x".into()).is_retryable());
        assert!(!VerdictError::Validation("x".into()).is_retryable());
        assert!(VerdictError::Timeout(10).is_retryable());
        assert!(!VerdictError::Busy.is_retryable());
        assert!(!VerdictError::Prompt("x".into()).is_retryable());
    }
}
