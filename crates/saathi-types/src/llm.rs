//! Text-generation error types.

/// Errors from the text-generation service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("generation timed out after {0}s")]
    Timeout(u64),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Whether a later attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GenerationError::Provider { .. }
                | GenerationError::RateLimited { .. }
                | GenerationError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GenerationError::Timeout(30).is_transient());
        assert!(GenerationError::RateLimited { retry_after_ms: None }.is_transient());
        assert!(!GenerationError::AuthenticationFailed.is_transient());
        assert!(!GenerationError::InvalidResponse("empty".into()).is_transient());
    }

    #[test]
    fn test_display() {
        let err = GenerationError::Provider {
            message: "503".to_string(),
        };
        assert_eq!(err.to_string(), "provider error: 503");
    }
}
