//! Error types for the rating engine
//!
//! Engine operations return the typed [`RatingError`] so callers can tell
//! malformed input apart from a numerical failure. Application code (config
//! loading, the CLI) wraps these in `anyhow` like the rest of the binary.

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, RatingError>;

/// Custom error types for rating calculations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Volatility did not converge during {stage} after {iterations} iterations")]
    NumericalNonConvergence {
        stage: &'static str,
        iterations: usize,
    },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl RatingError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Whether the error came from the caller's input rather than the math
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

/// Reject NaN and infinities with a named argument in the message
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RatingError::invalid(format!(
            "{} must be finite, got {}",
            name, value
        )))
    }
}
